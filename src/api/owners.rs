//! Owner mapping administration endpoints.

use std::collections::HashMap;

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::metrics::OwnerMetrics;
use crate::server::AppState;

use super::decode_json;

#[derive(Debug, Deserialize)]
pub struct UpsertOwnerRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub owner: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteOwnerRequest {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// GET /api/owners - full machine ID -> owner mapping
#[tracing::instrument(name = "http.list_owners", skip(state))]
pub async fn list_owners(State(state): State<AppState>) -> Json<HashMap<String, String>> {
    Json(state.owners.all().await)
}

/// POST /api/owners - create or update one mapping, then persist
#[tracing::instrument(name = "http.upsert_owner", skip(state, body))]
pub async fn upsert_owner(State(state): State<AppState>, body: Bytes) -> Result<Json<OkResponse>> {
    let request: UpsertOwnerRequest = decode_json(&body)?;
    if request.id.is_empty() || request.owner.is_empty() {
        return Err(AppError::Validation(
            "id and owner must not be empty".to_string(),
        ));
    }

    tracing::info!(machine_id = %request.id, owner = %request.owner, "Upserting owner");
    state.owners.upsert(request.id, request.owner).await;
    OwnerMetrics::record_upsert();

    persist(&state).await?;
    Ok(Json(OkResponse { ok: true }))
}

/// DELETE /api/owners - remove one mapping, then persist
#[tracing::instrument(name = "http.delete_owner", skip(state, body))]
pub async fn delete_owner(State(state): State<AppState>, body: Bytes) -> Result<Json<OkResponse>> {
    let request: DeleteOwnerRequest = decode_json(&body)?;
    if request.id.is_empty() {
        return Err(AppError::Validation("id must not be empty".to_string()));
    }

    tracing::info!(machine_id = %request.id, "Deleting owner");
    state.owners.delete(&request.id).await;
    OwnerMetrics::record_delete();

    persist(&state).await?;
    Ok(Json(OkResponse { ok: true }))
}

/// Snapshot the mapping. On failure the in-memory change stays applied.
async fn persist(state: &AppState) -> Result<()> {
    let path = &state.settings.owners.file_path;

    if let Err(e) = state.owners.save_to_file(path).await {
        OwnerMetrics::record_save_failure();
        tracing::error!(path = %path, error = %e, "Owner mapping changed in memory but snapshot failed");
        return Err(e.into());
    }

    OwnerMetrics::set_total(state.owners.len().await);
    Ok(())
}
