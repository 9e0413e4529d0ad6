//! API layer - HTTP endpoint handlers organized by domain.

mod health;
mod metrics;
mod owners;
mod routes;
mod webhook;

pub use health::{health, HealthResponse};
pub use metrics::prometheus_metrics;
pub use owners::{
    delete_owner, list_owners, upsert_owner, DeleteOwnerRequest, OkResponse, UpsertOwnerRequest,
};
pub use routes::api_routes;
pub use webhook::{apply_boundary_overrides, webhook, WebhookResponse};

use crate::error::{AppError, Result};

/// Decode a request body the way the relay's clients expect: any content
/// type, JSON text required.
fn decode_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("invalid json: {e}")))
}
