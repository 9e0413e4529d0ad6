use axum::{
    routing::{get, get_service, post},
    Router,
};
use tower_http::services::ServeFile;

use crate::config::Settings;
use crate::server::AppState;

use super::health::health;
use super::metrics::prometheus_metrics;
use super::owners::{delete_owner, list_owners, upsert_owner};
use super::webhook::webhook;

pub fn api_routes(settings: &Settings) -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        // Alert intake
        .route("/webhook", post(webhook))
        // Owner administration
        .route("/config", get_service(ServeFile::new(&settings.config_page.path)))
        .route(
            "/api/owners",
            get(list_owners).post(upsert_owner).delete(delete_owner),
        )
}
