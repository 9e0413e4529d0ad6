use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;

use pushplus_relay::config::Settings;
use pushplus_relay::owner::create_owner_store;
use pushplus_relay::server::{create_app, AppState};
use pushplus_relay::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    init_telemetry(&settings.log)?;
    tracing::info!("Configuration loaded");

    if settings.pushplus.token.is_empty() {
        tracing::warn!("pushplus.token is not configured; webhooks will be rejected");
    }

    // Load owner mapping; a broken snapshot is logged and the relay starts empty
    let owners = create_owner_store();
    let owners_path = settings.owners.file_path.clone();
    match owners.load_from_file(&owners_path).await {
        Ok(()) => tracing::info!(
            path = %owners_path,
            entries = owners.len().await,
            "Owner mapping loaded"
        ),
        Err(e) => tracing::error!(path = %owners_path, error = %e, "Failed to load owner mapping"),
    }

    // Create application state
    let state = AppState::new(settings.clone(), owners)?;
    tracing::info!(
        content_template = state.renderer.has_template(),
        "Application state initialized"
    );

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}, POST /webhook accepts JSON", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
