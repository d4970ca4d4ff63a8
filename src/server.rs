//! HTTP server exposing the `/metrics` scrape endpoint

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::collector::GridCollector;
use crate::config::Config;
use crate::hub::HubClient;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(config: Config) -> Result<(), AnyError> {
    let client = HubClient::new(&config.hub)?;
    let collector = Arc::new(GridCollector::new(client));

    let app = router(collector);

    let address = config.server.listen_addr();
    let listener = TcpListener::bind(address).await?;
    info!(%address, hub = %config.hub.base_url(), "grid-exporter listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn router(collector: Arc<GridCollector>) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/health", get(health))
        .with_state(collector)
}

/// Scrape handler: one collection cycle per request.
///
/// Upstream failures are already folded into the observations, so the only
/// failure left here is text encoding itself.
async fn metrics(State(collector): State<Arc<GridCollector>>) -> Response {
    let observations = collector.collect().await;

    let registry = match observations.to_registry() {
        Ok(registry) => registry,
        Err(error) => {
            error!(%error, "failed to build metrics registry");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics")
                .into_response();
        }
    };

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(error) = encoder.encode(&registry.gather(), &mut buffer) {
        error!(%error, "failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response();
    }

    (
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
