use crate::{RelayConfig, RelayService, RelayStats, ws_handler};
use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(flatten)]
    stats: RelayStats,
}

async fn health(State(service): State<RelayService>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        stats: service.stats(),
    })
}

/// Relay routes: WebSocket upgrade on `/` and `/ws`, stats on `/health`.
pub fn router(service: RelayService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(cors)
        .with_state(service)
}

pub async fn serve(config: RelayConfig) -> Result<()> {
    serve_with_shutdown(config, std::future::pending()).await
}

pub async fn serve_with_shutdown<F>(config: RelayConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind relay on {}", config.bind))?;
    info!("Signaling relay listening on ws://{}", config.bind);

    serve_listener(listener, RelayService::new(), shutdown).await
}

/// Runs the relay on an already bound listener.
pub async fn serve_listener<F>(listener: TcpListener, service: RelayService, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Relay server failed")?;

    info!("Signaling relay stopped");
    Ok(())
}
