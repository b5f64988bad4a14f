use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::ApiState;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    ledger: String,
}

#[derive(Serialize)]
struct VersionResponse {
    version: String,
}

/// Reports degraded when the ledger subscription has lost its connection;
/// availability queries keep serving last-known-good data in that state.
async fn health_check(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let ledger_ok = state.ledger.is_healthy();
    Json(HealthResponse {
        status: if ledger_ok { "ok" } else { "degraded" }.to_string(),
        ledger: if ledger_ok { "connected" } else { "disconnected" }.to_string(),
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version))
}
