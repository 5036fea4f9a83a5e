//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    /// Browser sessions held in memory
    pub sessions: usize,
}

/// GET /health
///
/// Open to everyone; says nothing about the store.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "tfg-gallery".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.sessions.open_count().await,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
