//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub templates: TemplateHealthResponse,
}

#[derive(Debug, Serialize)]
pub struct TemplateHealthResponse {
    pub policy: String,
    pub cached: usize,
    pub names: Vec<String>,
}

/// GET /health - Liveness and template cache summary
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.renderer.store();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        templates: TemplateHealthResponse {
            policy: state.renderer.policy().to_string(),
            cached: store.len(),
            names: store.names(),
        },
    })
}
