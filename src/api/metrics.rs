//! Prometheus metrics endpoint.

use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::IntoResponse,
};

use crate::error::{AppError, Result};
use crate::metrics::RenderMetrics;
use crate::server::AppState;

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// GET /metrics - Render and template cache metrics in Prometheus text format
pub async fn prometheus_metrics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let body = RenderMetrics::scrape(state.renderer.store())
        .map_err(|e| AppError::Internal(format!("Failed to encode metrics: {}", e)))?;

    Ok(([(CONTENT_TYPE, PROMETHEUS_TEXT)], body))
}
