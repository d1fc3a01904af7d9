use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::{api_routes, page_routes};

use super::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        // HTML pages
        .merge(page_routes())
        // Health & metrics
        .merge(api_routes())
        // Add middleware
        .layer(TraceLayer::new_for_http())
        // Add state
        .with_state(state)
}
