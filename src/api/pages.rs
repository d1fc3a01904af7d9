//! HTML page handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::State, http::Uri, response::Html};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::server::AppState;

/// Data handed to every page template
#[derive(Debug, Default, Serialize)]
pub struct PageData {
    pub title: String,
    pub string_map: HashMap<String, String>,
    pub int_map: HashMap<String, i64>,
    pub flash: Option<String>,
    pub warning: Option<String>,
    pub error: Option<String>,
}

impl PageData {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// GET / - Home page
#[tracing::instrument(name = "http.home", skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<Html<Vec<u8>>> {
    render_page(&state, "home", PageData::titled("Home")).await
}

/// GET /about - About page
#[tracing::instrument(name = "http.about", skip(state))]
pub async fn about(State(state): State<AppState>) -> Result<Html<Vec<u8>>> {
    let mut data = PageData::titled("About");
    data.string_map
        .insert("test".to_string(), "Hello, again.".to_string());

    render_page(&state, "about", data).await
}

/// Source reads and first-time builds block, so rendering runs off the
/// async workers.
async fn render_page(
    state: &AppState,
    name: &'static str,
    data: PageData,
) -> Result<Html<Vec<u8>>> {
    let renderer = Arc::clone(&state.renderer);

    let body = tokio::task::spawn_blocking(move || {
        let mut body = Vec::new();
        renderer.render(&mut body, name, &data).map(|()| body)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Render task for '{}' failed: {}", name, e)))??;

    Ok(Html(body))
}

/// Fallback for paths no route matches
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No page at {}", uri.path()))
}
