//! HTTP integration tests
//!
//! Drives the axum router with in-process requests to check that page
//! renders, template failures and the health/metrics endpoints surface
//! correctly over HTTP.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use page_renderer::config::Settings;
use page_renderer::server::{create_app, AppState};
use page_renderer::template::{
    CachePolicy, Fragment, MemorySource, Renderer, TemplateLoader, TemplateResult,
    TemplateSource, TemplateStore,
};

// =============================================================================
// Helpers
// =============================================================================

fn base_source() -> MemorySource {
    MemorySource::new()
        .with_layout("base", "<main>{% block content %}{% endblock %}</main>")
        .with_page(
            "home",
            "{% extends \"base\" %}{% block content %}<h1>{{ title }}</h1>{% endblock %}",
        )
}

/// Source whose page reads take `delay`, standing in for a slow disk
#[derive(Debug)]
struct SlowSource {
    inner: MemorySource,
    delay: Duration,
}

impl TemplateSource for SlowSource {
    fn page(&self, name: &str) -> TemplateResult<Fragment> {
        thread::sleep(self.delay);
        self.inner.page(name)
    }

    fn layouts(&self) -> TemplateResult<Vec<Fragment>> {
        self.inner.layouts()
    }

    fn pages(&self) -> TemplateResult<Vec<String>> {
        self.inner.pages()
    }

    fn contains(&self, name: &str) -> bool {
        self.inner.contains(name)
    }
}

fn create_test_app(source: MemorySource) -> (Router, Arc<Renderer>) {
    create_source_app(Arc::new(source))
}

fn create_source_app<S: TemplateSource + 'static>(source: Arc<S>) -> (Router, Arc<Renderer>) {
    let renderer = Arc::new(Renderer::new(
        TemplateLoader::new(source),
        Arc::new(TemplateStore::new()),
        CachePolicy::Cache,
    ));
    let state = AppState::with_renderer(Settings::default(), renderer.clone());
    (create_app(state), renderer)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

// =============================================================================
// Page Routes
// =============================================================================

mod page_tests {
    use super::*;

    #[tokio::test]
    async fn test_home_page_renders() {
        let (app, renderer) = create_test_app(base_source());

        let (status, body) = get(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).unwrap(), "<main><h1>Home</h1></main>");
        assert_eq!(renderer.store().names(), vec!["home"]);
    }

    #[tokio::test]
    async fn test_about_page_receives_handler_data() {
        let source =
            base_source().with_page("about", "<p>{{ title }}: {{ string_map.test }}</p>");
        let (app, _) = create_test_app(source);

        let (status, body) = get(app, "/about").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "<p>About: Hello, again.</p>"
        );
    }

    #[tokio::test]
    async fn test_missing_page_is_404() {
        let (app, _) = create_test_app(base_source());

        let (status, json) = get_json(app, "/about").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "TEMPLATE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_execution_error_is_500_without_partial_output() {
        let source = MemorySource::new().with_page("home", "<h1>{{ title }}</h1>{{ missing }}");
        let (app, _) = create_test_app(source);

        let (status, body) = get(app, "/").await;
        let text = String::from_utf8(body).unwrap();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!text.contains("<h1>"));

        let json: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["error"]["code"], "TEMPLATE_EXECUTION_ERROR");
    }

    #[tokio::test]
    async fn test_syntax_error_is_500() {
        let source = MemorySource::new().with_page("home", "{% if %}");
        let (app, renderer) = create_test_app(source);

        let (status, json) = get_json(app, "/").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "TEMPLATE_SYNTAX_ERROR");
        assert!(renderer.store().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (app, renderer) = create_test_app(base_source());

        let (status, json) = get_json(app, "/missing").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert!(renderer.store().is_empty());
    }

    #[tokio::test]
    async fn test_bundled_templates() {
        let mut settings = Settings::default();
        settings.templates.dir = concat!(env!("CARGO_MANIFEST_DIR"), "/templates").into();
        let app = create_app(AppState::new(settings));

        let (status, body) = get(app.clone(), "/about").await;
        let text = String::from_utf8(body).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(text.contains("Hello, again."));
        assert!(text.contains("<title>About | Page Renderer</title>"));

        let (status, body) = get(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("Welcome to Page Renderer."));
    }
}

// =============================================================================
// Health & Metrics
// =============================================================================

mod api_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_template_cache() {
        let (app, _) = create_test_app(base_source());

        let (status, _) = get(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = get_json(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["templates"]["policy"], "cache");
        assert_eq!(json["templates"]["cached"], 1);
        assert_eq!(json["templates"]["names"][0], "home");
    }

    #[tokio::test]
    async fn test_health_under_reload_policy() {
        let (app, renderer) = create_test_app(base_source());
        renderer.set_policy(CachePolicy::Reload);

        let (status, _) = get(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);

        let (_, json) = get_json(app, "/health").await;
        assert_eq!(json["templates"]["policy"], "reload");
        assert_eq!(json["templates"]["cached"], 0);
    }

    #[tokio::test]
    async fn test_metrics_exposes_render_counters() {
        let (app, _) = create_test_app(base_source());

        let (status, _) = get(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get(app, "/metrics").await;
        let text = String::from_utf8(body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert!(text.contains("page_renderer_renders_total"));
        assert!(text.contains("page_renderer_templates_cached"));
    }

    #[tokio::test]
    async fn test_slow_render_does_not_delay_health() {
        let source = SlowSource {
            inner: base_source(),
            delay: Duration::from_millis(500),
        };
        let (app, _) = create_source_app(Arc::new(source));
        let started = Instant::now();

        let page = tokio::spawn(get(app.clone(), "/"));
        // Let the page request reach the renderer first.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let (status, _) = get(app, "/health").await;
        let health_elapsed = started.elapsed();

        assert_eq!(status, StatusCode::OK);
        assert!(
            health_elapsed < Duration::from_millis(400),
            "health answered after {:?}",
            health_elapsed
        );

        let (status, body) = page.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).unwrap(), "<main><h1>Home</h1></main>");
    }
}
