use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::template::{FileSource, Renderer, TemplateLoader, TemplateStore};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub renderer: Arc<Renderer>,
    pub start_time: Instant,
}

impl AppState {
    /// Wire the renderer to the template directory named in the settings
    pub fn new(settings: Settings) -> Self {
        let templates = &settings.templates;

        let source = Arc::new(FileSource::with_suffixes(
            templates.dir.clone(),
            templates.page_suffix.clone(),
            templates.layout_suffix.clone(),
        ));
        let loader = TemplateLoader::with_options(source, templates.loader_options());

        let store = match templates.max_age() {
            Some(max_age) => TemplateStore::with_max_age(max_age),
            None => TemplateStore::new(),
        };

        let renderer = Arc::new(Renderer::new(
            loader,
            Arc::new(store),
            templates.cache_policy(),
        ));

        Self::with_renderer(settings, renderer)
    }

    pub fn with_renderer(settings: Settings, renderer: Arc<Renderer>) -> Self {
        Self {
            settings: Arc::new(settings),
            renderer,
            start_time: Instant::now(),
        }
    }
}
