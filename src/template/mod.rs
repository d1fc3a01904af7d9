//! Page template system.
//!
//! This module provides:
//! - Backing sources for template text (directory on disk, in-memory strings)
//! - A loader that compiles a page together with every shared layout
//! - A store that keeps one compiled template per name for reuse
//! - A renderer that executes templates into a buffer and only then writes
//!   the result to the caller's sink
//!
//! Template markup is MiniJinja (`{{ value }}`, `{% if %}`, `{% for %}`,
//! `{% extends "base.layout.html" %}` with `{% block %}`).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use page_renderer::template::{
//!     CachePolicy, MemorySource, Renderer, TemplateLoader, TemplateStore,
//! };
//! use serde_json::json;
//!
//! let source = MemorySource::new().with_page("home", "Hello {{ Name }}");
//! let loader = TemplateLoader::new(Arc::new(source));
//! let renderer = Renderer::new(loader, Arc::new(TemplateStore::new()), CachePolicy::Cache);
//!
//! let mut page = Vec::new();
//! renderer.render(&mut page, "home", &json!({"Name": "Alice"})).unwrap();
//!
//! assert_eq!(page, b"Hello Alice");
//! ```

mod loader;
mod renderer;
mod source;
mod store;
mod types;

pub use loader::{LoaderOptions, TemplateLoader};
pub use renderer::Renderer;
pub use source::{
    FileSource, MemorySource, TemplateSource, DEFAULT_LAYOUT_SUFFIX, DEFAULT_PAGE_SUFFIX,
};
pub use store::TemplateStore;
pub use types::{CachePolicy, CompiledTemplate, Fragment, TemplateError, TemplateResult};
