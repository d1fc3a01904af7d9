//! Core template types: errors, fragments, compiled templates and the cache policy

use std::fmt;

use minijinja::{Environment, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A page or fragment the source was asked for does not exist
    #[error("Template source not found: {0}")]
    SourceNotFound(String),

    /// Malformed template markup in one fragment
    #[error("Syntax error in template fragment '{fragment}': {message}")]
    Syntax { fragment: String, message: String },

    /// The requested name was never registered and the source cannot resolve it
    #[error("Template not found: {0}")]
    NotFound(String),

    /// The payload does not fit the template's actions
    #[error("Failed to execute template '{name}': {source}")]
    Execution {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// The sink rejected the rendered output
    #[error("Failed to write rendered output: {0}")]
    Write(#[source] std::io::Error),

    /// Reading from the backing source failed for a reason other than absence
    #[error("Failed to read template source '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl TemplateError {
    /// Short, stable label used for metrics and error codes
    pub fn kind(&self) -> &'static str {
        match self {
            TemplateError::SourceNotFound(_) => "source_not_found",
            TemplateError::Syntax { .. } => "syntax",
            TemplateError::NotFound(_) => "not_found",
            TemplateError::Execution { .. } => "execution",
            TemplateError::Write(_) => "write",
            TemplateError::Io { .. } => "io",
        }
    }

    pub(crate) fn syntax(fragment: &str, err: minijinja::Error) -> Self {
        TemplateError::Syntax {
            fragment: fragment.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Whether compiled templates are reused or rebuilt on every render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Build each template once and serve it from the store (production)
    Cache,
    /// Build a fresh template on every render and never store it (development)
    Reload,
}

impl CachePolicy {
    /// Map the conventional `use_cache` flag to a policy
    pub fn from_use_cache(use_cache: bool) -> Self {
        if use_cache {
            CachePolicy::Cache
        } else {
            CachePolicy::Reload
        }
    }

    pub fn is_cache(self) -> bool {
        self == CachePolicy::Cache
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CachePolicy::Cache => "cache",
            CachePolicy::Reload => "reload",
        }
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named piece of template text read from a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Identifier the fragment is registered under (used by `extends`/`include`)
    pub id: String,
    /// Raw template text
    pub text: String,
}

impl Fragment {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A parsed, ready-to-execute page together with every layout it may reference.
///
/// Immutable once built. Layout references are resolved inside the owned
/// environment, so execution never touches the backing source.
#[derive(Debug)]
pub struct CompiledTemplate {
    name: String,
    entry: String,
    env: Environment<'static>,
}

impl CompiledTemplate {
    pub(crate) fn new(name: String, entry: String, env: Environment<'static>) -> Self {
        Self { name, entry, env }
    }

    /// Logical name this template was built for
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of fragments (page plus layouts) merged into this template
    pub fn fragment_count(&self) -> usize {
        self.env.templates().count()
    }

    /// Execute against a payload, producing the complete output in memory
    pub fn execute<S: Serialize + ?Sized>(&self, payload: &S) -> TemplateResult<String> {
        self.env
            .get_template(&self.entry)
            .and_then(|tmpl| tmpl.render(Value::from_serialize(payload)))
            .map_err(|source| TemplateError::Execution {
                name: self.name.clone(),
                source,
            })
    }
}
