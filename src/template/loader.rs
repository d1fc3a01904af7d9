//! Compiles page and layout fragments into executable templates

use std::collections::BTreeMap;
use std::sync::Arc;

use minijinja::{Environment, UndefinedBehavior, Value};

use super::source::TemplateSource;
use super::types::{CompiledTemplate, TemplateError, TemplateResult};

/// Engine options applied to every template the loader builds
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Referencing a value the payload does not have is an execution error
    pub strict_undefined: bool,
    /// Drop the first newline after a block tag
    pub trim_blocks: bool,
    /// Values visible to every page regardless of payload
    pub globals: BTreeMap<String, String>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            strict_undefined: true,
            trim_blocks: true,
            globals: BTreeMap::new(),
        }
    }
}

/// Turns a page plus the source's shared layouts into one [`CompiledTemplate`].
///
/// Loading has no side effects beyond reading the source and performs no
/// caching; the same fragments always produce an equivalent template.
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    source: Arc<dyn TemplateSource>,
    options: LoaderOptions,
}

impl TemplateLoader {
    pub fn new(source: Arc<dyn TemplateSource>) -> Self {
        Self::with_options(source, LoaderOptions::default())
    }

    pub fn with_options(source: Arc<dyn TemplateSource>, options: LoaderOptions) -> Self {
        Self { source, options }
    }

    /// Whether the source can resolve a page for this name
    pub fn contains(&self, name: &str) -> bool {
        self.source.contains(name)
    }

    /// Logical names of every page the source knows about
    pub fn pages(&self) -> TemplateResult<Vec<String>> {
        self.source.pages()
    }

    /// Read and compile the page `name` with every shared layout
    pub fn load(&self, name: &str) -> TemplateResult<CompiledTemplate> {
        let page = self.source.page(name)?;
        let layouts = self.source.layouts()?;

        let mut env = self.environment();

        for layout in layouts {
            let id = layout.id;
            env.add_template_owned(id.clone(), layout.text)
                .map_err(|e| TemplateError::syntax(&id, e))?;
        }

        // Added last so a page shadows a layout that happens to share its id.
        env.add_template_owned(page.id.clone(), page.text)
            .map_err(|e| TemplateError::syntax(&page.id, e))?;

        let compiled = CompiledTemplate::new(name.to_string(), page.id, env);

        tracing::debug!(
            template = %name,
            fragments = compiled.fragment_count(),
            "Template compiled"
        );

        Ok(compiled)
    }

    fn environment(&self) -> Environment<'static> {
        let mut env = Environment::new();

        env.set_trim_blocks(self.options.trim_blocks);
        if self.options.strict_undefined {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        }

        for (key, value) in &self.options.globals {
            env.add_global(key.clone(), Value::from(value.clone()));
        }

        env
    }
}
