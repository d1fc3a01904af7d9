//! Render entry point: resolve a compiled template per the cache policy and
//! write its output to a sink.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::metrics::RenderMetrics;

use super::loader::TemplateLoader;
use super::store::TemplateStore;
use super::types::{CachePolicy, CompiledTemplate, TemplateError, TemplateResult};

/// Renders named templates against caller-supplied payloads.
///
/// Output is produced in memory first and only written to the sink once
/// execution has fully succeeded, so a sink never sees a partial page.
/// Errors are returned to the caller untouched; nothing is logged here.
#[derive(Debug)]
pub struct Renderer {
    loader: TemplateLoader,
    store: Arc<TemplateStore>,
    use_cache: AtomicBool,
}

impl Renderer {
    pub fn new(loader: TemplateLoader, store: Arc<TemplateStore>, policy: CachePolicy) -> Self {
        Self {
            loader,
            store,
            use_cache: AtomicBool::new(policy.is_cache()),
        }
    }

    pub fn store(&self) -> &Arc<TemplateStore> {
        &self.store
    }

    pub fn policy(&self) -> CachePolicy {
        CachePolicy::from_use_cache(self.use_cache.load(Ordering::Acquire))
    }

    /// Switch the cache policy.
    ///
    /// Leaving `Cache` clears the store so a later return to `Cache` never
    /// serves templates built under the old configuration.
    pub fn set_policy(&self, policy: CachePolicy) {
        let was_cache = self.use_cache.swap(policy.is_cache(), Ordering::AcqRel);
        if was_cache && !policy.is_cache() {
            self.store.reset();
            RenderMetrics::observe_store(&self.store);
        }
    }

    /// Resolve the compiled template for `name`.
    ///
    /// Under `Cache` the store is consulted and populated on a miss; under
    /// `Reload` a fresh template is built and the store is never touched.
    pub fn template(&self, name: &str) -> TemplateResult<Arc<CompiledTemplate>> {
        let policy = self.policy();

        let result = if policy.is_cache() {
            let mut built = false;
            let result = self.store.populate(name, || {
                built = true;
                self.build(name, policy)
            });

            if built {
                RenderMetrics::observe_store(&self.store);
            } else if result.is_ok() {
                RenderMetrics::record_cache_hit();
            }
            result
        } else {
            self.build(name, policy).map(Arc::new)
        };

        result.map_err(|err| self.classify(name, err))
    }

    /// Execute `name` against `payload` and return the complete output
    pub fn render_to_string<S>(&self, name: &str, payload: &S) -> TemplateResult<String>
    where
        S: Serialize + ?Sized,
    {
        let started = Instant::now();
        let result = self.execute(name, payload);
        RenderMetrics::record_render(outcome(&result), started.elapsed());
        result
    }

    /// Execute `name` against `payload` and write the output to `sink`.
    ///
    /// `sink` receives nothing unless the template resolved and executed
    /// successfully.
    pub fn render<W, S>(&self, sink: &mut W, name: &str, payload: &S) -> TemplateResult<()>
    where
        W: Write + ?Sized,
        S: Serialize + ?Sized,
    {
        let started = Instant::now();

        let result = self.execute(name, payload).and_then(|output| {
            sink.write_all(output.as_bytes())
                .and_then(|()| sink.flush())
                .map_err(TemplateError::Write)
        });

        RenderMetrics::record_render(outcome(&result), started.elapsed());
        result
    }

    /// Compile every page the source lists.
    ///
    /// Under `Cache` the results are stored; under `Reload` this only checks
    /// that every page compiles. Returns the number of pages.
    pub fn preload(&self) -> TemplateResult<usize> {
        let names = self.loader.pages()?;
        for name in &names {
            self.template(name)?;
        }
        Ok(names.len())
    }

    fn execute<S>(&self, name: &str, payload: &S) -> TemplateResult<String>
    where
        S: Serialize + ?Sized,
    {
        self.template(name)?.execute(payload)
    }

    fn build(&self, name: &str, policy: CachePolicy) -> TemplateResult<CompiledTemplate> {
        RenderMetrics::record_build(policy);
        self.loader.load(name)
    }

    /// A missing page the source cannot resolve at all is reported by name.
    fn classify(&self, name: &str, err: TemplateError) -> TemplateError {
        match err {
            TemplateError::SourceNotFound(_) if !self.loader.contains(name) => {
                TemplateError::NotFound(name.to_string())
            }
            other => other,
        }
    }
}

fn outcome<T>(result: &TemplateResult<T>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(err) => err.kind(),
    }
}
