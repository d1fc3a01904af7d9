//! In-memory store of compiled templates keyed by name

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use once_cell::sync::OnceCell;

use super::types::{CompiledTemplate, TemplateResult};

#[derive(Debug)]
struct Entry {
    template: Arc<CompiledTemplate>,
    built_at: Instant,
}

/// Per-name cell. Empty until a build succeeds; concurrent populators of the
/// same name block on it while one of them builds.
#[derive(Debug, Default)]
struct Slot {
    cell: OnceCell<Entry>,
}

/// Single source of truth for which compiled templates exist.
///
/// The map lock only guards slot lookup and insertion. Builds run inside the
/// per-name cell, so a slow build for one name never blocks other names, and
/// at most one build per name runs at a time.
#[derive(Debug, Default)]
pub struct TemplateStore {
    slots: DashMap<String, Arc<Slot>>,
    max_age: Option<Duration>,
}

impl TemplateStore {
    /// Create an empty store whose entries never expire
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store whose entries are rebuilt once older than `max_age`
    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            max_age: Some(max_age),
        }
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Return the template stored under `name`, building it with `build` if absent.
    ///
    /// `build` is not invoked when a live entry exists. Callers racing on the
    /// same absent name wait for the first build and share its result. A
    /// failed build stores nothing; the next call builds again.
    pub fn populate<F>(&self, name: &str, build: F) -> TemplateResult<Arc<CompiledTemplate>>
    where
        F: FnOnce() -> TemplateResult<CompiledTemplate>,
    {
        let slot = self.slot(name);

        let result = slot.cell.get_or_try_init(|| {
            build().map(|template| Entry {
                template: Arc::new(template),
                built_at: Instant::now(),
            })
        });

        match result {
            Ok(entry) => Ok(Arc::clone(&entry.template)),
            Err(err) => {
                // Drop the empty slot unless someone else is already waiting on it.
                self.slots.remove_if(name, |_, current| {
                    Arc::ptr_eq(current, &slot)
                        && current.cell.get().is_none()
                        && Arc::strong_count(current) <= 2
                });
                Err(err)
            }
        }
    }

    /// Look up a live entry without building anything
    pub fn get(&self, name: &str) -> Option<Arc<CompiledTemplate>> {
        let slot = self.slots.get(name)?;
        let entry = slot.cell.get()?;
        if self.is_expired(entry) {
            return None;
        }
        Some(Arc::clone(&entry.template))
    }

    /// Whether a live entry exists for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove every entry
    pub fn reset(&self) {
        self.slots.clear();
        tracing::debug!("Template store reset");
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| {
                slot.value()
                    .cell
                    .get()
                    .is_some_and(|entry| !self.is_expired(entry))
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of every live entry, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .slots
            .iter()
            .filter(|slot| {
                slot.value()
                    .cell
                    .get()
                    .is_some_and(|entry| !self.is_expired(entry))
            })
            .map(|slot| slot.key().clone())
            .collect();
        names.sort();
        names
    }

    /// The slot to build into: the current one, or a fresh one when the name
    /// is absent or its entry has expired.
    fn slot(&self, name: &str) -> Arc<Slot> {
        if let Some(slot) = self.slots.get(name) {
            if !self.is_stale(&slot) {
                return Arc::clone(&slot);
            }
        }

        let mut slot = self.slots.entry(name.to_string()).or_default();
        if self.is_stale(&slot) {
            *slot = Arc::new(Slot::default());
        }
        Arc::clone(&slot)
    }

    fn is_stale(&self, slot: &Slot) -> bool {
        slot.cell.get().is_some_and(|entry| self.is_expired(entry))
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.max_age
            .is_some_and(|max_age| entry.built_at.elapsed() >= max_age)
    }
}
