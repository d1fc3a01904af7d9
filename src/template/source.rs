//! Backing sources that template text is read from

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dashmap::DashMap;

use super::types::{Fragment, TemplateError, TemplateResult};

/// Default suffix of page files in a [`FileSource`]
pub const DEFAULT_PAGE_SUFFIX: &str = ".page.html";

/// Default suffix of shared layout files in a [`FileSource`]
pub const DEFAULT_LAYOUT_SUFFIX: &str = ".layout.html";

/// A place template fragments can be read from.
///
/// Implementations only read; they never cache compiled output.
pub trait TemplateSource: Send + Sync + fmt::Debug {
    /// Read the page registered under a logical name
    fn page(&self, name: &str) -> TemplateResult<Fragment>;

    /// Read every shared layout fragment, in a stable order.
    /// An empty set is valid.
    fn layouts(&self) -> TemplateResult<Vec<Fragment>>;

    /// Logical names of every page this source can resolve, sorted
    fn pages(&self) -> TemplateResult<Vec<String>>;

    /// Whether a page exists for this name
    fn contains(&self, name: &str) -> bool;
}

/// Templates stored as files in a single directory.
///
/// A page named `home` lives at `<root>/home.page.html`; every
/// `<root>/*.layout.html` file is a shared layout.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    page_suffix: String,
    layout_suffix: String,
}

impl FileSource {
    /// Create a source using the default suffixes
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_suffixes(root, DEFAULT_PAGE_SUFFIX, DEFAULT_LAYOUT_SUFFIX)
    }

    pub fn with_suffixes(
        root: impl Into<PathBuf>,
        page_suffix: impl Into<String>,
        layout_suffix: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            page_suffix: page_suffix.into(),
            layout_suffix: layout_suffix.into(),
        }
    }

    fn page_path(&self, name: &str) -> Option<PathBuf> {
        if !is_safe_name(name) {
            return None;
        }
        Some(self.root.join(format!("{}{}", name, self.page_suffix)))
    }

    /// File names in the root ending with `suffix`, sorted
    fn files_with_suffix(&self, suffix: &str) -> TemplateResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| read_error(&self.root, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| read_error(&self.root, e))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            if let Some(file_name) = entry.file_name().to_str() {
                if file_name.ends_with(suffix) && file_name.len() > suffix.len() {
                    names.push(file_name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

impl TemplateSource for FileSource {
    fn page(&self, name: &str) -> TemplateResult<Fragment> {
        let path = self
            .page_path(name)
            .ok_or_else(|| TemplateError::SourceNotFound(name.to_string()))?;

        let text = fs::read_to_string(&path).map_err(|e| read_error(&path, e))?;

        let id = format!("{}{}", name, self.page_suffix);
        Ok(Fragment::new(id, text))
    }

    fn layouts(&self) -> TemplateResult<Vec<Fragment>> {
        self.files_with_suffix(&self.layout_suffix)?
            .into_iter()
            .map(|file_name| {
                let path = self.root.join(&file_name);
                let text = fs::read_to_string(&path).map_err(|e| read_error(&path, e))?;
                Ok(Fragment::new(file_name, text))
            })
            .collect()
    }

    /// Only names `page` can resolve are listed
    fn pages(&self) -> TemplateResult<Vec<String>> {
        Ok(self
            .files_with_suffix(&self.page_suffix)?
            .into_iter()
            .map(|file_name| file_name[..file_name.len() - self.page_suffix.len()].to_string())
            .filter(|name| is_safe_name(name))
            .collect())
    }

    fn contains(&self, name: &str) -> bool {
        self.page_path(name).is_some_and(|path| path.is_file())
    }
}

/// Page names are flat identifiers; anything that could escape the root is rejected.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

fn read_error(path: &Path, err: io::Error) -> TemplateError {
    if err.kind() == io::ErrorKind::NotFound {
        TemplateError::SourceNotFound(path.display().to_string())
    } else {
        TemplateError::Io {
            path: path.display().to_string(),
            source: err,
        }
    }
}

/// Templates held as in-memory strings.
///
/// Backs tests and bundles compiled into the binary. Pages and layouts may be
/// replaced at any time; compiled templates already built are unaffected.
#[derive(Debug, Default)]
pub struct MemorySource {
    pages: DashMap<String, String>,
    layouts: DashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from a static bundle of `(name, text)` pages and layouts
    pub fn from_static(
        pages: &[(&'static str, &'static str)],
        layouts: &[(&'static str, &'static str)],
    ) -> Self {
        let source = Self::new();
        for (name, text) in pages {
            source.insert_page(*name, *text);
        }
        for (id, text) in layouts {
            source.insert_layout(*id, *text);
        }
        source
    }

    pub fn with_page(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert_page(name, text);
        self
    }

    pub fn with_layout(self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert_layout(id, text);
        self
    }

    /// Add or replace a page
    pub fn insert_page(&self, name: impl Into<String>, text: impl Into<String>) {
        self.pages.insert(name.into(), text.into());
    }

    /// Add or replace a shared layout
    pub fn insert_layout(&self, id: impl Into<String>, text: impl Into<String>) {
        self.layouts.insert(id.into(), text.into());
    }

    pub fn remove_page(&self, name: &str) -> bool {
        self.pages.remove(name).is_some()
    }
}

impl TemplateSource for MemorySource {
    fn page(&self, name: &str) -> TemplateResult<Fragment> {
        self.pages
            .get(name)
            .map(|text| Fragment::new(name, text.value().clone()))
            .ok_or_else(|| TemplateError::SourceNotFound(name.to_string()))
    }

    fn layouts(&self) -> TemplateResult<Vec<Fragment>> {
        let mut layouts: Vec<Fragment> = self
            .layouts
            .iter()
            .map(|entry| Fragment::new(entry.key().clone(), entry.value().clone()))
            .collect();
        layouts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(layouts)
    }

    fn pages(&self) -> TemplateResult<Vec<String>> {
        let mut names: Vec<String> = self.pages.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    fn contains(&self, name: &str) -> bool {
        self.pages.contains_key(name)
    }
}
