use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::template::{CachePolicy, LoaderOptions, DEFAULT_LAYOUT_SUFFIX, DEFAULT_PAGE_SUFFIX};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub templates: TemplateSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSettings {
    /// Directory holding page and layout files
    #[serde(default = "default_template_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_page_suffix")]
    pub page_suffix: String,
    #[serde(default = "default_layout_suffix")]
    pub layout_suffix: String,
    /// Reuse compiled templates (production) or rebuild per render (development)
    #[serde(default = "default_true")]
    pub use_cache: bool,
    /// Compile every page at startup
    #[serde(default = "default_true")]
    pub preload: bool,
    /// Fail a render that references a value missing from its payload
    #[serde(default = "default_true")]
    pub strict_undefined: bool,
    /// Rebuild cached templates older than this many seconds
    #[serde(default)]
    pub max_age_secs: Option<u64>,
    /// Values every page can reference
    #[serde(default = "default_globals")]
    pub globals: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_page_suffix() -> String {
    DEFAULT_PAGE_SUFFIX.to_string()
}

fn default_layout_suffix() -> String {
    DEFAULT_LAYOUT_SUFFIX.to_string()
}

fn default_true() -> bool {
    true
}

/// Site name the bundled layout shows when none is configured
pub const DEFAULT_SITE_NAME: &str = "Page Renderer";

fn default_globals() -> BTreeMap<String, String> {
    BTreeMap::from([("site_name".to_string(), DEFAULT_SITE_NAME.to_string())])
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("templates.dir", "templates")?
            .set_default("templates.use_cache", true)?
            .set_default("templates.preload", true)?
            .set_default("templates.globals.site_name", DEFAULT_SITE_NAME)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // APP__SERVER__PORT, APP__TEMPLATES__USE_CACHE, etc.
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl TemplateSettings {
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::from_use_cache(self.use_cache)
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age_secs.map(Duration::from_secs)
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            strict_undefined: self.strict_undefined,
            globals: self.globals.clone(),
            ..LoaderOptions::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            dir: default_template_dir(),
            page_suffix: default_page_suffix(),
            layout_suffix: default_layout_suffix(),
            use_cache: true,
            preload: true,
            strict_undefined: true,
            max_age_secs: None,
            globals: default_globals(),
        }
    }
}
