mod settings;

pub use settings::{
    LogFormat, LoggingConfig, ServerConfig, Settings, TemplateSettings, DEFAULT_SITE_NAME,
};
