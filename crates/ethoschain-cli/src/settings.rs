use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use ethoschain_core::AuditSettings;
use serde::Deserialize;

const ENV_PREFIX: &str = "ETHOS";

/// Logging output style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Console,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Console,
        }
    }
}

/// Everything the binary reads at start-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audit: AuditSettings,
    pub logging: LogSettings,
}

/// Layer an optional config file under `ETHOS_*` environment variables.
///
/// Nested keys use `__`, e.g. `ETHOS_AUDIT__THRESHOLDS__RED=80`.
pub fn load(path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }
    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("failed to assemble configuration")?;
    let app: AppConfig = config
        .try_deserialize()
        .context("failed to deserialize configuration")?;
    app.audit.validate().context("invalid audit configuration")?;
    Ok(app)
}
