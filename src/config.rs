use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ExporterError;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the instance; endpoints resolve to `{base_url}/api/{path}`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token for admin endpoints
    #[serde(default)]
    pub token: Option<SecretString>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_scrape_interval")]
    pub scrape_interval_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9125
}

fn default_scrape_interval() -> u64 {
    15_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            scrape_interval_ms: default_scrape_interval(),
        }
    }
}

impl Config {
    /// Load configuration from an optional file and `FEDI_EXPORTER__*` variables.
    ///
    /// `.env` is expected to have been loaded by the caller so that the flat
    /// variable names handled by the CLI layer see it too.
    pub fn load(path: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("FEDI_EXPORTER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ExporterError> {
        if self.metrics.scrape_interval_ms == 0 {
            return Err(ExporterError::Config(
                "scrape_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(ExporterError::Config("api.base_url is empty".to_string()));
        }
        Ok(())
    }

    pub fn has_token(&self) -> bool {
        self.api.token.is_some()
    }
}
