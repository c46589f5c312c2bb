//! Configuration for the arrangement pipeline and its oracle
//!
//! Loaded from TOML; every key is optional and falls back to the defaults
//! below.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArrangerConfig {
    /// Upper bound on a single oracle call, in seconds
    pub timeout_secs: u64,
    /// Extra attempts after an oracle failure (parse failures are never retried)
    pub retries: u32,
    pub oracle: OracleConfig,
}

/// Settings for the HTTP layout oracle
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub endpoint: String,
    pub model: String,
    /// Inline API key; takes precedence over `api_key_env`
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset
    pub api_key_env: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for ArrangerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            retries: 0,
            oracle: OracleConfig::default(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-pro".to_string(),
            api_key: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            temperature: 0.1,
            max_output_tokens: 32000,
        }
    }
}

impl ArrangerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Set the oracle call timeout (whole seconds)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Set how many times a failed oracle call is re-issued
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the oracle configuration
    pub fn with_oracle(mut self, oracle: OracleConfig) -> Self {
        self.oracle = oracle;
        self
    }
}

impl OracleConfig {
    /// The API key from the config, else from the configured environment variable
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .map(|key| key.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
            .filter(|key| !key.is_empty())
    }
}
