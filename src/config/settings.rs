//! TOML-based configuration for orgdiff.
//!
//! Supports a config file (orgdiff.toml) with environment variable
//! expansion.
//!
//! Example configuration:
//! ```toml
//! [environments.source]
//! instance_url = "https://prod.example.my.salesforce.com"
//! access_token = "${PROD_ACCESS_TOKEN}"
//! api_version = "v62.0"
//!
//! [environments.target]
//! instance_url = "https://sandbox.example.my.salesforce.com"
//! access_token = "${SANDBOX_ACCESS_TOKEN}"
//!
//! [defaults]
//! sample_limit = 10
//!
//! [metadata]
//! cache_enabled = true
//! cache_ttl_seconds = 3600
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Environment not found in config: {0}")]
    EnvironmentNotFound(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Named environment connections.
    pub environments: HashMap<String, EnvironmentSettings>,

    /// Run defaults.
    pub defaults: RunDefaults,

    /// Metadata cache configuration.
    pub metadata: MetadataSettings,
}

/// One named environment in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnvironmentSettings {
    /// Instance base URL.
    pub instance_url: String,

    /// Access token (supports `${ENV_VAR}` expansion).
    pub access_token: String,

    /// API version; falls back to the tool default when absent.
    #[serde(default)]
    pub api_version: Option<String>,
}

impl EnvironmentSettings {
    /// Access token with environment variables expanded.
    pub fn resolved_access_token(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.access_token)
    }
}

/// Defaults applied when the CLI flags are absent.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunDefaults {
    /// Rows per environment for `--sample`.
    pub sample_limit: usize,
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self { sample_limit: 10 }
    }
}

/// Metadata cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetadataSettings {
    pub cache_enabled: bool,
    pub cache_ttl_seconds: u64,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl_seconds: 3600,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Load `orgdiff.toml` from the working directory if present, else
    /// defaults.
    pub fn load_or_default() -> Result<Self, SettingsError> {
        let path = Path::new("orgdiff.toml");
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Look up a named environment.
    pub fn environment(&self, name: &str) -> Result<&EnvironmentSettings, SettingsError> {
        self.environments
            .get(name)
            .ok_or_else(|| SettingsError::EnvironmentNotFound(name.to_string()))
    }
}

/// Expand `${VAR}` references against the process environment.
pub fn expand_env_vars(input: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| SettingsError::MissingEnvVar(after.to_string()))?;
        let name = &after[..end];
        let value = env::var(name).map_err(|_| SettingsError::MissingEnvVar(name.to_string()))?;
        result.push_str(&value);
        rest = &after[end + 1..];
    }
    result.push_str(rest);
    Ok(result)
}
