//! Per-environment connection configuration.
//!
//! Supports configuration via environment variables, one set per role:
//! - `ORGDIFF_SOURCE_INSTANCE_URL` / `ORGDIFF_TARGET_INSTANCE_URL`
//! - `ORGDIFF_SOURCE_ACCESS_TOKEN` / `ORGDIFF_TARGET_ACCESS_TOKEN`
//! - `ORGDIFF_SOURCE_API_VERSION` / `ORGDIFF_TARGET_API_VERSION` (optional)
//!
//! The core never opens a connection itself; this identity is handed to the
//! transport collaborator and hashed for cache key prefixes.

use std::env;

use serde::Serialize;

use crate::cache::compute_hash;

/// Default API version when none is configured.
const DEFAULT_API_VERSION: &str = "v62.0";

/// Error type for connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Which side of the comparison a connection serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvRole {
    Source,
    Target,
}

impl EnvRole {
    /// Environment-variable prefix for this role.
    pub fn prefix(&self) -> &'static str {
        match self {
            EnvRole::Source => "ORGDIFF_SOURCE",
            EnvRole::Target => "ORGDIFF_TARGET",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvRole::Source => "source",
            EnvRole::Target => "target",
        }
    }
}

/// Connection identity for one environment.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Role label, used in diagnostics and error messages.
    pub label: String,
    /// Instance base URL.
    pub instance_url: String,
    /// Bearer token for the transport collaborator.
    pub access_token: String,
    /// API version, e.g. `v62.0`.
    pub api_version: String,
}

impl ConnectionConfig {
    /// Load configuration for a role from environment variables.
    pub fn from_env(role: EnvRole) -> Result<Self, ConnectionError> {
        let prefix = role.prefix();
        let var = |suffix: &str| format!("{}_{}", prefix, suffix);

        let instance_url = env::var(var("INSTANCE_URL"))
            .map_err(|_| ConnectionError::MissingEnvVar(var("INSTANCE_URL")))?;
        let access_token = env::var(var("ACCESS_TOKEN"))
            .map_err(|_| ConnectionError::MissingEnvVar(var("ACCESS_TOKEN")))?;
        let api_version =
            env::var(var("API_VERSION")).unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());

        if instance_url.trim().is_empty() {
            return Err(ConnectionError::InvalidConfig(format!(
                "{} must not be empty",
                var("INSTANCE_URL")
            )));
        }

        Ok(Self {
            label: role.as_str().to_string(),
            instance_url,
            access_token,
            api_version,
        })
    }

    /// Stable hash of the connection identity, used as a cache key prefix.
    /// The access token is deliberately excluded.
    pub fn env_hash(&self) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct Identity<'a> {
            instance_url: &'a str,
            api_version: &'a str,
        }
        compute_hash(&Identity {
            instance_url: &self.instance_url,
            api_version: &self.api_version,
        })
    }
}
