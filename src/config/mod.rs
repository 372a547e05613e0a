//! Configuration module for orgdiff.
//!
//! Handles per-environment connection identity, environment variables, and
//! tool settings.

mod connection;
mod settings;

pub use connection::{ConnectionConfig, ConnectionError, EnvRole};
pub use settings::{
    expand_env_vars, EnvironmentSettings, MetadataSettings, RunDefaults, Settings, SettingsError,
};
