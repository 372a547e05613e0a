//! Query execution boundary.
//!
//! The core builds query strings only, never executes them. A transport
//! implements [`QueryExecutor`]; its errors propagate unmodified. The
//! bundled [`FixtureExecutor`] replays captured results from JSON for
//! offline runs and tests.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Error type for query execution.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse fixture payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type for query execution.
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Trait for running compiled queries against one environment.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run an aggregate query and return its single record, keyed by alias.
    async fn run_aggregate_query(&self, query: &str) -> ExecutorResult<HashMap<String, Value>>;

    /// Run a sample query and return its rows.
    async fn run_sample_query(
        &self,
        query: &str,
    ) -> ExecutorResult<Vec<serde_json::Map<String, Value>>>;
}

/// Captured results for one environment.
///
/// The aggregate map holds the union of every query's aliases; replaying a
/// query returns the whole map, which merges idempotently downstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureExecutor {
    #[serde(default)]
    pub aggregates: HashMap<String, Value>,
    #[serde(default)]
    pub samples: Vec<serde_json::Map<String, Value>>,
}

impl FixtureExecutor {
    pub fn from_json_file(path: impl AsRef<Path>) -> ExecutorResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl QueryExecutor for FixtureExecutor {
    async fn run_aggregate_query(&self, _query: &str) -> ExecutorResult<HashMap<String, Value>> {
        Ok(self.aggregates.clone())
    }

    async fn run_sample_query(
        &self,
        _query: &str,
    ) -> ExecutorResult<Vec<serde_json::Map<String, Value>>> {
        Ok(self.samples.clone())
    }
}
