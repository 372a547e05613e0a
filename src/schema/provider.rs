//! SchemaProvider trait definition.
//!
//! The SchemaProvider trait abstracts over different ways of fetching an
//! object's describe metadata. The core only ever calls `describe_object`
//! once per environment per run; anything network-shaped lives behind this
//! boundary.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use super::ObjectSchema;
use crate::cache::MetadataCache;

/// Error type for schema discovery.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Failed to read describe file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse describe payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] crate::cache::CacheError),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type for schema discovery.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Trait for fetching object metadata from an environment.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Fetch the describe snapshot for an object.
    async fn describe_object(&self, object: &str) -> SchemaResult<ObjectSchema>;
}

/// Provider backed by describe payloads already on disk or in memory.
///
/// Used for offline planning and tests; a live transport implements
/// [`SchemaProvider`] directly.
#[derive(Debug, Default)]
pub struct StaticSchemaProvider {
    schemas: HashMap<String, ObjectSchema>,
}

impl StaticSchemaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema snapshot.
    pub fn insert(&mut self, schema: ObjectSchema) {
        self.schemas.insert(schema.name.to_lowercase(), schema);
    }

    /// Load a single object's describe JSON from a file.
    pub fn from_json_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let schema: ObjectSchema = serde_json::from_str(&text)?;
        let mut provider = Self::new();
        provider.insert(schema);
        Ok(provider)
    }
}

#[async_trait]
impl SchemaProvider for StaticSchemaProvider {
    async fn describe_object(&self, object: &str) -> SchemaResult<ObjectSchema> {
        self.schemas
            .get(&object.to_lowercase())
            .cloned()
            .ok_or_else(|| SchemaError::ObjectNotFound(object.to_string()))
    }
}

/// Time-boxed caching wrapper around any provider.
///
/// Keys are `{env_hash}:describe:{api_version}:{object}`; entries older than
/// the TTL are treated as absent and re-fetched from the inner provider.
pub struct CachedSchemaProvider<P> {
    inner: P,
    cache: Mutex<MetadataCache>,
    env_hash: String,
    api_version: String,
    ttl_seconds: u64,
}

impl<P: SchemaProvider> CachedSchemaProvider<P> {
    pub fn new(
        inner: P,
        cache: MetadataCache,
        env_hash: impl Into<String>,
        api_version: impl Into<String>,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
            env_hash: env_hash.into(),
            api_version: api_version.into(),
            ttl_seconds,
        }
    }

    fn cache_key(&self, object: &str) -> String {
        format!(
            "{}:describe:{}:{}",
            self.env_hash,
            self.api_version,
            object.to_lowercase()
        )
    }
}

#[async_trait]
impl<P: SchemaProvider> SchemaProvider for CachedSchemaProvider<P> {
    async fn describe_object(&self, object: &str) -> SchemaResult<ObjectSchema> {
        let key = self.cache_key(object);

        {
            let cache = self.cache.lock().expect("cache lock poisoned");
            if let Some(schema) = cache.get_fresh::<ObjectSchema>(&key, self.ttl_seconds)? {
                tracing::debug!(object, "describe cache hit");
                return Ok(schema);
            }
        }

        let schema = self.inner.describe_object(object).await?;

        let cache = self.cache.lock().expect("cache lock poisoned");
        cache.set(&key, &schema)?;
        Ok(schema)
    }
}
