//! SQLite-based describe cache.
//!
//! Persistent caching of describe snapshots to avoid re-fetching field
//! metadata on every run. The cache is stored in `~/.orgdiff/cache.db`.
//!
//! # Design
//!
//! - Key-value store with JSON values and a stored-at timestamp
//! - Time-boxed: readers pass a TTL and stale entries read as absent
//! - Versioned: auto-clears on version mismatch
//!
//! # Key Format
//!
//! ```text
//! {env_hash}:describe:{api_version}:{object}  -> ObjectSchema
//! ```

mod hash;
pub use hash::compute_hash;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

/// Current cache schema version. Bump this when the cache format changes.
const CACHE_VERSION: i32 = 1;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to determine cache directory")]
    NoCacheDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// SQLite-based describe cache.
pub struct MetadataCache {
    conn: Connection,
}

impl MetadataCache {
    /// Open or create the cache database at `~/.orgdiff/cache.db`.
    ///
    /// If the stored version doesn't match, the cache is cleared.
    pub fn open() -> CacheResult<Self> {
        let path = Self::cache_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        let cache = Self { conn };
        cache.init()?;

        Ok(cache)
    }

    /// Open an in-memory cache (for testing).
    pub fn open_in_memory() -> CacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.init()?;
        Ok(cache)
    }

    /// Get the path to the cache database.
    pub fn cache_path() -> CacheResult<PathBuf> {
        let base = dirs::home_dir().ok_or(CacheError::NoCacheDir)?;
        Ok(base.join(".orgdiff").join("cache.db"))
    }

    fn init(&self) -> CacheResult<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                stored_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        let stored_version: Option<i32> = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
                let s: String = row.get(0)?;
                Ok(s.parse().unwrap_or(0))
            })
            .optional()?;

        match stored_version {
            Some(v) if v == CACHE_VERSION => {}
            Some(_) => {
                self.clear_all()?;
                self.set_version()?;
            }
            None => {
                self.set_version()?;
            }
        }

        Ok(())
    }

    fn set_version(&self) -> CacheResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('version', ?)",
            params![CACHE_VERSION.to_string()],
        )?;
        Ok(())
    }

    /// Get a value regardless of age.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM cache WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    /// Get a value only if it was stored within the last `ttl_seconds`.
    pub fn get_fresh<T: DeserializeOwned>(
        &self,
        key: &str,
        ttl_seconds: u64,
    ) -> CacheResult<Option<T>> {
        let row: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT value, stored_at FROM cache WHERE key = ?",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((json, stored_at)) => {
                let age = now_epoch().saturating_sub(stored_at.max(0) as u64);
                if age > ttl_seconds {
                    return Ok(None);
                }
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }

    /// Set a value, stamped with the current time.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> CacheResult<()> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO cache (key, value, stored_at) VALUES (?, ?, ?)",
            params![key, json, now_epoch() as i64],
        )?;
        Ok(())
    }

    /// Delete all entries matching a key prefix.
    pub fn delete_prefix(&self, prefix: &str) -> CacheResult<usize> {
        let pattern = format!("{}%", prefix);
        let rows = self
            .conn
            .execute("DELETE FROM cache WHERE key LIKE ?", params![pattern])?;
        Ok(rows)
    }

    /// Clear all cache entries (but keep metadata).
    pub fn clear_all(&self) -> CacheResult<()> {
        self.conn.execute("DELETE FROM cache", [])?;
        Ok(())
    }

    /// Clear cache entries for a specific environment.
    pub fn clear_environment(&self, env_hash: &str) -> CacheResult<usize> {
        self.delete_prefix(&format!("{}:", env_hash))
    }
}

fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
