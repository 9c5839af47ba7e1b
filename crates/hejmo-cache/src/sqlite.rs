// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `LocalCache` trait.
//!
//! One `cache` key-value table, WAL mode, and every access funneled through
//! a single `tokio-rusqlite` connection. Writers are serialized by that
//! connection's background thread; no additional locking.

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use tracing::debug;

use hejmo_core::{HejmoError, LocalCache};

/// Helper to convert tokio_rusqlite errors into HejmoError::Cache.
fn cache_err(e: tokio_rusqlite::Error) -> HejmoError {
    HejmoError::Cache {
        source: Box::new(e),
    }
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS cache (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// SQLite-backed durable key-value cache.
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Open (or create) the cache database at `path` and apply the schema.
    ///
    /// The special path `:memory:` opens a non-durable in-memory cache.
    /// The parent directory is created if missing.
    pub async fn open(path: &str) -> Result<Self, HejmoError> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()
                .await
                .map_err(|e| cache_err(e.into()))?
        } else {
            if let Some(parent) = std::path::Path::new(path).parent() {
                std::fs::create_dir_all(parent).map_err(|e| HejmoError::Cache {
                    source: Box::new(e),
                })?;
            }
            Connection::open(path)
                .await
                .map_err(|e| cache_err(e.into()))?
        };

        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;",
            )?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(cache_err)?;

        debug!(path, "cache opened");
        Ok(SqliteCache { conn })
    }

    /// Open a non-durable in-memory cache. Test convenience.
    pub async fn in_memory() -> Result<Self, HejmoError> {
        Self::open(":memory:").await
    }
}

#[async_trait]
impl LocalCache for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<String>, HejmoError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                let value = conn
                    .query_row(
                        "SELECT value FROM cache WHERE key = ?1",
                        rusqlite::params![key],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                Ok(value)
            })
            .await
            .map_err(cache_err)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), HejmoError> {
        let key = key.to_string();
        let value = value.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO cache (key, value, updated_at)
                     VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                     ON CONFLICT(key) DO UPDATE SET
                         value = excluded.value,
                         updated_at = excluded.updated_at",
                    rusqlite::params![key, value],
                )?;
                Ok(())
            })
            .await
            .map_err(cache_err)
    }
}
