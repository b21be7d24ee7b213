//! Settings stored in a single SQLite table.

use std::path::Path;

use async_sqlite::{Client, ClientBuilder};
use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use rusqlite::OptionalExtension;

use super::{SettingsBackend, SettingsError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS preferences (
    key        TEXT PRIMARY KEY,
    value      BLOB NOT NULL,
    updated_at INTEGER NOT NULL
)";

/// SQLite preference store.
///
/// Lookups are cached, misses included: the startup path asks for the same
/// few keys and most of them are usually unset.
pub struct SqliteBackend {
    client: Client,
    cache: DashMap<String, Option<Vec<u8>>>,
}

impl SqliteBackend {
    /// Opens (or creates) the preference database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        debug!("Opening preferences at {}", path.as_ref().display());
        let client = ClientBuilder::new().path(path).open().await?;
        client.conn(|conn| conn.execute_batch(SCHEMA)).await?;

        Ok(Self {
            client,
            cache: DashMap::new(),
        })
    }

    /// When `key` was last written, as a Unix timestamp.
    pub async fn updated_at(&self, key: &str) -> Result<Option<i64>, SettingsError> {
        let key = key.to_string();
        let stamp = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT updated_at FROM preferences WHERE key = ?1",
                    [&key],
                    |row| row.get(0),
                )
                .optional()
            })
            .await?;
        Ok(stamp)
    }
}

#[async_trait]
impl SettingsBackend for SqliteBackend {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, SettingsError> {
        if let Some(cached) = self.cache.get(key) {
            return Ok(cached.clone());
        }

        let owned = key.to_string();
        let value: Option<Vec<u8>> = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT value FROM preferences WHERE key = ?1",
                    [&owned],
                    |row| row.get(0),
                )
                .optional()
            })
            .await?;

        self.cache.insert(key.to_string(), value.clone());
        Ok(value)
    }

    async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), SettingsError> {
        let owned = key.to_string();
        let stored = value.clone();
        let now = chrono::Utc::now().timestamp();

        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE
                     SET value = excluded.value, updated_at = excluded.updated_at",
                    rusqlite::params![owned, stored, now],
                )
            })
            .await?;

        debug!("Stored preference {} ({} bytes)", key, value.len());
        self.cache.insert(key.to_string(), Some(value));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SettingsError> {
        let owned = key.to_string();
        self.client
            .conn(move |conn| conn.execute("DELETE FROM preferences WHERE key = ?1", [&owned]))
            .await?;

        self.cache.insert(key.to_string(), None);
        Ok(())
    }
}
