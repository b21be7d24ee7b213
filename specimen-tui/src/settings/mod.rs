//! Persisted settings with typed values.

mod backend;
mod sqlite;

pub use backend::SettingsBackend;
pub use sqlite::SqliteBackend;

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Server base URL last used.
pub const SERVER_URL: &str = "server.url";
/// Per-request timeout in seconds; absent means no timeout.
pub const SERVER_TIMEOUT_SECS: &str = "server.timeout_secs";

/// Settings error type.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("database error: {0}")]
    Database(#[from] async_sqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(bincode::Error),
    #[error("deserialization error: {0}")]
    Deserialization(bincode::Error),
}

/// Typed settings provider.
///
/// Wraps a `SettingsBackend` with bincode (de)serialization.
#[derive(Clone)]
pub struct SettingsProvider {
    backend: Arc<dyn SettingsBackend>,
}

impl SettingsProvider {
    pub fn new(backend: impl SettingsBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Get a typed value for a key.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SettingsError> {
        match self.backend.get_bytes(key).await? {
            Some(bytes) => Ok(Some(
                bincode::deserialize(&bytes).map_err(SettingsError::Deserialization)?,
            )),
            None => Ok(None),
        }
    }

    /// Get a typed value for a key, returning a default if not found.
    pub async fn get_or<T: DeserializeOwned>(
        &self,
        key: &str,
        default: T,
    ) -> Result<T, SettingsError> {
        Ok(self.get(key).await?.unwrap_or(default))
    }

    /// Set a typed value for a key.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), SettingsError> {
        let bytes = bincode::serialize(value).map_err(SettingsError::Serialization)?;
        self.backend.set_bytes(key, bytes).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), SettingsError> {
        self.backend.delete(key).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use async_trait::async_trait;
    use dashmap::DashMap;

    /// In-memory backend for tests.
    #[derive(Default)]
    pub(crate) struct MemoryBackend {
        values: DashMap<String, Vec<u8>>,
    }

    #[async_trait]
    impl SettingsBackend for MemoryBackend {
        async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, SettingsError> {
            Ok(self.values.get(key).map(|v| v.clone()))
        }

        async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), SettingsError> {
            self.values.insert(key.to_string(), value);
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), SettingsError> {
            self.values.remove(key);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let settings = SettingsProvider::new(MemoryBackend::default());

        assert_eq!(settings.get::<String>(SERVER_URL).await.unwrap(), None);
        settings.set(SERVER_URL, &"http://example.org".to_string()).await.unwrap();
        assert_eq!(
            settings.get::<String>(SERVER_URL).await.unwrap().as_deref(),
            Some("http://example.org")
        );

        settings.delete(SERVER_URL).await.unwrap();
        assert_eq!(settings.get_or(SERVER_TIMEOUT_SECS, 30u64).await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_wrong_type_is_deserialization_error() {
        let settings = SettingsProvider::new(MemoryBackend::default());
        settings.set(SERVER_TIMEOUT_SECS, &1u8).await.unwrap();

        let err = settings.get::<u64>(SERVER_TIMEOUT_SECS).await.unwrap_err();
        assert!(matches!(err, SettingsError::Deserialization(_)));
    }
}
