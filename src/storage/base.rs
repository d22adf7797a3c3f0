use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{file_storage::FileStorage, memory_storage::MemoryStorage};
use crate::config::{StorageBackend, StorageConfig};
use crate::error::StorageError;

/// Key under which the bearer token is persisted.
pub const TOKEN_KEY: &str = "token";
/// Key under which the JSON-serialized user is persisted.
pub const USER_KEY: &str = "user";

/// Durable string key/value storage, the client-side equivalent of a browser's
/// local storage. Removing a missing key is not an error.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn is_durable(&self) -> bool {
        true
    }
}

/// Creates a concrete storage implementation based on the StorageConfig.
pub fn create_storage(config: &StorageConfig) -> Arc<dyn Storage> {
    match &config.backend {
        StorageBackend::Memory => {
            info!("Session storage is in-memory; sessions will not survive a restart.");
            Arc::new(MemoryStorage::new())
        }
        StorageBackend::File(file_config) => {
            info!(
                "Session storage is file-backed at '{}'",
                file_config.path.display()
            );
            Arc::new(FileStorage::new(file_config))
        }
    }
}
