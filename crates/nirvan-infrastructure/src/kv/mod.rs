//! Key-value store adapter.
//!
//! Every persisted record is a JSON string under a fixed key. Callers above
//! this layer never know which backend they are talking to; the backend is
//! picked once at startup from [`StorageConfig`].

mod file_store;
mod memory_store;

pub use file_store::FileKeyValueStore;
pub use memory_store::MemoryKeyValueStore;

use std::sync::Arc;

use nirvan_core::Result;
use nirvan_core::config::{StorageBackend, StorageConfig};

use crate::paths::NirvanPaths;

#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set(&self, key: &str, value: String) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn remove(&self, key: &str) -> Result<()>;

    /// Removes every key. Irreversible.
    async fn clear_all(&self) -> Result<()>;
}

/// Opens the backend named by the configuration.
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>> {
    match config.backend {
        StorageBackend::File => {
            let path = match &config.path {
                Some(path) => path.clone(),
                None => NirvanPaths::store_file()?,
            };
            tracing::info!("Opening file key-value store at {}", path.display());
            Ok(Arc::new(FileKeyValueStore::new(path)))
        }
        StorageBackend::Memory => {
            tracing::info!("Opening in-memory key-value store");
            Ok(Arc::new(MemoryKeyValueStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_store_file_backend_uses_configured_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        let store = open_store(&StorageConfig {
            backend: StorageBackend::File,
            path: Some(path.clone()),
        })
        .unwrap();

        store.set("k", "v".to_string()).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_backends_behave_the_same() {
        let temp_dir = TempDir::new().unwrap();
        let stores: Vec<Arc<dyn KeyValueStore>> = vec![
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(FileKeyValueStore::new(temp_dir.path().join("store.json"))),
        ];

        for store in stores {
            assert_eq!(store.get("a").await.unwrap(), None);
            store.set("a", "1".to_string()).await.unwrap();
            store.set("b", "2".to_string()).await.unwrap();
            store.set("a", "3".to_string()).await.unwrap();
            assert_eq!(store.get("a").await.unwrap().as_deref(), Some("3"));

            store.remove("a").await.unwrap();
            assert_eq!(store.get("a").await.unwrap(), None);
            assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));

            store.clear_all().await.unwrap();
            assert_eq!(store.get("b").await.unwrap(), None);
        }
    }
}
