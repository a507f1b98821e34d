//! File-backed key-value backend.
//!
//! The whole store is one JSON object `{ key: value }`. Every mutation is a
//! locked read-modify-write of that object, run on the blocking pool.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nirvan_core::{NirvanError, Result};

use super::KeyValueStore;
use crate::storage::{AtomicJsonError, AtomicJsonFile};

type Entries = BTreeMap<String, String>;

#[derive(Clone)]
pub struct FileKeyValueStore {
    file: Arc<AtomicJsonFile<Entries>>,
}

impl FileKeyValueStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path)),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    async fn blocking<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&AtomicJsonFile<Entries>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || f(&file))
            .await
            .map_err(|e| NirvanError::internal(format!("Failed to join task: {}", e)))?
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn set(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.blocking(move |file| {
            file.update(Entries::new(), true, |entries| {
                entries.insert(key, value);
            })
            .map_err(NirvanError::from)
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.blocking(move |file| {
            let entries = match file.load() {
                Ok(entries) => entries.unwrap_or_default(),
                // The next write replaces an unparseable file.
                Err(AtomicJsonError::JsonError(e)) => {
                    tracing::warn!("Store file {} is unreadable: {}", file.path().display(), e);
                    Entries::new()
                }
                Err(e) => return Err(e.into()),
            };
            Ok(entries.get(&key).cloned())
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.blocking(move |file| {
            file.update(Entries::new(), true, |entries| {
                entries.remove(&key);
            })
            .map_err(NirvanError::from)
        })
        .await
    }

    async fn clear_all(&self) -> Result<()> {
        self.blocking(|file| {
            file.update(Entries::new(), true, |entries| entries.clear())
                .map_err(NirvanError::from)
        })
        .await
    }
}
