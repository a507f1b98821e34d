//! Atomic JSON file operations.
//!
//! Writes go to a sibling tmp file that is fsynced and renamed over the
//! target, so readers never observe a half-written document. Read-modify-write
//! cycles hold an exclusive lock on a sibling `.lock` file for their whole
//! duration. The lock file is never removed: every process must lock the
//! same inode.

use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use nirvan_core::NirvanError;

/// Errors that can occur during atomic JSON operations.
#[derive(Debug, thiserror::Error)]
pub enum AtomicJsonError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Lock error: {0}")]
    LockError(String),
}

impl From<AtomicJsonError> for NirvanError {
    fn from(e: AtomicJsonError) -> Self {
        match e {
            AtomicJsonError::IoError(io) => io.into(),
            AtomicJsonError::JsonError(json) => json.into(),
            AtomicJsonError::LockError(message) => NirvanError::storage(message),
        }
    }
}

/// A handle to a JSON document on disk.
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>, AtomicJsonError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let data: T = serde_json::from_str(&content)?;
        Ok(Some(data))
    }

    /// Saves data atomically (tmp file + fsync + rename).
    pub fn save(&self, data: &T) -> Result<(), AtomicJsonError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Performs a locked read-modify-write.
    ///
    /// When the current document cannot be parsed and `reset_on_corrupt` is
    /// set, the update starts from `default_value` instead of failing.
    pub fn update<F, R>(
        &self,
        default_value: T,
        reset_on_corrupt: bool,
        f: F,
    ) -> Result<R, AtomicJsonError>
    where
        F: FnOnce(&mut T) -> R,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = match self.load() {
            Ok(loaded) => loaded.unwrap_or(default_value),
            Err(AtomicJsonError::JsonError(e)) if reset_on_corrupt => {
                tracing::warn!(
                    "Discarding unreadable store file {}: {}",
                    self.path.display(),
                    e
                );
                default_value
            }
            Err(e) => return Err(e),
        };

        let result = f(&mut data);
        self.save(&data)?;

        Ok(result)
    }

    fn temp_path(&self) -> Result<PathBuf, AtomicJsonError> {
        let parent = self.path.parent().ok_or_else(|| {
            AtomicJsonError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        })?;

        let file_name = self.path.file_name().ok_or_else(|| {
            AtomicJsonError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no file name",
            ))
        })?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }
}

/// Holds an exclusive lock until dropped; closing the handle releases it.
struct FileLock {
    _file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicJsonError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| AtomicJsonError::LockError(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { _file: file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        name: String,
        count: u32,
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Counter>::new(temp_dir.path().join("missing.json"));
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_update_creates_then_accumulates() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::<Counter>::new(temp_dir.path().join("nested/counter.json"));

        file.update(Counter::default(), false, |c| c.count += 10)
            .unwrap();
        file.update(Counter::default(), false, |c| c.count += 5)
            .unwrap();

        assert_eq!(file.load().unwrap().unwrap().count, 15);
        assert!(!temp_dir.path().join("nested/.counter.json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_lock_file_is_kept_between_updates() {
        use std::os::unix::fs::MetadataExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("counter.json");
        let lock_path = temp_dir.path().join("counter.lock");
        let file = AtomicJsonFile::<Counter>::new(path.clone());

        file.update(Counter::default(), false, |c| c.count += 1)
            .unwrap();
        assert!(lock_path.exists());
        let inode_before = fs::metadata(&lock_path).unwrap().ino();

        // A second handle, as another process would open, locks the same file.
        let other = AtomicJsonFile::<Counter>::new(path);
        other
            .update(Counter::default(), false, |c| c.count += 1)
            .unwrap();

        assert_eq!(fs::metadata(&lock_path).unwrap().ino(), inode_before);
        assert_eq!(file.load().unwrap().unwrap().count, 2);
    }

    #[test]
    fn test_update_on_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("counter.json");
        fs::write(&path, "{ not json").unwrap();
        let file = AtomicJsonFile::<Counter>::new(path);

        assert!(file.update(Counter::default(), false, |c| c.count += 1).is_err());

        let count = file
            .update(Counter::default(), true, |c| {
                c.count += 1;
                c.count
            })
            .unwrap();
        assert_eq!(count, 1);
    }
}
