//! Secret configuration file storage.
//!
//! Loads the completion API key from `~/.config/nirvan/secret.json`.

use crate::paths::NirvanPaths;
use nirvan_core::config::SecretConfig;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SecretStorageError {
    #[error("Secret file not found at: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read secret file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Secret file is not valid JSON: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Could not determine home directory")]
    ConfigDirNotFound,
}

/// Read-only access to secret.json.
///
/// Does NOT write, validate or encrypt anything; the file is plaintext.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    pub fn new() -> Result<Self, SecretStorageError> {
        let path = NirvanPaths::secret_file().map_err(|_| SecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a new SecretStorage with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        if !self.path.exists() {
            return Err(SecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
