//! Unified path management for nirvan configuration and data files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/nirvan/            # Config directory
//! ├── config.toml              # Application configuration
//! └── secret.json              # Completion API key
//!
//! ~/.local/share/nirvan/       # Data directory
//! └── store.json               # Key-value store (file backend)
//! ```

use std::path::PathBuf;

const APP_DIR_NAME: &str = "nirvan";

/// Errors that can occur during path resolution.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Cannot find home directory")]
    HomeDirNotFound,
}

impl From<PathError> for nirvan_core::NirvanError {
    fn from(err: PathError) -> Self {
        nirvan_core::NirvanError::config(err.to_string())
    }
}

pub struct NirvanPaths;

impl NirvanPaths {
    /// Returns the nirvan configuration directory (e.g. `~/.config/nirvan/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the nirvan data directory (e.g. `~/.local/share/nirvan/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// The file holds the completion API key in plaintext; keep it at mode 600.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    /// Default location of the file-backed key-value store.
    pub fn store_file() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("store.json"))
    }
}
