//! Secret configuration file storage.
//!
//! Loads `secret.json` and resolves the backend credential, letting the
//! `GEMINI_API_KEY` environment variable take precedence over the file.
//! Writes go through [`AtomicFile`].

use std::fs;
use std::path::PathBuf;
use transparent_core::config::{GeminiConfig, SecretConfig};

use super::atomic_file::{AtomicFile, AtomicFileError};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Errors that can occur during secret storage operations.
#[derive(Debug)]
pub enum SecretStorageError {
    /// Configuration file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
    /// Failed to write the file.
    WriteError(AtomicFileError),
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStorageError::NotFound(path) => {
                write!(f, "Secret file not found at: {}", path.display())
            }
            SecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            SecretStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            SecretStorageError::WriteError(e) => write!(f, "Write error: {}", e),
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        SecretStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for SecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        SecretStorageError::ParseError(e)
    }
}

impl From<AtomicFileError> for SecretStorageError {
    fn from(e: AtomicFileError) -> Self {
        SecretStorageError::WriteError(e)
    }
}

/// Storage for `secret.json`.
///
/// # Security Note
///
/// The file is plaintext JSON. Its contents are never logged.
#[derive(Debug, Clone)]
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the secret configuration from the JSON file.
    ///
    /// # Returns
    ///
    /// - `Ok(SecretConfig)`: Successfully loaded and parsed
    /// - `Err(SecretStorageError::NotFound)`: File doesn't exist
    /// - `Err(SecretStorageError::IoError)`: Failed to read file
    /// - `Err(SecretStorageError::ParseError)`: Invalid JSON format
    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        if !self.path.exists() {
            return Err(SecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// Resolves the API key: `env_value` first, then the file.
    ///
    /// Empty keys count as absent. A missing or unreadable file is not an
    /// error; the caller simply gets `None`.
    pub fn resolve_api_key(&self, env_value: Option<String>) -> Option<String> {
        if let Some(key) = env_value.filter(|key| !key.trim().is_empty()) {
            return Some(key);
        }

        match self.load() {
            Ok(config) => config
                .gemini
                .map(|gemini| gemini.api_key)
                .filter(|key| !key.trim().is_empty()),
            Err(SecretStorageError::NotFound(_)) => None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), "Ignoring unreadable secret file: {}", err);
                None
            }
        }
    }

    /// Stores `api_key` as the Gemini credential, keeping the rest of the file.
    pub fn save_api_key(&self, api_key: &str) -> Result<(), SecretStorageError> {
        let api_key = api_key.to_string();
        self.file()
            .update(SecretConfig::default(), |config| {
                config.gemini = Some(GeminiConfig { api_key });
            })?;
        tracing::info!(path = %self.path.display(), "API key saved");
        Ok(())
    }

    /// Removes the stored Gemini credential. A missing file is left missing.
    pub fn clear_api_key(&self) -> Result<(), SecretStorageError> {
        if !self.path.exists() {
            return Ok(());
        }

        self.file()
            .update(SecretConfig::default(), |config| config.gemini = None)?;
        tracing::info!(path = %self.path.display(), "API key cleared");
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn file(&self) -> AtomicFile<SecretConfig> {
        AtomicFile::json(self.path.clone())
    }
}
