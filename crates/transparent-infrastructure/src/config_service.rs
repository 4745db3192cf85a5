//! Configuration service implementation.
//!
//! Loads [`AppConfig`] from `config.toml`, writing the defaults on first run
//! so users have a file to edit.

use std::path::PathBuf;
use transparent_core::config::AppConfig;
use transparent_core::error::Result;

use crate::storage::AtomicFile;

/// Loads and saves the application configuration.
#[derive(Clone)]
pub struct ConfigService {
    file: AtomicFile<AppConfig>,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::toml(path),
        }
    }

    /// Returns the stored configuration, creating the file with defaults
    /// when it does not exist.
    pub fn load_or_create(&self) -> Result<AppConfig> {
        if let Some(config) = self.file.load()? {
            return Ok(config);
        }

        let config = AppConfig::default();
        self.file.save(&config)?;
        tracing::info!(path = %self.file.path().display(), "Wrote default configuration");
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        self.file.save(config)?;
        Ok(())
    }
}
