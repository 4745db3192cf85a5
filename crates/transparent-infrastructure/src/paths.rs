//! Unified path management for Transparent.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/transparent/       # Config directory
//! ├── config.toml              # Application configuration
//! ├── secret.json              # API keys
//! ├── conversations.json       # Persisted conversations
//! └── logs/                    # Application logs
//!     └── transparent-desktop.log.YYYY-MM-DD
//!
//! ~/.local/share/transparent/  # Data directory (captured artifacts)
//! ├── screenshots/             # screenshot_<epoch-millis>.png
//! ├── audio/                   # audio_<epoch-millis>.webm
//! └── uploads/                 # <epoch-millis>_<original-name>
//! ```

use std::path::{Path, PathBuf};

const APP_DIR: &str = "transparent";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolved config and data roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransparentPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl TransparentPaths {
    /// Resolves the platform directories, or places both roots under
    /// `base_path` when one is given (tests, portable installs).
    pub fn new(base_path: Option<&Path>) -> Result<Self, PathError> {
        if let Some(base) = base_path {
            return Ok(Self {
                config_dir: base.join("config"),
                data_dir: base.join("data"),
            });
        }

        let home = dirs::home_dir().ok_or(PathError::HomeDirNotFound)?;
        let config_dir = home.join(".config").join(APP_DIR);
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| home.join(".local").join("share"))
            .join(APP_DIR);

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600).
    pub fn secret_file(&self) -> PathBuf {
        self.config_dir.join("secret.json")
    }

    pub fn conversations_file(&self) -> PathBuf {
        self.config_dir.join("conversations.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.config_dir.join("logs")
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.data_dir.join("screenshots")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.data_dir.join("audio")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dirs_end_with_app_name() {
        let paths = TransparentPaths::new(None).unwrap();
        assert!(paths.config_dir().ends_with("transparent"));
        assert!(paths.data_dir().ends_with("transparent"));
    }

    #[test]
    fn test_base_path_override() {
        let base = Path::new("/tmp/transparent-test");
        let paths = TransparentPaths::new(Some(base)).unwrap();
        assert_eq!(paths.config_file(), base.join("config").join("config.toml"));
        assert_eq!(paths.uploads_dir(), base.join("data").join("uploads"));
    }

    #[test]
    fn test_files_live_under_config_dir() {
        let paths = TransparentPaths::new(None).unwrap();
        for file in [
            paths.config_file(),
            paths.secret_file(),
            paths.conversations_file(),
            paths.logs_dir(),
        ] {
            assert!(file.starts_with(paths.config_dir()));
        }
    }

    #[test]
    fn test_artifact_dirs_live_under_data_dir() {
        let paths = TransparentPaths::new(None).unwrap();
        assert!(paths.screenshots_dir().ends_with("screenshots"));
        assert!(paths.audio_dir().starts_with(paths.data_dir()));
    }
}
