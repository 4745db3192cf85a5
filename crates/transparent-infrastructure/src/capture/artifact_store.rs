//! Best-effort persistence of captured artifacts.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::naming::artifact_file_name;

/// An append-only directory of `<kind>_<epoch-millis>.<ext>` files.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    kind: &'static str,
    extension: &'static str,
}

impl ArtifactStore {
    pub fn new(dir: PathBuf, kind: &'static str, extension: &'static str) -> Self {
        Self {
            dir,
            kind,
            extension,
        }
    }

    pub fn screenshots(dir: PathBuf) -> Self {
        Self::new(dir, "screenshot", "png")
    }

    pub fn audio(dir: PathBuf) -> Self {
        Self::new(dir, "audio", "webm")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes a timestamped copy of `bytes`.
    ///
    /// Failures are logged and reported as `None`; they never fail the
    /// capture that produced the bytes.
    pub async fn persist(&self, bytes: &[u8]) -> Option<PathBuf> {
        let path = self.dir.join(artifact_file_name(self.kind, self.extension));

        let result: std::io::Result<()> = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, bytes).await
        }
        .await;

        match result {
            Ok(()) => {
                debug!(path = %path.display(), size = bytes.len(), "Persisted {}", self.kind);
                Some(path)
            }
            Err(err) => {
                warn!(path = %path.display(), "Failed to persist {}: {}", self.kind, err);
                None
            }
        }
    }
}
