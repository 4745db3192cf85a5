//! File capture adapter.
//!
//! Resolves the media type from the extension and stages a copy of the file
//! before reading it, so the payload survives the original moving away. The
//! media type is not validated here.

use std::path::{Path, PathBuf};
use tracing::info;
use transparent_core::capture::{CaptureError, CapturePayload, SourceHint};
use transparent_core::media;

use super::naming::staged_file_name;

/// A file copied into the staging directory.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub payload: CapturePayload,
    pub staged_path: PathBuf,
    pub original_name: String,
}

pub struct FileAdapter {
    staging_dir: PathBuf,
}

impl FileAdapter {
    pub fn new(staging_dir: PathBuf) -> Self {
        Self { staging_dir }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Copies `path` to `<staging>/<epoch-millis>_<name>` and loads the copy.
    pub async fn stage(&self, path: &Path) -> Result<StagedFile, CaptureError> {
        let original_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| CaptureError::io(path.display(), "path has no file name"))?;
        let media_type = media::media_type_for_path(path);

        tokio::fs::create_dir_all(&self.staging_dir)
            .await
            .map_err(|err| CaptureError::io(self.staging_dir.display(), err))?;

        let staged_path = self.staging_dir.join(staged_file_name(&original_name));
        tokio::fs::copy(path, &staged_path)
            .await
            .map_err(|err| CaptureError::io(path.display(), err))?;
        let bytes = tokio::fs::read(&staged_path)
            .await
            .map_err(|err| CaptureError::io(staged_path.display(), err))?;

        info!(
            path = %path.display(),
            staged = %staged_path.display(),
            media_type,
            size = bytes.len(),
            "File staged"
        );

        Ok(StagedFile {
            payload: CapturePayload::new(bytes, media_type, SourceHint::File),
            staged_path,
            original_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_stage_copies_with_timestamp_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("notes.md");
        std::fs::write(&source, "# Notes").unwrap();
        let adapter = FileAdapter::new(temp_dir.path().join("uploads"));

        let staged = adapter.stage(&source).await.unwrap();

        assert_eq!(staged.original_name, "notes.md");
        assert_eq!(staged.payload.media_type(), "text/md");
        assert_eq!(staged.payload.bytes(), b"# Notes");
        let staged_name = staged.staged_path.file_name().unwrap().to_string_lossy();
        assert!(staged_name.ends_with("_notes.md"));
    }

    #[tokio::test]
    async fn test_staged_copy_survives_original_removal() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("data.csv");
        std::fs::write(&source, "a,b").unwrap();
        let adapter = FileAdapter::new(temp_dir.path().join("uploads"));

        let staged = adapter.stage(&source).await.unwrap();
        std::fs::remove_file(&source).unwrap();

        assert_eq!(std::fs::read(&staged.staged_path).unwrap(), b"a,b");
    }

    #[tokio::test]
    async fn test_unknown_extension_is_forwarded_as_generic_binary() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("archive.zip");
        std::fs::write(&source, [0u8, 1, 2]).unwrap();
        let adapter = FileAdapter::new(temp_dir.path().join("uploads"));

        let staged = adapter.stage(&source).await.unwrap();

        assert_eq!(staged.payload.media_type(), media::GENERIC_BINARY);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_failure() {
        let temp_dir = TempDir::new().unwrap();
        let adapter = FileAdapter::new(temp_dir.path().join("uploads"));

        let err = adapter
            .stage(&temp_dir.path().join("missing.txt"))
            .await
            .unwrap_err();

        assert!(matches!(err, CaptureError::Io { .. }));
    }
}
