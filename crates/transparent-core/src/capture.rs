//! Capture payloads and the external capture sources.
//!
//! A [`CapturePayload`] is produced by one of the capture adapters and handed
//! to the orchestrator, which owns it for the duration of a single request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorKind;

/// Where a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceHint {
    Screen,
    Microphone,
    File,
}

/// Raw bytes plus their declared media type. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturePayload {
    bytes: Vec<u8>,
    media_type: String,
    source_hint: SourceHint,
}

impl CapturePayload {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>, source_hint: SourceHint) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
            source_hint,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn source_hint(&self) -> SourceHint {
        self.source_hint
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Errors raised inside the capture subsystem.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Zero or several screen sources were enumerated.
    #[error("expected exactly one screen source, found {found}")]
    NoUniqueSource { found: usize },

    /// A file could not be read, copied or written.
    #[error("I/O failure on '{path}': {message}")]
    Io { path: String, message: String },

    /// A captured frame could not be encoded as an image.
    #[error("failed to encode captured frame: {0}")]
    Encoding(String),

    /// The display surface itself failed.
    #[error("capture source failed: {0}")]
    Source(String),
}

impl CaptureError {
    pub fn io(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    /// Maps the capture failure onto the outcome taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CaptureError::NoUniqueSource { .. } => ErrorKind::NoUniqueSource,
            CaptureError::Io { .. } | CaptureError::Encoding(_) | CaptureError::Source(_) => {
                ErrorKind::IoFailure
            }
        }
    }
}

/// A display that can be captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSourceInfo {
    pub id: String,
    pub name: String,
}

/// A frame returned by a [`ScreenSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedFrame {
    /// Raw RGBA8 pixels, row-major.
    Rgba {
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    },
    /// An already encoded PNG image.
    Png(Vec<u8>),
}

/// Display surface enumeration and capture, provided by the host.
#[async_trait]
pub trait ScreenSource: Send + Sync {
    /// Lists the screens currently available for capture.
    async fn list_sources(&self) -> Result<Vec<ScreenSourceInfo>, CaptureError>;

    /// Captures one frame of `source`.
    async fn capture(&self, source: &ScreenSourceInfo) -> Result<CapturedFrame, CaptureError>;
}

/// Native file selection, provided by the host.
#[async_trait]
pub trait FilePicker: Send + Sync {
    /// Returns the chosen path, or `None` when the user cancelled.
    async fn pick_file(&self) -> Option<PathBuf>;
}
