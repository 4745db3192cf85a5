//! Error types for the Transparent overlay.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for storage, configuration and wiring code.
///
/// Request-path failures never surface as this type; they are normalized into
/// an [`crate::outcome::Outcome`] carrying an [`ErrorKind`].
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum TransparentError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },
}

impl TransparentError {
    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

impl From<std::io::Error> for TransparentError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TransparentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TransparentError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for TransparentError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, TransparentError>`.
pub type Result<T> = std::result::Result<T, TransparentError>;

/// Failure taxonomy reported on every [`crate::outcome::Outcome`].
///
/// The UI only inspects this for logging; the outcome text is always
/// renderable as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Zero or several screen sources were available.
    NoUniqueSource,
    /// A file or the filesystem could not be read or written.
    #[serde(rename = "IOFailure")]
    IoFailure,
    /// The media type is outside the document allow-list.
    UnsupportedMediaType,
    /// The generative backend call failed.
    BackendFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NoUniqueSource => "NoUniqueSource",
            ErrorKind::IoFailure => "IOFailure",
            ErrorKind::UnsupportedMediaType => "UnsupportedMediaType",
            ErrorKind::BackendFailure => "BackendFailure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
