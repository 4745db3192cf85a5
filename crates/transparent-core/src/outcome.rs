//! The unified result shape returned to the UI for every request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::encoding::base64_bytes;
use crate::error::ErrorKind;

/// Result of exactly one request.
///
/// On failure `text` holds a user-safe message and `error_kind` is set; the
/// two are never contradictory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Grounding and URL-context metadata, passed through uninterpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
    /// Id of the assistant message logged for this outcome, so the UI can
    /// echo it back in later history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl Outcome {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            artifact: None,
            error_kind: None,
            metadata: None,
            message_id: None,
        }
    }

    pub fn failure(kind: ErrorKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            artifact: None,
            error_kind: Some(kind),
            metadata: None,
            message_id: None,
        }
    }

    pub fn with_artifact(mut self, artifact: Option<Artifact>) -> Self {
        self.artifact = artifact;
        self
    }

    pub fn with_metadata(mut self, metadata: Option<ResponseMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_message_id(mut self, message_id: Option<String>) -> Self {
        self.message_id = message_id;
        self
    }

    pub fn is_success(&self) -> bool {
        self.error_kind.is_none()
    }
}

/// Binary output of a speech or image synthesis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub media_type: String,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

/// Opaque citation metadata from a text generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_context_metadata: Option<Value>,
}

impl ResponseMetadata {
    /// Returns `None` when neither kind of metadata is present.
    pub fn from_parts(grounding: Option<Value>, url_context: Option<Value>) -> Option<Self> {
        if grounding.is_none() && url_context.is_none() {
            return None;
        }
        Some(Self {
            grounding_metadata: grounding,
            url_context_metadata: url_context,
        })
    }
}
