//! Narrow interface to the external generative backend.
//!
//! The backend gateway builds one [`BackendCall`] per request and issues it
//! through a [`GenerativeBackend`]. Calls carry everything they need,
//! including the credential, so a call never reads shared configuration after
//! it has been built.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Conversation role understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendRole {
    User,
    Model,
}

/// Inline binary data in the backend's native form (base64 text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendPart {
    Text(String),
    InlineData(InlineData),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendContent {
    /// `None` lets the backend apply its default (user) role.
    pub role: Option<BackendRole>,
    pub parts: Vec<BackendPart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseModality {
    Text,
    Image,
    Audio,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechOptions {
    pub language_code: String,
    pub voice_name: String,
}

/// A fully specified backend call.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendCall {
    pub model: String,
    pub api_key: String,
    pub system_instruction: Option<String>,
    pub contents: Vec<BackendContent>,
    pub response_mime_type: Option<String>,
    pub response_modalities: Vec<ResponseModality>,
    pub speech: Option<SpeechOptions>,
    /// Enables the web search and URL context tools.
    pub search_tools: bool,
}

impl std::fmt::Debug for BackendCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendCall")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("system_instruction", &self.system_instruction)
            .field("contents", &self.contents.len())
            .field("response_mime_type", &self.response_mime_type)
            .field("response_modalities", &self.response_modalities)
            .field("speech", &self.speech)
            .field("search_tools", &self.search_tools)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyPart {
    Text(String),
    InlineData(InlineData),
}

/// The first candidate of a backend response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendReply {
    pub parts: Vec<ReplyPart>,
    pub grounding_metadata: Option<Value>,
    pub url_context_metadata: Option<Value>,
}

impl BackendReply {
    /// Concatenated text parts, or `None` when the reply holds no text.
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .parts
            .iter()
            .filter_map(|part| match part {
                ReplyPart::Text(text) => Some(text.as_str()),
                ReplyPart::InlineData(_) => None,
            })
            .collect();

        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.parts.iter().find_map(|part| match part {
            ReplyPart::InlineData(data) => Some(data),
            ReplyPart::Text(_) => None,
        })
    }
}

/// Errors raised by a backend client.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no API credential configured")]
    MissingCredential,

    #[error("backend request failed: {0}")]
    Transport(String),

    #[error("backend returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("failed to decode backend response: {0}")]
    Decode(String),

    #[error("backend returned no usable content")]
    Empty,
}

/// The generative backend.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Issues exactly one call. Implementations must not retry.
    async fn generate(&self, call: BackendCall) -> Result<BackendReply, BackendError>;
}
