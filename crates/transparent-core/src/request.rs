//! The closed set of backend requests, one variant per modality.

use serde::{Deserialize, Serialize};

use crate::capture::CapturePayload;
use crate::message::Message;

/// One request to the generative backend.
///
/// The orchestrator builds exactly one of these per dispatched request, from a
/// capture payload or from direct text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalityRequest {
    /// Chat completion over an ordered history.
    Text { history: Vec<Message> },
    /// Speech to text.
    Transcription {
        payload: CapturePayload,
        prompt: Option<String>,
    },
    /// Text to speech.
    SpeechSynthesis { text: String },
    /// Text to image.
    ImageSynthesis { text: String },
    /// Question answering over a document or image.
    DocumentUnderstanding {
        payload: CapturePayload,
        prompt: Option<String>,
    },
}

impl ModalityRequest {
    pub fn modality(&self) -> Modality {
        match self {
            ModalityRequest::Text { .. } => Modality::Text,
            ModalityRequest::Transcription { .. } => Modality::Transcription,
            ModalityRequest::SpeechSynthesis { .. } => Modality::SpeechSynthesis,
            ModalityRequest::ImageSynthesis { .. } => Modality::ImageSynthesis,
            ModalityRequest::DocumentUnderstanding { .. } => Modality::DocumentUnderstanding,
        }
    }
}

/// Variant tag of a [`ModalityRequest`], used for logging and fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Modality {
    Text,
    Transcription,
    SpeechSynthesis,
    ImageSynthesis,
    DocumentUnderstanding,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Transcription => "transcription",
            Modality::SpeechSynthesis => "speech_synthesis",
            Modality::ImageSynthesis => "image_synthesis",
            Modality::DocumentUnderstanding => "document_understanding",
        }
    }

    /// The literal apology returned when the backend call for this modality fails.
    pub fn apology(&self) -> &'static str {
        match self {
            Modality::Text => {
                "I'm sorry, I'm having trouble generating a response. Please try again."
            }
            Modality::Transcription => {
                "I'm sorry, I'm having trouble transcribing the audio. Please try again."
            }
            Modality::SpeechSynthesis => {
                "I'm sorry, I'm having trouble generating the audio. Please try again."
            }
            Modality::ImageSynthesis => {
                "I'm sorry, I'm having trouble generating the image. Please try again."
            }
            Modality::DocumentUnderstanding => {
                "I'm sorry, I'm having trouble reading the file. Please try again."
            }
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
