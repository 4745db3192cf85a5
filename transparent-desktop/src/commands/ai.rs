//! Direct modality commands.
//!
//! Binary arguments arrive base64 encoded; an undecodable argument settles the
//! request with an `IOFailure` outcome before anything is dispatched.

use transparent_application::OrchestratorRequest;
use transparent_core::capture::{CapturePayload, SourceHint};
use transparent_core::encoding::decode_base64;
use transparent_core::error::ErrorKind;
use transparent_core::media;
use transparent_core::message::Message;
use transparent_core::outcome::Outcome;

use crate::app::AppState;

pub const DECODE_FAILURE: &str = "Failed to decode the attached data";

pub(crate) fn decode_attachment(data: &str) -> Result<Vec<u8>, Outcome> {
    decode_base64(data.trim()).map_err(|e| {
        tracing::warn!("Rejected attachment: {}", e);
        Outcome::failure(ErrorKind::IoFailure, DECODE_FAILURE)
    })
}

/// Chat completion over the UI's history.
pub async fn generate_text(state: &AppState, history: Vec<Message>) -> Outcome {
    state
        .orchestrator
        .handle(OrchestratorRequest::GenerateText { history })
        .await
}

/// Transcribes a finished recording without touching the conversation log.
pub async fn transcribe_audio(state: &AppState, audio: &str, prompt: Option<String>) -> Outcome {
    let bytes = match decode_attachment(audio) {
        Ok(bytes) => bytes,
        Err(outcome) => return outcome,
    };

    let payload = CapturePayload::new(bytes, media::WEBM_AUDIO, SourceHint::Microphone);
    state
        .orchestrator
        .handle(OrchestratorRequest::TranscribeAudio { payload, prompt })
        .await
}

pub async fn generate_audio(state: &AppState, text: String) -> Outcome {
    state
        .orchestrator
        .handle(OrchestratorRequest::GenerateAudio { text })
        .await
}

pub async fn generate_image(state: &AppState, text: String) -> Outcome {
    state
        .orchestrator
        .handle(OrchestratorRequest::GenerateImage { text })
        .await
}

/// Document understanding over bytes the UI already holds.
pub async fn read_file(
    state: &AppState,
    data: &str,
    media_type: String,
    prompt: Option<String>,
) -> Outcome {
    let bytes = match decode_attachment(data) {
        Ok(bytes) => bytes,
        Err(outcome) => return outcome,
    };

    let payload = CapturePayload::new(bytes, media_type, SourceHint::File);
    state
        .orchestrator
        .handle(OrchestratorRequest::ReadFile { payload, prompt })
        .await
}
