use transparent_application::OrchestratorRequest;
use transparent_core::outcome::Outcome;

use crate::app::AppState;
use crate::commands::ai::decode_attachment;

/// Captures the screen and asks the backend about it.
pub async fn capture_screenshot(state: &AppState) -> Outcome {
    state
        .orchestrator
        .handle(OrchestratorRequest::CaptureScreenshot)
        .await
}

/// Persists a finished recording and transcribes it into the conversation.
pub async fn capture_audio(state: &AppState, audio: &str) -> Outcome {
    let recording = match decode_attachment(audio) {
        Ok(bytes) => bytes,
        Err(outcome) => return outcome,
    };

    state
        .orchestrator
        .handle(OrchestratorRequest::CaptureAudio { recording })
        .await
}
