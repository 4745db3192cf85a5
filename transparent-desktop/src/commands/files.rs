use std::path::PathBuf;

use transparent_application::OrchestratorRequest;
use transparent_core::outcome::Outcome;

use crate::app::AppState;

/// Returns the chosen path, or `None` when the user cancelled.
pub async fn pick_file(state: &AppState) -> Option<String> {
    state
        .orchestrator
        .pick_file()
        .await
        .map(|path| path.to_string_lossy().to_string())
}

/// Stages the file at `path` and asks the backend about it.
pub async fn process_file(state: &AppState, path: String, prompt: Option<String>) -> Outcome {
    state
        .orchestrator
        .handle(OrchestratorRequest::ProcessFile {
            path: PathBuf::from(path),
            prompt,
        })
        .await
}

/// `None` when the pick was cancelled.
pub async fn pick_and_process_file(state: &AppState, prompt: Option<String>) -> Option<Outcome> {
    state.orchestrator.pick_and_process_file(prompt).await
}
