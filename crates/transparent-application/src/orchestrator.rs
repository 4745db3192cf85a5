//! Orchestrator - drives one request from capture to outcome.
//!
//! Every call to [`Orchestrator::handle`] produces exactly one [`Outcome`].
//! The first request of the process expands the overlay before anything is
//! dispatched. Independent requests may run concurrently; the orchestrator
//! does no admission control of its own.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Instrument, info, info_span, warn};
use transparent_core::capture::{CaptureError, CapturePayload, FilePicker};
use transparent_core::conversation::ConversationRepository;
use transparent_core::message::Message;
use transparent_core::outcome::Outcome;
use transparent_core::request::ModalityRequest;
use transparent_infrastructure::{AudioAdapter, FileAdapter, ScreenshotAdapter};
use transparent_interaction::BackendGateway;
use uuid::Uuid;

use crate::conversation_log::ConversationLog;
use crate::lifecycle::RequestLifecycle;
use crate::window::WindowStateMachine;

pub const SCREENSHOT_USER_MESSAGE: &str = "Take a screenshot of the current screen";

pub const SCREENSHOT_PROMPT: &str = "This is a screenshot of the user computer screen. The user wants to know about the content of the screen. Do not describe the elements, just do a research and resume the content.";

const NO_SCREEN_SOURCES: &str = "No screen sources found";
const MULTIPLE_SCREEN_SOURCES: &str = "Multiple screen sources found";
const SCREENSHOT_FAILED: &str = "Failed to capture screenshot";
const AUDIO_FAILED: &str = "Failed to process audio";
const FILE_FAILED: &str = "Failed to process file";

/// A request arriving from the control channel.
#[derive(Debug, Clone)]
pub enum OrchestratorRequest {
    GenerateText {
        history: Vec<Message>,
    },
    TranscribeAudio {
        payload: CapturePayload,
        prompt: Option<String>,
    },
    GenerateAudio {
        text: String,
    },
    GenerateImage {
        text: String,
    },
    ReadFile {
        payload: CapturePayload,
        prompt: Option<String>,
    },
    CaptureScreenshot,
    CaptureAudio {
        recording: Vec<u8>,
    },
    ProcessFile {
        path: PathBuf,
        prompt: Option<String>,
    },
}

impl OrchestratorRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            OrchestratorRequest::GenerateText { .. } => "generateText",
            OrchestratorRequest::TranscribeAudio { .. } => "transcribeAudio",
            OrchestratorRequest::GenerateAudio { .. } => "generateAudio",
            OrchestratorRequest::GenerateImage { .. } => "generateImage",
            OrchestratorRequest::ReadFile { .. } => "readFile",
            OrchestratorRequest::CaptureScreenshot => "captureScreenshot",
            OrchestratorRequest::CaptureAudio { .. } => "captureAudio",
            OrchestratorRequest::ProcessFile { .. } => "processFile",
        }
    }

    /// Raw modality calls leave the conversation log alone.
    fn touches_log(&self) -> bool {
        !matches!(
            self,
            OrchestratorRequest::TranscribeAudio { .. }
                | OrchestratorRequest::GenerateAudio { .. }
                | OrchestratorRequest::GenerateImage { .. }
                | OrchestratorRequest::ReadFile { .. }
        )
    }
}

/// The three capture adapters.
pub struct CaptureAdapters {
    pub screenshot: ScreenshotAdapter,
    pub audio: AudioAdapter,
    pub files: FileAdapter,
}

pub struct Orchestrator {
    gateway: Arc<BackendGateway>,
    window: Arc<WindowStateMachine>,
    captures: CaptureAdapters,
    picker: Arc<dyn FilePicker>,
    log: Arc<ConversationLog>,
    repository: Option<Arc<dyn ConversationRepository>>,
}

impl Orchestrator {
    pub fn new(
        gateway: Arc<BackendGateway>,
        window: Arc<WindowStateMachine>,
        captures: CaptureAdapters,
        picker: Arc<dyn FilePicker>,
        log: Arc<ConversationLog>,
    ) -> Self {
        Self {
            gateway,
            window,
            captures,
            picker,
            log,
            repository: None,
        }
    }

    /// Saves the conversation log after every request that touches it.
    pub fn with_repository(mut self, repository: Arc<dyn ConversationRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn gateway(&self) -> &BackendGateway {
        &self.gateway
    }

    pub fn window(&self) -> &WindowStateMachine {
        &self.window
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Runs `request` to its single outcome.
    pub async fn handle(&self, request: OrchestratorRequest) -> Outcome {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!(
            "request",
            request_id = %request_id,
            operation = request.operation()
        );

        async move {
            if self.window.expand_if_needed() {
                info!("First request, overlay expanded");
            }

            let touches_log = request.touches_log();
            let mut lifecycle = RequestLifecycle::new(request_id);
            let outcome = self.run(request, &mut lifecycle).await;
            let outcome = lifecycle.settle(outcome);

            if touches_log {
                self.save_conversation().await;
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Asks the host for a file. Cancelling neither expands the window nor
    /// produces an outcome.
    pub async fn pick_file(&self) -> Option<PathBuf> {
        let path = self.picker.pick_file().await;
        match &path {
            Some(path) => {
                info!(path = %path.display(), "File picked");
                self.window.expand_if_needed();
            }
            None => info!("File selection cancelled"),
        }
        path
    }

    /// `pick_file` followed by `processFile` on the chosen path.
    pub async fn pick_and_process_file(&self, prompt: Option<String>) -> Option<Outcome> {
        let path = self.pick_file().await?;
        Some(
            self.handle(OrchestratorRequest::ProcessFile { path, prompt })
                .await,
        )
    }

    async fn run(
        &self,
        request: OrchestratorRequest,
        lifecycle: &mut RequestLifecycle,
    ) -> Outcome {
        match request {
            OrchestratorRequest::GenerateText { history } => {
                self.log.sync_history(&history);
                let outcome = self
                    .dispatch(lifecycle, ModalityRequest::Text { history })
                    .await;
                self.log_reply(outcome)
            }
            OrchestratorRequest::TranscribeAudio { payload, prompt } => {
                self.dispatch(lifecycle, ModalityRequest::Transcription { payload, prompt })
                    .await
            }
            OrchestratorRequest::GenerateAudio { text } => {
                self.dispatch(lifecycle, ModalityRequest::SpeechSynthesis { text })
                    .await
            }
            OrchestratorRequest::GenerateImage { text } => {
                self.dispatch(lifecycle, ModalityRequest::ImageSynthesis { text })
                    .await
            }
            OrchestratorRequest::ReadFile { payload, prompt } => {
                self.dispatch(
                    lifecycle,
                    ModalityRequest::DocumentUnderstanding { payload, prompt },
                )
                .await
            }
            OrchestratorRequest::CaptureScreenshot => {
                self.log.append(Message::user(SCREENSHOT_USER_MESSAGE));
                let payload = match self.captures.screenshot.capture().await {
                    Ok(payload) => payload,
                    Err(err) => return self.log_reply(screenshot_failure(err)),
                };

                let outcome = self
                    .dispatch(
                        lifecycle,
                        ModalityRequest::DocumentUnderstanding {
                            payload,
                            prompt: Some(SCREENSHOT_PROMPT.to_string()),
                        },
                    )
                    .await;
                self.log_reply(outcome)
            }
            OrchestratorRequest::CaptureAudio { recording } => {
                let payload = match self.captures.audio.capture(recording).await {
                    Ok(payload) => payload,
                    Err(err) => return self.log_reply(capture_failure(err, AUDIO_FAILED)),
                };

                let outcome = self
                    .dispatch(
                        lifecycle,
                        ModalityRequest::Transcription {
                            payload,
                            prompt: None,
                        },
                    )
                    .await;
                // The transcription is what the user said.
                if outcome.is_success() && !outcome.text.trim().is_empty() {
                    self.log.append(Message::user(outcome.text.clone()));
                }
                outcome
            }
            OrchestratorRequest::ProcessFile { path, prompt } => {
                self.log
                    .append(Message::user(format!("File: {}", path.display())));
                let staged = match self.captures.files.stage(&path).await {
                    Ok(staged) => staged,
                    Err(err) => return self.log_reply(capture_failure(err, FILE_FAILED)),
                };

                let outcome = self
                    .dispatch(
                        lifecycle,
                        ModalityRequest::DocumentUnderstanding {
                            payload: staged.payload,
                            prompt,
                        },
                    )
                    .await;
                self.log_reply(outcome)
            }
        }
    }

    /// Logs the outcome text as the assistant reply and tags the outcome with
    /// the logged message id.
    fn log_reply(&self, outcome: Outcome) -> Outcome {
        let reply = Message::assistant(outcome.text.clone());
        let id = reply.id.clone();
        self.log.append(reply);
        outcome.with_message_id(Some(id))
    }

    async fn dispatch(&self, lifecycle: &mut RequestLifecycle, request: ModalityRequest) -> Outcome {
        lifecycle.dispatch(request.modality());
        self.gateway.execute(request).await
    }

    async fn save_conversation(&self) {
        let Some(repository) = &self.repository else {
            return;
        };
        let Some(conversation) = self.log.to_conversation() else {
            return;
        };

        if let Err(err) = repository.save(&conversation).await {
            warn!(conversation_id = %conversation.id, "Failed to save conversation: {}", err);
        }
    }
}

fn screenshot_failure(err: CaptureError) -> Outcome {
    let text = match &err {
        CaptureError::NoUniqueSource { found: 0 } => NO_SCREEN_SOURCES,
        CaptureError::NoUniqueSource { .. } => MULTIPLE_SCREEN_SOURCES,
        _ => SCREENSHOT_FAILED,
    };
    capture_failure(err, text)
}

fn capture_failure(err: CaptureError, text: &str) -> Outcome {
    warn!("Capture failed: {}", err);
    Outcome::failure(err.kind(), text)
}
