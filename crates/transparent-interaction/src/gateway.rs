//! BackendGateway - the single caller of the generative backend.
//!
//! One [`ModalityRequest`] becomes at most one [`BackendCall`] and always
//! exactly one [`Outcome`]. Backend failures are normalized here into a
//! `BackendFailure` outcome carrying the modality's apology.
//!
//! Credential and system instruction can be swapped at runtime. Each request
//! takes an immutable [`GatewaySettings`] snapshot when it is dispatched, so a
//! swap only affects requests dispatched afterwards.

use std::sync::{Arc, RwLock};
use tracing::{info, warn};
use transparent_core::backend::{
    BackendCall, BackendContent, BackendError, BackendPart, BackendReply, BackendRole,
    GenerativeBackend, InlineData, ResponseModality, SpeechOptions,
};
use transparent_core::capture::CapturePayload;
use transparent_core::config::GatewayConfig;
use transparent_core::encoding::{decode_base64, encode_base64};
use transparent_core::error::ErrorKind;
use transparent_core::media;
use transparent_core::message::{Message, MessageRole};
use transparent_core::outcome::{Artifact, Outcome, ResponseMetadata};
use transparent_core::request::ModalityRequest;

pub const DEFAULT_TRANSCRIPTION_PROMPT: &str = "Transcribe this audio";
pub const DEFAULT_DOCUMENT_PROMPT: &str = "Analyze this file and provide a summary of its content.";

/// Immutable gateway configuration captured at dispatch time.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    pub api_key: Option<String>,
    pub system_instruction: String,
    pub text_model: String,
    pub transcription_model: String,
    pub speech_model: String,
    pub image_model: String,
    pub document_model: String,
    pub language_code: String,
    pub voice_name: String,
    pub enable_search_tools: bool,
}

impl GatewaySettings {
    pub fn from_config(config: &GatewayConfig, api_key: Option<String>) -> Self {
        Self {
            api_key,
            system_instruction: config.system_instruction.clone(),
            text_model: config.text_model.clone(),
            transcription_model: config.transcription_model.clone(),
            speech_model: config.speech_model.clone(),
            image_model: config.image_model.clone(),
            document_model: config.document_model.clone(),
            language_code: config.language_code.clone(),
            voice_name: config.voice_name.clone(),
            enable_search_tools: config.enable_search_tools,
        }
    }

    fn call(&self, model: &str, contents: Vec<BackendContent>) -> Result<BackendCall, BackendError> {
        let api_key = self
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(BackendError::MissingCredential)?;

        Ok(BackendCall {
            model: model.to_string(),
            api_key,
            system_instruction: None,
            contents,
            response_mime_type: None,
            response_modalities: Vec::new(),
            speech: None,
            search_tools: false,
        })
    }
}

impl std::fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("system_instruction", &self.system_instruction)
            .field("text_model", &self.text_model)
            .field("transcription_model", &self.transcription_model)
            .field("speech_model", &self.speech_model)
            .field("image_model", &self.image_model)
            .field("document_model", &self.document_model)
            .field("language_code", &self.language_code)
            .field("voice_name", &self.voice_name)
            .field("enable_search_tools", &self.enable_search_tools)
            .finish()
    }
}

pub struct BackendGateway {
    backend: Arc<dyn GenerativeBackend>,
    settings: RwLock<Arc<GatewaySettings>>,
}

impl BackendGateway {
    pub fn new(backend: Arc<dyn GenerativeBackend>, settings: GatewaySettings) -> Self {
        Self {
            backend,
            settings: RwLock::new(Arc::new(settings)),
        }
    }

    /// The settings a request dispatched now would use.
    pub fn snapshot(&self) -> Arc<GatewaySettings> {
        let guard = self
            .settings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub fn has_api_key(&self) -> bool {
        self.snapshot()
            .api_key
            .as_ref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// Replaces the credential for subsequently dispatched requests.
    pub fn set_api_key(&self, api_key: impl Into<String>) {
        let api_key = api_key.into();
        self.update(|settings| settings.api_key = Some(api_key));
        info!("Gateway credential updated");
    }

    /// Drops the credential; later requests settle as backend failures.
    pub fn clear_api_key(&self) {
        self.update(|settings| settings.api_key = None);
        info!("Gateway credential cleared");
    }

    /// Replaces the system instruction for subsequently dispatched requests.
    pub fn set_system_instruction(&self, instruction: impl Into<String>) {
        let instruction = instruction.into();
        self.update(|settings| settings.system_instruction = instruction);
        info!("Gateway system instruction updated");
    }

    fn update(&self, f: impl FnOnce(&mut GatewaySettings)) {
        let mut guard = self
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut next = GatewaySettings::clone(&guard);
        f(&mut next);
        *guard = Arc::new(next);
    }

    /// Runs one request to completion. Never fails: every error becomes a
    /// failure [`Outcome`].
    pub async fn execute(&self, request: ModalityRequest) -> Outcome {
        let settings = self.snapshot();
        let modality = request.modality();

        if let ModalityRequest::DocumentUnderstanding { payload, .. } = &request
            && !media::is_supported_document(payload.media_type())
        {
            info!(
                media_type = payload.media_type(),
                "Rejected unsupported document type"
            );
            return Outcome::failure(
                ErrorKind::UnsupportedMediaType,
                media::unsupported_media_type_message(payload.media_type()),
            );
        }

        let result = match request {
            ModalityRequest::Text { history } => self.text(&settings, &history).await,
            ModalityRequest::Transcription { payload, prompt } => {
                self.transcription(&settings, &payload, prompt).await
            }
            ModalityRequest::SpeechSynthesis { text } => self.speech(&settings, text).await,
            ModalityRequest::ImageSynthesis { text } => self.image(&settings, text).await,
            ModalityRequest::DocumentUnderstanding { payload, prompt } => {
                self.document(&settings, &payload, prompt).await
            }
        };

        result.unwrap_or_else(|err| {
            warn!(modality = %modality, "Backend call failed: {}", err);
            Outcome::failure(ErrorKind::BackendFailure, modality.apology())
        })
    }

    async fn text(
        &self,
        settings: &GatewaySettings,
        history: &[Message],
    ) -> Result<Outcome, BackendError> {
        let contents = history
            .iter()
            .map(|message| BackendContent {
                role: Some(match message.role {
                    MessageRole::User => BackendRole::User,
                    MessageRole::Assistant => BackendRole::Model,
                }),
                parts: vec![BackendPart::Text(message.content.clone())],
            })
            .collect();

        let mut call = settings.call(&settings.text_model, contents)?;
        call.system_instruction = Some(settings.system_instruction.clone());
        call.response_mime_type = Some("text/plain".to_string());
        call.search_tools = settings.enable_search_tools;

        let reply = self.send(call).await?;
        let text = reply.text().ok_or(BackendError::Empty)?;
        let metadata =
            ResponseMetadata::from_parts(reply.grounding_metadata, reply.url_context_metadata);

        Ok(Outcome::success(text).with_metadata(metadata))
    }

    async fn transcription(
        &self,
        settings: &GatewaySettings,
        payload: &CapturePayload,
        prompt: Option<String>,
    ) -> Result<Outcome, BackendError> {
        let prompt = prompt.unwrap_or_else(|| DEFAULT_TRANSCRIPTION_PROMPT.to_string());
        let contents = vec![user_content(vec![
            BackendPart::Text(prompt),
            inline_part(payload),
        ])];

        let call = settings.call(&settings.transcription_model, contents)?;
        let reply = self.send(call).await?;
        let text = reply.text().ok_or(BackendError::Empty)?;

        Ok(Outcome::success(text))
    }

    async fn speech(&self, settings: &GatewaySettings, text: String) -> Result<Outcome, BackendError> {
        let mut call = settings.call(
            &settings.speech_model,
            vec![user_content(vec![BackendPart::Text(text)])],
        )?;
        call.response_modalities = vec![ResponseModality::Audio];
        call.speech = Some(SpeechOptions {
            language_code: settings.language_code.clone(),
            voice_name: settings.voice_name.clone(),
        });

        let reply = self.send(call).await?;
        synthesis_outcome(&reply)
    }

    async fn image(&self, settings: &GatewaySettings, text: String) -> Result<Outcome, BackendError> {
        let mut call = settings.call(
            &settings.image_model,
            vec![user_content(vec![BackendPart::Text(text)])],
        )?;
        call.response_modalities = vec![ResponseModality::Text, ResponseModality::Image];

        let reply = self.send(call).await?;
        synthesis_outcome(&reply)
    }

    async fn document(
        &self,
        settings: &GatewaySettings,
        payload: &CapturePayload,
        prompt: Option<String>,
    ) -> Result<Outcome, BackendError> {
        let prompt = prompt.unwrap_or_else(|| DEFAULT_DOCUMENT_PROMPT.to_string());
        let contents = vec![user_content(vec![
            inline_part(payload),
            BackendPart::Text(prompt),
        ])];

        let call = settings.call(&settings.document_model, contents)?;
        let reply = self.send(call).await?;
        let text = reply.text().ok_or(BackendError::Empty)?;

        Ok(Outcome::success(text))
    }

    async fn send(&self, call: BackendCall) -> Result<BackendReply, BackendError> {
        info!(model = %call.model, "Dispatching backend call");
        self.backend.generate(call).await
    }
}

fn user_content(parts: Vec<BackendPart>) -> BackendContent {
    BackendContent {
        role: Some(BackendRole::User),
        parts,
    }
}

fn inline_part(payload: &CapturePayload) -> BackendPart {
    BackendPart::InlineData(InlineData {
        mime_type: payload.media_type().to_string(),
        data: encode_base64(payload.bytes()),
    })
}

/// Speech and image replies may legitimately carry neither text nor data.
fn synthesis_outcome(reply: &BackendReply) -> Result<Outcome, BackendError> {
    let artifact = reply
        .first_inline_data()
        .map(|data| {
            decode_base64(&data.data)
                .map(|bytes| Artifact {
                    media_type: data.mime_type.clone(),
                    bytes,
                })
                .map_err(|err| BackendError::Decode(err.to_string()))
        })
        .transpose()?;

    Ok(Outcome::success(reply.text().unwrap_or_default()).with_artifact(artifact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;
    use transparent_core::backend::ReplyPart;
    use transparent_core::capture::SourceHint;

    enum Behavior {
        Reply(BackendReply),
        Fail,
    }

    struct RecordingBackend {
        behavior: Behavior,
        calls: Mutex<Vec<BackendCall>>,
    }

    impl RecordingBackend {
        fn replying(reply: BackendReply) -> Arc<Self> {
            Arc::new(Self {
                behavior: Behavior::Reply(reply),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                behavior: Behavior::Fail,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<BackendCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerativeBackend for RecordingBackend {
        async fn generate(&self, call: BackendCall) -> Result<BackendReply, BackendError> {
            self.calls.lock().unwrap().push(call);
            match &self.behavior {
                Behavior::Reply(reply) => Ok(reply.clone()),
                Behavior::Fail => Err(BackendError::Transport("connection reset".into())),
            }
        }
    }

    fn text_reply(text: &str) -> BackendReply {
        BackendReply {
            parts: vec![ReplyPart::Text(text.into())],
            ..Default::default()
        }
    }

    fn settings() -> GatewaySettings {
        GatewaySettings::from_config(&GatewayConfig::default(), Some("key-1".into()))
    }

    fn payload(media_type: &str) -> CapturePayload {
        CapturePayload::new(b"data".to_vec(), media_type, SourceHint::File)
    }

    #[tokio::test]
    async fn test_text_maps_roles_and_keeps_metadata() {
        let mut reply = text_reply("hi");
        reply.grounding_metadata = Some(serde_json::json!({ "sources": 1 }));
        let backend = RecordingBackend::replying(reply);
        let gateway = BackendGateway::new(backend.clone(), settings());

        let outcome = gateway
            .execute(ModalityRequest::Text {
                history: vec![Message::user("hello"), Message::assistant("hey"), Message::user("again")],
            })
            .await;

        assert_eq!(outcome.text, "hi");
        assert!(outcome.is_success());
        assert!(outcome.metadata.unwrap().grounding_metadata.is_some());

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        let roles: Vec<_> = calls[0].contents.iter().map(|c| c.role).collect();
        assert_eq!(
            roles,
            vec![Some(BackendRole::User), Some(BackendRole::Model), Some(BackendRole::User)]
        );
        assert_eq!(calls[0].system_instruction.as_deref(), Some("You are a helpful assistant."));
        assert!(calls[0].search_tools);
    }

    #[tokio::test]
    async fn test_unsupported_document_never_calls_backend() {
        let backend = RecordingBackend::replying(text_reply("unused"));
        let gateway = BackendGateway::new(backend.clone(), settings());

        let outcome = gateway
            .execute(ModalityRequest::DocumentUnderstanding {
                payload: payload("application/zip"),
                prompt: None,
            })
            .await;

        assert_eq!(outcome.error_kind, Some(ErrorKind::UnsupportedMediaType));
        assert!(outcome.text.starts_with("Unsupported file type: application/zip."));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_document_sends_file_before_default_prompt() {
        let backend = RecordingBackend::replying(text_reply("summary"));
        let gateway = BackendGateway::new(backend.clone(), settings());

        let outcome = gateway
            .execute(ModalityRequest::DocumentUnderstanding {
                payload: payload("text/x-python"),
                prompt: None,
            })
            .await;

        assert_eq!(outcome.text, "summary");
        let parts = &backend.calls()[0].contents[0].parts;
        assert!(matches!(&parts[0], BackendPart::InlineData(data) if data.mime_type == "text/x-python"));
        assert_eq!(parts[1], BackendPart::Text(DEFAULT_DOCUMENT_PROMPT.into()));
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_apology() {
        let backend = RecordingBackend::failing();
        let gateway = BackendGateway::new(backend.clone(), settings());

        let outcome = gateway
            .execute(ModalityRequest::Transcription {
                payload: payload("audio/webm"),
                prompt: None,
            })
            .await;

        assert_eq!(outcome.error_kind, Some(ErrorKind::BackendFailure));
        assert_eq!(
            outcome.text,
            "I'm sorry, I'm having trouble transcribing the audio. Please try again."
        );
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_text_reply_without_text_is_failure() {
        let gateway = BackendGateway::new(RecordingBackend::replying(BackendReply::default()), settings());

        let outcome = gateway
            .execute(ModalityRequest::Text {
                history: vec![Message::user("hello")],
            })
            .await;

        assert_eq!(outcome.error_kind, Some(ErrorKind::BackendFailure));
    }

    #[tokio::test]
    async fn test_image_without_artifact_is_success() {
        let gateway = BackendGateway::new(RecordingBackend::replying(BackendReply::default()), settings());

        let outcome = gateway
            .execute(ModalityRequest::ImageSynthesis { text: "a cat".into() })
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.text, "");
        assert!(outcome.artifact.is_none());
    }

    #[tokio::test]
    async fn test_speech_artifact_is_decoded() {
        let backend = RecordingBackend::replying(BackendReply {
            parts: vec![ReplyPart::InlineData(InlineData {
                mime_type: "audio/L16;rate=24000".into(),
                data: encode_base64(&[1, 2, 3]),
            })],
            ..Default::default()
        });
        let gateway = BackendGateway::new(backend.clone(), settings());

        let outcome = gateway
            .execute(ModalityRequest::SpeechSynthesis { text: "hello".into() })
            .await;

        let artifact = outcome.artifact.unwrap();
        assert_eq!(artifact.bytes, vec![1, 2, 3]);
        assert_eq!(artifact.media_type, "audio/L16;rate=24000");

        let call = &backend.calls()[0];
        assert_eq!(call.response_modalities, vec![ResponseModality::Audio]);
        assert_eq!(call.speech.as_ref().unwrap().voice_name, "Kore");
    }

    #[tokio::test]
    async fn test_missing_credential_is_backend_failure_without_call() {
        let backend = RecordingBackend::replying(text_reply("unused"));
        let gateway = BackendGateway::new(
            backend.clone(),
            GatewaySettings::from_config(&GatewayConfig::default(), None),
        );

        let outcome = gateway
            .execute(ModalityRequest::ImageSynthesis { text: "x".into() })
            .await;

        assert_eq!(outcome.error_kind, Some(ErrorKind::BackendFailure));
        assert!(backend.calls().is_empty());
        assert!(!gateway.has_api_key());
    }

    #[tokio::test]
    async fn test_reconfiguration_applies_to_next_call() {
        let backend = RecordingBackend::replying(text_reply("ok"));
        let gateway = BackendGateway::new(backend.clone(), settings());

        gateway.set_api_key("key-2");
        gateway.set_system_instruction("Answer in French.");
        gateway
            .execute(ModalityRequest::Text {
                history: vec![Message::user("hello")],
            })
            .await;

        let call = &backend.calls()[0];
        assert_eq!(call.api_key, "key-2");
        assert_eq!(call.system_instruction.as_deref(), Some("Answer in French."));
    }

    #[tokio::test]
    async fn test_cleared_key_stops_dispatch() {
        let backend = RecordingBackend::replying(text_reply("ok"));
        let gateway = BackendGateway::new(backend.clone(), settings());

        gateway.clear_api_key();
        let outcome = gateway
            .execute(ModalityRequest::ImageSynthesis { text: "x".into() })
            .await;

        assert_eq!(outcome.error_kind, Some(ErrorKind::BackendFailure));
        assert!(backend.calls().is_empty());
        assert!(!gateway.has_api_key());
    }

    struct GatedBackend {
        entered: Notify,
        release: Notify,
        released: AtomicBool,
        keys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GenerativeBackend for GatedBackend {
        async fn generate(&self, call: BackendCall) -> Result<BackendReply, BackendError> {
            self.keys.lock().unwrap().push(call.api_key.clone());
            self.entered.notify_one();
            if !self.released.load(Ordering::SeqCst) {
                self.release.notified().await;
            }
            Ok(text_reply(&call.api_key))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_in_flight_call_keeps_its_snapshot() {
        let backend = Arc::new(GatedBackend {
            entered: Notify::new(),
            release: Notify::new(),
            released: AtomicBool::new(false),
            keys: Mutex::new(Vec::new()),
        });
        let gateway = Arc::new(BackendGateway::new(backend.clone(), settings()));

        let in_flight = tokio::spawn({
            let gateway = Arc::clone(&gateway);
            async move {
                gateway
                    .execute(ModalityRequest::Text {
                        history: vec![Message::user("hello")],
                    })
                    .await
            }
        });

        backend.entered.notified().await;
        gateway.set_api_key("key-2");
        backend.released.store(true, Ordering::SeqCst);
        backend.release.notify_one();

        let outcome = in_flight.await.unwrap();
        assert_eq!(outcome.text, "key-1");
        assert_eq!(gateway.snapshot().api_key.as_deref(), Some("key-2"));
    }
}
