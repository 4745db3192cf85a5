//! The control channel: named operations in, typed responses out.
//!
//! Requests are JSON objects `{"op": "<name>", "args": {...}}`; responses are
//! `{"type": "<Variant>", "data": ...}`. Domain failures always travel as
//! [`ControlResponse::Outcome`]; [`ControlResponse::Error`] is reserved for
//! lines that are not a valid request at all.
//!
//! A request may carry an `id` of any JSON type. It is copied verbatim onto
//! its response, which is how the UI pairs them: requests run concurrently
//! and settle in any order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use transparent_core::config::{ShortcutConfig, Theme};
use transparent_core::conversation::Conversation;
use transparent_core::error::ErrorKind;
use transparent_core::message::Message;
use transparent_core::outcome::Outcome;
use transparent_core::window::WindowSnapshot;

use crate::app::AppState;
use crate::commands::{self, SettingsView};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "op",
    content = "args",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ControlRequest {
    GenerateText {
        history: Vec<Message>,
    },
    TranscribeAudio {
        /// Base64 audio/webm.
        audio: String,
        #[serde(default)]
        prompt: Option<String>,
    },
    GenerateAudio {
        text: String,
    },
    GenerateImage {
        text: String,
    },
    ReadFile {
        /// Base64 file contents.
        data: String,
        media_type: String,
        #[serde(default)]
        prompt: Option<String>,
    },
    CaptureScreenshot,
    CaptureAudio {
        /// Base64 audio/webm.
        audio: String,
    },
    PickFile,
    ProcessFile {
        path: String,
        #[serde(default)]
        prompt: Option<String>,
    },
    PickAndProcessFile {
        #[serde(default)]
        prompt: Option<String>,
    },
    ToggleWindow,
    ShowWindow,
    HideWindow,
    GetWindowState,
    SetContentProtection {
        enabled: bool,
    },
    NewConversation,
    ListConversations,
    GetConversation {
        id: String,
    },
    DeleteConversation {
        id: String,
    },
    ClearConversations,
    SetApiKey {
        api_key: String,
    },
    ClearApiKey,
    SetSystemInstruction {
        instruction: String,
    },
    SaveSettings {
        #[serde(default)]
        theme: Option<Theme>,
        #[serde(default)]
        shortcuts: Option<ShortcutConfig>,
    },
    GetSettings,
}

impl ControlRequest {
    pub fn op_name(&self) -> &'static str {
        match self {
            ControlRequest::GenerateText { .. } => "generateText",
            ControlRequest::TranscribeAudio { .. } => "transcribeAudio",
            ControlRequest::GenerateAudio { .. } => "generateAudio",
            ControlRequest::GenerateImage { .. } => "generateImage",
            ControlRequest::ReadFile { .. } => "readFile",
            ControlRequest::CaptureScreenshot => "captureScreenshot",
            ControlRequest::CaptureAudio { .. } => "captureAudio",
            ControlRequest::PickFile => "pickFile",
            ControlRequest::ProcessFile { .. } => "processFile",
            ControlRequest::PickAndProcessFile { .. } => "pickAndProcessFile",
            ControlRequest::ToggleWindow => "toggleWindow",
            ControlRequest::ShowWindow => "showWindow",
            ControlRequest::HideWindow => "hideWindow",
            ControlRequest::GetWindowState => "getWindowState",
            ControlRequest::SetContentProtection { .. } => "setContentProtection",
            ControlRequest::NewConversation => "newConversation",
            ControlRequest::ListConversations => "listConversations",
            ControlRequest::GetConversation { .. } => "getConversation",
            ControlRequest::DeleteConversation { .. } => "deleteConversation",
            ControlRequest::ClearConversations => "clearConversations",
            ControlRequest::SetApiKey { .. } => "setApiKey",
            ControlRequest::ClearApiKey => "clearApiKey",
            ControlRequest::SetSystemInstruction { .. } => "setSystemInstruction",
            ControlRequest::SaveSettings { .. } => "saveSettings",
            ControlRequest::GetSettings => "getSettings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ControlResponse {
    Outcome(Outcome),
    /// `None` when the user cancelled the pick.
    FilePath(Option<String>),
    Window(WindowSnapshot),
    Conversations(Vec<Conversation>),
    Conversation(Option<Conversation>),
    ConversationId(String),
    Settings(SettingsView),
    Ack,
    Error(String),
}

impl ControlResponse {
    fn storage_failure(message: String) -> Self {
        tracing::warn!("{}", message);
        ControlResponse::Outcome(Outcome::failure(ErrorKind::IoFailure, message))
    }
}

/// Executes one request against the shared state.
pub async fn dispatch(state: &AppState, request: ControlRequest) -> ControlResponse {
    tracing::debug!(op = request.op_name(), "Control request");

    match request {
        ControlRequest::GenerateText { history } => {
            ControlResponse::Outcome(commands::generate_text(state, history).await)
        }
        ControlRequest::TranscribeAudio { audio, prompt } => {
            ControlResponse::Outcome(commands::transcribe_audio(state, &audio, prompt).await)
        }
        ControlRequest::GenerateAudio { text } => {
            ControlResponse::Outcome(commands::generate_audio(state, text).await)
        }
        ControlRequest::GenerateImage { text } => {
            ControlResponse::Outcome(commands::generate_image(state, text).await)
        }
        ControlRequest::ReadFile {
            data,
            media_type,
            prompt,
        } => ControlResponse::Outcome(commands::read_file(state, &data, media_type, prompt).await),
        ControlRequest::CaptureScreenshot => {
            ControlResponse::Outcome(commands::capture_screenshot(state).await)
        }
        ControlRequest::CaptureAudio { audio } => {
            ControlResponse::Outcome(commands::capture_audio(state, &audio).await)
        }
        ControlRequest::PickFile => ControlResponse::FilePath(commands::pick_file(state).await),
        ControlRequest::ProcessFile { path, prompt } => {
            ControlResponse::Outcome(commands::process_file(state, path, prompt).await)
        }
        ControlRequest::PickAndProcessFile { prompt } => {
            match commands::pick_and_process_file(state, prompt).await {
                Some(outcome) => ControlResponse::Outcome(outcome),
                None => ControlResponse::FilePath(None),
            }
        }
        ControlRequest::ToggleWindow => ControlResponse::Window(commands::toggle_window(state)),
        ControlRequest::ShowWindow => ControlResponse::Window(commands::show_window(state)),
        ControlRequest::HideWindow => ControlResponse::Window(commands::hide_window(state)),
        ControlRequest::GetWindowState => {
            ControlResponse::Window(commands::get_window_state(state))
        }
        ControlRequest::SetContentProtection { enabled } => {
            ControlResponse::Window(commands::set_content_protection(state, enabled))
        }
        ControlRequest::NewConversation => {
            ControlResponse::ConversationId(commands::new_conversation(state))
        }
        ControlRequest::ListConversations => match commands::list_conversations(state).await {
            Ok(conversations) => ControlResponse::Conversations(conversations),
            Err(message) => ControlResponse::storage_failure(message),
        },
        ControlRequest::GetConversation { id } => {
            match commands::get_conversation(state, &id).await {
                Ok(conversation) => ControlResponse::Conversation(conversation),
                Err(message) => ControlResponse::storage_failure(message),
            }
        }
        ControlRequest::DeleteConversation { id } => {
            match commands::delete_conversation(state, &id).await {
                Ok(()) => ControlResponse::Ack,
                Err(message) => ControlResponse::storage_failure(message),
            }
        }
        ControlRequest::ClearConversations => match commands::clear_conversations(state).await {
            Ok(()) => ControlResponse::Ack,
            Err(message) => ControlResponse::storage_failure(message),
        },
        ControlRequest::SetApiKey { api_key } => {
            commands::set_api_key(state, api_key).await;
            ControlResponse::Ack
        }
        ControlRequest::ClearApiKey => {
            commands::clear_api_key(state).await;
            ControlResponse::Ack
        }
        ControlRequest::SetSystemInstruction { instruction } => {
            commands::set_system_instruction(state, instruction).await;
            ControlResponse::Ack
        }
        ControlRequest::SaveSettings { theme, shortcuts } => {
            ControlResponse::Settings(commands::save_settings(state, theme, shortcuts).await)
        }
        ControlRequest::GetSettings => ControlResponse::Settings(commands::get_settings(state).await),
    }
}

/// Parses one JSON line and dispatches it.
pub async fn dispatch_line(state: &AppState, line: &str) -> ControlResponse {
    match serde_json::from_str::<Value>(line) {
        Ok(value) => dispatch_value(state, value).await,
        Err(e) => invalid_request(e),
    }
}

async fn dispatch_value(state: &AppState, value: Value) -> ControlResponse {
    match serde_json::from_value::<ControlRequest>(value) {
        Ok(request) => dispatch(state, request).await,
        Err(e) => invalid_request(e),
    }
}

fn invalid_request(e: serde_json::Error) -> ControlResponse {
    tracing::warn!("Invalid control request: {}", e);
    ControlResponse::Error(format!("Invalid request: {}", e))
}

/// Answers one request line with one encoded response line, without the
/// trailing newline.
async fn respond(state: &AppState, line: &str) -> String {
    let (id, response) = match serde_json::from_str::<Value>(line) {
        Ok(value) => {
            let id = value.get("id").cloned();
            (id, dispatch_value(state, value).await)
        }
        Err(e) => (None, invalid_request(e)),
    };
    encode(&response, id)
}

fn encode(response: &ControlResponse, id: Option<Value>) -> String {
    let mut value = serde_json::to_value(response).unwrap_or_else(|e| {
        json!({ "type": "Error", "data": format!("Failed to encode response: {}", e) })
    });
    if let (Some(id), Some(object)) = (id, value.as_object_mut()) {
        object.insert("id".to_string(), id);
    }
    value.to_string()
}

/// Serves JSON lines until `reader` reaches end of input.
///
/// Every non-empty line is dispatched on its own task, so a slow backend call
/// never holds up window commands. Responses are written as they settle;
/// serving returns once input is exhausted and every response is written.
pub async fn serve<R, W>(state: Arc<AppState>, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let read = async move {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let state = Arc::clone(&state);
            let tx = tx.clone();
            tokio::spawn(async move {
                let encoded = respond(&state, &line).await;
                if tx.send(encoded).is_err() {
                    tracing::debug!("Control channel writer gone, dropping response");
                }
            });
        }
        // Each task holds its own sender; the writer stops after the last one.
        drop(tx);
        Ok::<_, std::io::Error>(())
    };

    let write = async {
        while let Some(mut encoded) = rx.recv().await {
            encoded.push('\n');
            writer.write_all(encoded.as_bytes()).await?;
            writer.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    };

    tokio::try_join!(read, write)?;

    tracing::info!("Control channel closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_names() {
        let request: ControlRequest = serde_json::from_value(json!({
            "op": "readFile",
            "args": { "data": "AAEC", "mediaType": "application/pdf" }
        }))
        .unwrap();

        assert_eq!(
            request,
            ControlRequest::ReadFile {
                data: "AAEC".into(),
                media_type: "application/pdf".into(),
                prompt: None,
            }
        );
        assert_eq!(request.op_name(), "readFile");
    }

    #[test]
    fn test_unit_request_without_args() {
        let request: ControlRequest =
            serde_json::from_value(json!({ "op": "captureScreenshot" })).unwrap();
        assert_eq!(request, ControlRequest::CaptureScreenshot);
    }

    #[test]
    fn test_set_api_key_field_is_camel_case() {
        let request: ControlRequest = serde_json::from_value(json!({
            "op": "setApiKey",
            "args": { "apiKey": "abc" }
        }))
        .unwrap();
        assert_eq!(request, ControlRequest::SetApiKey { api_key: "abc".into() });
    }

    #[test]
    fn test_response_shapes() {
        let outcome = ControlResponse::Outcome(Outcome::success("hi"));
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({ "type": "Outcome", "data": { "text": "hi" } })
        );

        let cancelled = ControlResponse::FilePath(None);
        assert_eq!(
            serde_json::to_value(&cancelled).unwrap(),
            json!({ "type": "FilePath", "data": null })
        );

        assert_eq!(
            serde_json::to_value(ControlResponse::Ack).unwrap(),
            json!({ "type": "Ack" })
        );
    }

    #[test]
    fn test_request_id_is_ignored_by_decoding() {
        let request: ControlRequest = serde_json::from_value(json!({
            "id": 7,
            "op": "getConversation",
            "args": { "id": "abc" }
        }))
        .unwrap();
        assert_eq!(request, ControlRequest::GetConversation { id: "abc".into() });
    }

    #[test]
    fn test_encode_echoes_id() {
        let encoded = encode(&ControlResponse::Ack, Some(json!("req-1")));
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value, json!({ "type": "Ack", "id": "req-1" }));

        let bare: Value = serde_json::from_str(&encode(&ControlResponse::Ack, None)).unwrap();
        assert_eq!(bare, json!({ "type": "Ack" }));
    }

    #[test]
    fn test_save_settings_fields_are_optional() {
        let request: ControlRequest = serde_json::from_value(json!({
            "op": "saveSettings",
            "args": { "theme": "dark" }
        }))
        .unwrap();
        assert_eq!(
            request,
            ControlRequest::SaveSettings {
                theme: Some(Theme::Dark),
                shortcuts: None,
            }
        );
    }
}
