//! GeminiBackend - Direct REST API implementation of [`GenerativeBackend`].
//!
//! Calls `models/{model}:generateContent` once per [`BackendCall`]. Request
//! building and response parsing are plain functions over the wire types so
//! they can be tested without a network.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use transparent_core::backend::{
    BackendCall, BackendContent, BackendError, BackendPart, BackendReply, BackendRole,
    GenerativeBackend, InlineData, ReplyPart, ResponseModality,
};
use transparent_core::config::DEFAULT_GEMINI_BASE_URL;

/// Backend implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    base_url: String,
}

impl GeminiBackend {
    /// Creates a client with the given per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| BackendError::Transport(err.without_url().to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn with_default_url(timeout: Duration) -> Result<Self, BackendError> {
        Self::new(DEFAULT_GEMINI_BASE_URL, timeout)
    }

    fn endpoint(&self, model: &str, api_key: &str) -> String {
        format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url.trim_end_matches('/'),
        )
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate(&self, call: BackendCall) -> Result<BackendReply, BackendError> {
        if call.api_key.trim().is_empty() {
            return Err(BackendError::MissingCredential);
        }

        let url = self.endpoint(&call.model, &call.api_key);
        let body = build_request_body(&call);
        debug!(model = %call.model, contents = call.contents.len(), "Sending Gemini request");

        // reqwest errors embed the URL, which carries the key.
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| BackendError::Decode(err.without_url().to_string()))?;

        parse_reply(parsed)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Tool {
    GoogleSearch {},
    UrlContext {},
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    response_modalities: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    language_code: String,
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ContentResponse>,
    grounding_metadata: Option<Value>,
    url_context_metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    text: Option<String>,
    inline_data: Option<InlineDataPayload>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn build_request_body(call: &BackendCall) -> GenerateContentRequest {
    let contents = call.contents.iter().map(to_wire_content).collect();

    let system_instruction = call.system_instruction.as_ref().map(|text| Content {
        role: None,
        parts: vec![Part::Text { text: text.clone() }],
    });

    let tools = if call.search_tools {
        vec![Tool::GoogleSearch {}, Tool::UrlContext {}]
    } else {
        Vec::new()
    };

    let response_modalities: Vec<&'static str> = call
        .response_modalities
        .iter()
        .map(|modality| match modality {
            ResponseModality::Text => "TEXT",
            ResponseModality::Image => "IMAGE",
            ResponseModality::Audio => "AUDIO",
        })
        .collect();

    let speech_config = call.speech.as_ref().map(|speech| SpeechConfig {
        language_code: speech.language_code.clone(),
        voice_config: VoiceConfig {
            prebuilt_voice_config: PrebuiltVoiceConfig {
                voice_name: speech.voice_name.clone(),
            },
        },
    });

    let generation_config = if call.response_mime_type.is_none()
        && response_modalities.is_empty()
        && speech_config.is_none()
    {
        None
    } else {
        Some(GenerationConfig {
            response_mime_type: call.response_mime_type.clone(),
            response_modalities,
            speech_config,
        })
    };

    GenerateContentRequest {
        contents,
        system_instruction,
        tools,
        generation_config,
    }
}

fn to_wire_content(content: &BackendContent) -> Content {
    let role = content.role.map(|role| match role {
        BackendRole::User => "user",
        BackendRole::Model => "model",
    });

    let parts = content
        .parts
        .iter()
        .map(|part| match part {
            BackendPart::Text(text) => Part::Text { text: text.clone() },
            BackendPart::InlineData(data) => Part::InlineData {
                inline_data: InlineDataPayload {
                    mime_type: data.mime_type.clone(),
                    data: data.data.clone(),
                },
            },
        })
        .collect();

    Content { role, parts }
}

/// Keeps the first candidate; a response without one is [`BackendError::Empty`].
fn parse_reply(response: GenerateContentResponse) -> Result<BackendReply, BackendError> {
    let candidate = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .ok_or(BackendError::Empty)?;

    let parts = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| match (part.text, part.inline_data) {
            (_, Some(data)) => Some(ReplyPart::InlineData(InlineData {
                mime_type: data.mime_type,
                data: data.data,
            })),
            (Some(text), None) => Some(ReplyPart::Text(text)),
            (None, None) => None,
        })
        .collect();

    Ok(BackendReply {
        parts,
        grounding_metadata: candidate.grounding_metadata,
        url_context_metadata: candidate.url_context_metadata,
    })
}

fn map_http_error(status: StatusCode, body: &str) -> BackendError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string());

    BackendError::Http {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use transparent_core::backend::SpeechOptions;

    fn call(contents: Vec<BackendContent>) -> BackendCall {
        BackendCall {
            model: "gemini-2.5-flash".into(),
            api_key: "key".into(),
            system_instruction: None,
            contents,
            response_mime_type: None,
            response_modalities: Vec::new(),
            speech: None,
            search_tools: false,
        }
    }

    #[test]
    fn test_text_request_body() {
        let mut text_call = call(vec![
            BackendContent {
                role: Some(BackendRole::User),
                parts: vec![BackendPart::Text("hello".into())],
            },
            BackendContent {
                role: Some(BackendRole::Model),
                parts: vec![BackendPart::Text("hi".into())],
            },
        ]);
        text_call.system_instruction = Some("Be brief.".into());
        text_call.response_mime_type = Some("text/plain".into());
        text_call.search_tools = true;

        let body = serde_json::to_value(build_request_body(&text_call)).unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [
                    { "role": "user", "parts": [{ "text": "hello" }] },
                    { "role": "model", "parts": [{ "text": "hi" }] }
                ],
                "systemInstruction": { "parts": [{ "text": "Be brief." }] },
                "tools": [{ "googleSearch": {} }, { "urlContext": {} }],
                "generationConfig": { "responseMimeType": "text/plain" }
            })
        );
    }

    #[test]
    fn test_speech_request_body() {
        let mut speech_call = call(vec![BackendContent {
            role: None,
            parts: vec![BackendPart::Text("Say hi".into())],
        }]);
        speech_call.response_modalities = vec![ResponseModality::Audio];
        speech_call.speech = Some(SpeechOptions {
            language_code: "en-US".into(),
            voice_name: "Kore".into(),
        });

        let body = serde_json::to_value(build_request_body(&speech_call)).unwrap();

        assert_eq!(body["contents"][0], json!({ "parts": [{ "text": "Say hi" }] }));
        assert!(body.get("tools").is_none());
        assert_eq!(
            body["generationConfig"],
            json!({
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "languageCode": "en-US",
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": "Kore" } }
                }
            })
        );
    }

    #[test]
    fn test_inline_data_part() {
        let doc_call = call(vec![BackendContent {
            role: Some(BackendRole::User),
            parts: vec![BackendPart::InlineData(InlineData {
                mime_type: "application/pdf".into(),
                data: "JVBERi0=".into(),
            })],
        }]);

        let body = serde_json::to_value(build_request_body(&doc_call)).unwrap();

        assert_eq!(
            body["contents"][0]["parts"][0],
            json!({ "inlineData": { "mimeType": "application/pdf", "data": "JVBERi0=" } })
        );
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_parse_reply_with_text_data_and_metadata() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here it is" },
                    { "inlineData": { "mimeType": "image/png", "data": "iVBORw==" } }
                ]},
                "groundingMetadata": { "webSearchQueries": ["rust"] }
            }]
        }))
        .unwrap();

        let reply = parse_reply(response).unwrap();

        assert_eq!(reply.text().as_deref(), Some("Here it is"));
        assert_eq!(reply.first_inline_data().unwrap().data, "iVBORw==");
        assert_eq!(
            reply.grounding_metadata,
            Some(json!({ "webSearchQueries": ["rust"] }))
        );
        assert!(reply.url_context_metadata.is_none());
    }

    #[test]
    fn test_parse_reply_without_candidates() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(parse_reply(response), Err(BackendError::Empty)));
    }

    #[test]
    fn test_map_http_error_extracts_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;

        match map_http_error(StatusCode::BAD_REQUEST, body) {
            BackendError::Http { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "INVALID_ARGUMENT: API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_map_http_error_with_plain_body() {
        match map_http_error(StatusCode::BAD_GATEWAY, "upstream down") {
            BackendError::Http { message, .. } => assert_eq!(message, "upstream down"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_endpoint() {
        let backend =
            GeminiBackend::new("https://example.test/v1beta/models/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            backend.endpoint("gemini-2.5-flash", "abc"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent?key=abc"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let backend = GeminiBackend::with_default_url(Duration::from_secs(5)).unwrap();
        let result = backend.generate(BackendCall {
            api_key: String::new(),
            ..call(Vec::new())
        });
        assert!(matches!(result.await, Err(BackendError::MissingCredential)));
    }
}
