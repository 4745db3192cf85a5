//! Configuration models for `config.toml` and `secret.json`.
//!
//! Every field has a default so a partial or missing `config.toml` is valid.

use serde::{Deserialize, Serialize};

pub const DEFAULT_GEMINI_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models";

/// Root of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub theme: Theme,
    pub window: WindowConfig,
    pub gateway: GatewayConfig,
    pub shortcuts: ShortcutConfig,
    pub host: HostConfig,
}

/// Overlay geometry defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    /// Collapsed height.
    pub height: u32,
    pub expanded_height: u32,
    pub x: i32,
    /// Gap between the window's bottom edge and the bottom of the work area.
    pub bottom_margin: i32,
    /// Used when the host cannot report the display work area.
    pub work_area_height: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 50,
            expanded_height: 350,
            x: 100,
            bottom_margin: 80,
            work_area_height: 1080,
        }
    }
}

impl WindowConfig {
    /// Height added on expansion.
    pub fn expansion_delta(&self) -> u32 {
        self.expanded_height.saturating_sub(self.height)
    }
}

/// Backend models and per-modality options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub system_instruction: String,
    pub text_model: String,
    pub transcription_model: String,
    pub speech_model: String,
    pub image_model: String,
    pub document_model: String,
    pub language_code: String,
    pub voice_name: String,
    pub enable_search_tools: bool,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            system_instruction: "You are a helpful assistant.".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            transcription_model: "gemini-2.5-pro".to_string(),
            speech_model: "gemini-2.5-flash-preview-tts".to_string(),
            image_model: "gemini-2.0-flash-preview-image-generation".to_string(),
            document_model: "gemini-2.5-flash".to_string(),
            language_code: "en-US".to_string(),
            voice_name: "Kore".to_string(),
            enable_search_tools: true,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Global shortcut accelerators. Registration belongs to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutConfig {
    pub toggle: String,
    pub screenshot: String,
    pub audio: String,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            toggle: "Cmd+\\".to_string(),
            screenshot: "Cmd+Shift+S".to_string(),
            audio: "Cmd+Shift+A".to_string(),
        }
    }
}

/// External commands used by the headless host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// argv of a command that writes one PNG screenshot to stdout.
    pub screenshot_command: Option<Vec<String>>,
    /// argv of a command that prints the chosen path; non-zero exit means cancel.
    pub file_picker_command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Root structure of `secret.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
}
