//! Runtime settings commands.
//!
//! Changes apply to the running gateway first. Persisting them is best
//! effort: a failed write is logged and the new value stays in effect.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task;
use transparent_core::config::{AppConfig, ShortcutConfig, Theme, WindowConfig};
use transparent_infrastructure::{SecretStorage, SecretStorageError};

use crate::app::AppState;

/// Settings visible to the UI. Never carries the credential itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub theme: Theme,
    pub shortcuts: ShortcutConfig,
    pub window: WindowConfig,
    pub system_instruction: String,
    pub has_api_key: bool,
}

/// Swaps the backend credential and stores it in `secret.json`.
///
/// Requests already in flight keep the old credential.
pub async fn set_api_key(state: &AppState, api_key: String) {
    state.orchestrator.gateway().set_api_key(api_key.clone());

    if let Err(e) = with_secrets(state, move |secrets| secrets.save_api_key(&api_key)).await {
        tracing::warn!("[set_api_key] {}", e);
    }
}

/// Drops the backend credential and removes it from `secret.json`.
pub async fn clear_api_key(state: &AppState) {
    state.orchestrator.gateway().clear_api_key();

    if let Err(e) = with_secrets(state, |secrets| secrets.clear_api_key()).await {
        tracing::warn!("[clear_api_key] {}", e);
    }
}

/// Swaps the system instruction and stores it in `config.toml`.
pub async fn set_system_instruction(state: &AppState, instruction: String) {
    state
        .orchestrator
        .gateway()
        .set_system_instruction(instruction.clone());

    let mut config = state.config.lock().await;
    config.gateway.system_instruction = instruction;
    if let Err(e) = save_config(state, &config).await {
        tracing::warn!("[set_system_instruction] {}", e);
    }
}

/// Merges the given theme and shortcuts into `config.toml`. Absent fields
/// keep their current value.
pub async fn save_settings(
    state: &AppState,
    theme: Option<Theme>,
    shortcuts: Option<ShortcutConfig>,
) -> SettingsView {
    let mut config = state.config.lock().await;
    if let Some(theme) = theme {
        config.theme = theme;
    }
    if let Some(shortcuts) = shortcuts {
        config.shortcuts = shortcuts;
    }

    if let Err(e) = save_config(state, &config).await {
        tracing::warn!("[save_settings] {}", e);
    }
    view(state, &config)
}

pub async fn get_settings(state: &AppState) -> SettingsView {
    let config = state.config.lock().await;
    view(state, &config)
}

fn view(state: &AppState, config: &AppConfig) -> SettingsView {
    let gateway = state.orchestrator.gateway();

    SettingsView {
        theme: config.theme,
        shortcuts: config.shortcuts.clone(),
        window: config.window.clone(),
        system_instruction: gateway.snapshot().system_instruction.clone(),
        has_api_key: gateway.has_api_key(),
    }
}

/// Writes `config` on the blocking pool. Callers hold the config lock so
/// writes land in order.
async fn save_config(state: &AppState, config: &AppConfig) -> Result<(), String> {
    let service = Arc::clone(&state.config_service);
    let config = config.clone();

    task::spawn_blocking(move || service.save(&config))
        .await
        .map_err(|e| format!("Failed to spawn blocking task: {}", e))?
        .map_err(|e| format!("Failed to save config.toml: {}", e))
}

async fn with_secrets<F>(state: &AppState, f: F) -> Result<(), String>
where
    F: FnOnce(&SecretStorage) -> Result<(), SecretStorageError> + Send + 'static,
{
    let secrets = Arc::clone(&state.secret_storage);

    task::spawn_blocking(move || f(secrets.as_ref()))
        .await
        .map_err(|e| format!("Failed to spawn blocking task: {}", e))?
        .map_err(|e| format!("Failed to update secret.json: {}", e))
}
