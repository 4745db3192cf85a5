//! Conversation history commands.
//!
//! Failures are returned as messages; the control channel turns them into
//! `IOFailure` outcomes.

use transparent_core::conversation::Conversation;

use crate::app::AppState;

/// Starts a fresh conversation log and returns its id.
pub fn new_conversation(state: &AppState) -> String {
    let id = state.orchestrator.log().reset();
    tracing::info!("[new_conversation] Started conversation {}", id);
    id
}

/// Stored conversations, most recently updated first.
pub async fn list_conversations(state: &AppState) -> Result<Vec<Conversation>, String> {
    state
        .conversation_repository
        .list_all()
        .await
        .map_err(|e| format!("Failed to list conversations: {}", e))
}

pub async fn get_conversation(state: &AppState, id: &str) -> Result<Option<Conversation>, String> {
    state
        .conversation_repository
        .find_by_id(id)
        .await
        .map_err(|e| format!("Failed to load conversation {}: {}", id, e))
}

pub async fn delete_conversation(state: &AppState, id: &str) -> Result<(), String> {
    state
        .conversation_repository
        .delete(id)
        .await
        .map_err(|e| format!("Failed to delete conversation {}: {}", id, e))?;
    tracing::info!("[delete_conversation] Deleted conversation {}", id);
    Ok(())
}

/// Deletes every stored conversation and starts a fresh log.
pub async fn clear_conversations(state: &AppState) -> Result<(), String> {
    state
        .conversation_repository
        .clear()
        .await
        .map_err(|e| format!("Failed to clear conversations: {}", e))?;
    let id = state.orchestrator.log().reset();
    tracing::info!("[clear_conversations] Cleared history, now on conversation {}", id);
    Ok(())
}
