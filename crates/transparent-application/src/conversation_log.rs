//! The session's conversation log.
//!
//! Append-only, insertion ordered. Consecutive messages with the same role
//! are allowed.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use transparent_core::conversation::Conversation;
use transparent_core::message::Message;
use uuid::Uuid;

struct LogState {
    id: String,
    created_at: i64,
    messages: Vec<Message>,
}

impl LogState {
    fn fresh() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
            messages: Vec::new(),
        }
    }
}

pub struct ConversationLog {
    state: Mutex<LogState>,
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationLog {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LogState::fresh()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LogState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn id(&self) -> String {
        self.lock().id.clone()
    }

    /// Appends the tail of `history` that is not logged yet.
    ///
    /// Messages match a logged entry at the same position by id, or by role
    /// and content when the UI did not send a stable id. Everything after the
    /// longest matching prefix is appended, except ids the log already holds.
    pub fn sync_history(&self, history: &[Message]) {
        let mut state = self.lock();
        let matched = state
            .messages
            .iter()
            .zip(history)
            .take_while(|(logged, sent)| same_message(logged, sent))
            .count();

        let mut known: HashSet<String> = state.messages.iter().map(|m| m.id.clone()).collect();
        for message in &history[matched..] {
            if known.insert(message.id.clone()) {
                state.messages.push(message.clone());
            }
        }
    }

    pub fn append(&self, message: Message) {
        self.lock().messages.push(message);
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().messages.is_empty()
    }

    /// The log as a persistable conversation, or `None` while empty.
    pub fn to_conversation(&self) -> Option<Conversation> {
        let state = self.lock();
        if state.messages.is_empty() {
            return None;
        }

        Some(Conversation {
            id: state.id.clone(),
            title: Conversation::title_for(&state.messages),
            messages: state.messages.clone(),
            created_at: state.created_at,
            updated_at: chrono::Utc::now().timestamp_millis(),
        })
    }

    /// Starts a new conversation and returns its id.
    pub fn reset(&self) -> String {
        let mut state = self.lock();
        *state = LogState::fresh();
        state.id.clone()
    }
}

fn same_message(logged: &Message, sent: &Message) -> bool {
    logged.id == sent.id || (logged.role == sent.role && logged.content == sent.content)
}
