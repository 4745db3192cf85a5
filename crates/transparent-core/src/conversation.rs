//! Persisted conversations and their repository trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;

const TITLE_LIMIT: usize = 50;

/// A conversation as stored across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl Conversation {
    /// Title derived from the first message: at most 50 characters, with an
    /// ellipsis when truncated.
    pub fn title_for(messages: &[Message]) -> String {
        let Some(first) = messages.first() else {
            return String::new();
        };

        let mut title: String = first.content.chars().take(TITLE_LIMIT).collect();
        if first.content.chars().count() > TITLE_LIMIT {
            title.push_str("...");
        }
        title
    }
}

/// Read/write access to stored conversations.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Inserts or replaces the conversation with the same id.
    async fn save(&self, conversation: &Conversation) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Conversation>>;

    async fn list_all(&self) -> Result<Vec<Conversation>>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Removes every stored conversation.
    async fn clear(&self) -> Result<()>;
}
