//! JSON-file ConversationRepository implementation.
//!
//! All conversations live in a single `conversations.json` array. Blocking
//! file access runs on the blocking pool and writes use
//! [`AtomicFile::update`] so concurrent saves never interleave.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::task;
use transparent_core::conversation::{Conversation, ConversationRepository};
use transparent_core::error::{Result, TransparentError};

use crate::storage::AtomicFile;

type ConversationList = Vec<Conversation>;

pub struct JsonConversationRepository {
    file: AtomicFile<ConversationList>,
}

impl JsonConversationRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::json(path),
        }
    }

    async fn blocking<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(AtomicFile<ConversationList>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = self.file.clone();
        task::spawn_blocking(move || f(file))
            .await
            .map_err(|e| TransparentError::io(format!("Failed to spawn blocking task: {}", e)))?
    }
}

#[async_trait]
impl ConversationRepository for JsonConversationRepository {
    async fn save(&self, conversation: &Conversation) -> Result<()> {
        let conversation = conversation.clone();

        self.blocking(move |file| {
            file.update(Vec::new(), |list| {
                match list.iter_mut().find(|c| c.id == conversation.id) {
                    Some(existing) => *existing = conversation,
                    None => list.push(conversation),
                }
            })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Conversation>> {
        let id = id.to_string();

        self.blocking(move |file| {
            let list = file.load()?.unwrap_or_default();
            Ok(list.into_iter().find(|c| c.id == id))
        })
        .await
    }

    /// Most recently updated first.
    async fn list_all(&self) -> Result<Vec<Conversation>> {
        self.blocking(|file| {
            let mut list = file.load()?.unwrap_or_default();
            list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(list)
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();

        self.blocking(move |file| {
            file.update(Vec::new(), |list| list.retain(|c| c.id != id))?;
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.blocking(|file| {
            file.update(Vec::new(), |list| list.clear())?;
            Ok(())
        })
        .await
    }
}
