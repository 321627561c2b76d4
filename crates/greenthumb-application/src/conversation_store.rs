//! Conversation store use case.
//!
//! Wraps a [`ConversationRepository`] with the recovery policy: anything
//! missing or unreadable in storage becomes the default greeting-only
//! conversation, logged but never surfaced.

use std::sync::Arc;

use tracing::{info, warn};

use greenthumb_core::Result;
use greenthumb_core::conversation::{Conversation, ConversationRepository};
use greenthumb_core::generation::RemoteTurn;

#[derive(Clone)]
pub struct ConversationStore {
    repository: Arc<dyn ConversationRepository>,
}

impl ConversationStore {
    pub fn new(repository: Arc<dyn ConversationRepository>) -> Self {
        Self { repository }
    }

    /// Restores the persisted conversation, falling back to the default one.
    pub async fn load(&self) -> Conversation {
        match self.repository.load().await {
            Ok(Some(conversation)) => {
                info!(turns = conversation.len(), "Restored chat history");
                conversation
            }
            Ok(None) => Conversation::default(),
            Err(e) => {
                warn!("Discarding stored chat history: {}", e);
                Conversation::default()
            }
        }
    }

    /// Persists the full conversation.
    pub async fn save(&self, conversation: &Conversation) -> Result<()> {
        self.repository.save(conversation).await
    }

    /// Replaces `conversation` with the greeting and clears persisted state.
    ///
    /// The in-memory reset happens even when clearing storage fails.
    pub async fn reset(&self, conversation: &mut Conversation) -> Result<()> {
        conversation.reset();
        self.repository.clear().await
    }

    /// Projects a conversation into the history replayed to the remote service.
    pub fn to_remote_history(conversation: &Conversation) -> Vec<RemoteTurn> {
        conversation.to_remote_history()
    }
}
