//! Conversation repository trait.
//!
//! Defines the interface for conversation persistence operations.

use super::model::Conversation;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for the persisted conversation.
///
/// There is exactly one stored conversation. Implementations rewrite it
/// wholesale on every save; there is no partial or append-only format.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Loads the stored conversation.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Conversation))`: A well-formed conversation was stored
    /// - `Ok(None)`: Nothing stored yet
    /// - `Err(GreenThumbError::Persistence)`: Stored data is malformed
    async fn load(&self) -> Result<Option<Conversation>>;

    /// Replaces the stored conversation.
    async fn save(&self, conversation: &Conversation) -> Result<()>;

    /// Removes the stored conversation. Succeeds when nothing is stored.
    async fn clear(&self) -> Result<()>;
}
