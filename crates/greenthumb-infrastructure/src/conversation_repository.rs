//! Conversation repository backed by the JSON key/value store.
//!
//! The whole conversation lives under one key as a flat versioned document.
//! Uses version-migrate for schema migration; bare arrays written before
//! versioning are upgraded on read.
//!
//! File location: `{config_dir}/store/chat_history.json`

use std::collections::HashSet;

use async_trait::async_trait;
use version_migrate::Migrator;

use greenthumb_core::conversation::{Conversation, ConversationRepository};
use greenthumb_core::{GreenThumbError, Result};

use crate::dto::{CONVERSATION_ENTITY, create_conversation_migrator, upgrade_legacy_document};
use crate::paths::GreenThumbPaths;
use crate::storage::JsonKeyValueStore;

/// Store key holding the conversation.
pub const CHAT_HISTORY_KEY: &str = "chat_history";

/// File-based conversation repository with version migration support.
pub struct FileConversationRepository {
    store: JsonKeyValueStore,
    migrator: Migrator,
}

impl FileConversationRepository {
    /// Creates a repository under the resolved store directory.
    pub fn new(paths: &GreenThumbPaths) -> Result<Self> {
        let store_dir = paths
            .store_dir()
            .map_err(|e| GreenThumbError::configuration(e.to_string()))?;
        Ok(Self::with_store(JsonKeyValueStore::new(store_dir)))
    }

    /// Creates a repository over an existing store (for testing).
    pub fn with_store(store: JsonKeyValueStore) -> Self {
        Self {
            store,
            migrator: create_conversation_migrator(),
        }
    }

    fn decode(&self, content: &str) -> Result<Conversation> {
        let json_value: serde_json::Value = serde_json::from_str(content).map_err(|e| {
            GreenThumbError::persistence(format!("Failed to parse chat history JSON: {}", e))
        })?;

        let conversation: Conversation = self
            .migrator
            .load_flat_from(CONVERSATION_ENTITY, upgrade_legacy_document(json_value))
            .map_err(|e| {
                GreenThumbError::persistence(format!("Failed to migrate chat history: {}", e))
            })?;

        validate(&conversation)?;
        Ok(conversation)
    }
}

/// Checks that every turn id is non-empty and unique.
fn validate(conversation: &Conversation) -> Result<()> {
    let mut seen = HashSet::with_capacity(conversation.len());
    for (index, turn) in conversation.turns().iter().enumerate() {
        if turn.id.trim().is_empty() {
            return Err(GreenThumbError::persistence(format!(
                "Turn {} has an empty id",
                index
            )));
        }
        if !seen.insert(turn.id.as_str()) {
            return Err(GreenThumbError::persistence(format!(
                "Duplicate turn id: {}",
                turn.id
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl ConversationRepository for FileConversationRepository {
    async fn load(&self) -> Result<Option<Conversation>> {
        let store = self.store.clone();
        let content = tokio::task::spawn_blocking(move || store.get(CHAT_HISTORY_KEY))
            .await
            .map_err(|e| GreenThumbError::io(format!("Load task failed: {}", e)))??;

        content.map(|content| self.decode(&content)).transpose()
    }

    async fn save(&self, conversation: &Conversation) -> Result<()> {
        // Serialize using migrator (includes version info)
        let serialized = self
            .migrator
            .save_domain_flat(CONVERSATION_ENTITY, conversation.clone())
            .map_err(|e| {
                GreenThumbError::persistence(format!("Failed to serialize chat history: {}", e))
            })?;

        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.set(CHAT_HISTORY_KEY, &serialized))
            .await
            .map_err(|e| GreenThumbError::io(format!("Save task failed: {}", e)))?
    }

    async fn clear(&self) -> Result<()> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.remove(CHAT_HISTORY_KEY))
            .await
            .map_err(|e| GreenThumbError::io(format!("Clear task failed: {}", e)))?
    }
}
