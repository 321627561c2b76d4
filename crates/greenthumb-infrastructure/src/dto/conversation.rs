//! Conversation DTOs and migrations
//!
//! ## Version History
//! - **1.0.0**: Ordered turns with id, role, text, timestamp and optional error flag.
//!   Bare arrays written before versioning are read as this version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

use greenthumb_core::conversation::{Conversation, Role, Turn};

// ============================================================================
// Turn DTOs
// ============================================================================

/// Turn DTO V1.0.0
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnV1_0_0 {
    pub id: String,
    /// "user" or "model"
    pub role: Role,
    pub text: String,
    /// RFC 3339 instant
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_error: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<&Turn> for TurnV1_0_0 {
    fn from(turn: &Turn) -> Self {
        TurnV1_0_0 {
            id: turn.id.clone(),
            role: turn.role,
            text: turn.text.clone(),
            timestamp: turn.timestamp,
            is_error: turn.is_error,
        }
    }
}

impl From<TurnV1_0_0> for Turn {
    fn from(dto: TurnV1_0_0) -> Self {
        Turn {
            id: dto.id,
            role: dto.role,
            text: dto.text,
            timestamp: dto.timestamp,
            is_error: dto.is_error,
        }
    }
}

// ============================================================================
// Conversation DTOs
// ============================================================================

/// Conversation DTO V1.0.0
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct ConversationV1_0_0 {
    pub turns: Vec<TurnV1_0_0>,
}

/// Convert ConversationV1_0_0 DTO to domain model
impl IntoDomain<Conversation> for ConversationV1_0_0 {
    fn into_domain(self) -> Conversation {
        Conversation::from_turns(self.turns.into_iter().map(Turn::from).collect())
    }
}

/// Convert domain model to ConversationV1_0_0 DTO (for version-migrate save support)
impl FromDomain<Conversation> for ConversationV1_0_0 {
    fn from_domain(conversation: Conversation) -> Self {
        ConversationV1_0_0 {
            turns: conversation.turns.iter().map(TurnV1_0_0::from).collect(),
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Entity name registered with the conversation migrator.
pub const CONVERSATION_ENTITY: &str = "conversation";

/// Creates a Migrator for Conversation entities.
pub fn create_conversation_migrator() -> version_migrate::Migrator {
    version_migrate::migrator!("conversation" => [
        ConversationV1_0_0,
        Conversation
    ], save = true)
    .expect("Failed to create conversation migrator")
}

/// Wraps a pre-versioning document (a bare array of turns) as version 1.0.0.
///
/// Any other value is returned untouched.
pub fn upgrade_legacy_document(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Array(turns) => serde_json::json!({
            "version": "1.0.0",
            "turns": turns,
        }),
        other => other,
    }
}
