//! Versioned persistence DTOs.

pub mod conversation;

pub use conversation::{
    CONVERSATION_ENTITY, ConversationV1_0_0, TurnV1_0_0, create_conversation_migrator,
    upgrade_legacy_document,
};
