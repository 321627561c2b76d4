//! Conversation domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::generation::RemoteTurn;

/// Identifier reserved for the greeting turn that opens every conversation.
pub const WELCOME_TURN_ID: &str = "welcome";

/// Greeting shown at the start of a fresh or reset conversation.
pub const WELCOME_TEXT: &str =
    "Hello! I'm GreenThumb, your gardening assistant. Ask me anything about your plants!";

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing into the chat.
    User,
    /// The generative model (including synthesized error notices).
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One utterance in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Stable identifier used for list rendering.
    pub id: String,
    pub role: Role,
    /// Content of the utterance; model turns hold markdown.
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Marks a synthesized failure notice. Never replayed to the remote service.
    #[serde(default)]
    pub is_error: bool,
}

impl Turn {
    fn new(role: Role, text: impl Into<String>, is_error: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
            is_error,
        }
    }

    /// Creates a turn typed by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text, false)
    }

    /// Creates a turn holding generated model text.
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text, false)
    }

    /// Creates a model-side failure notice.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text, true)
    }

    /// Creates the greeting turn.
    pub fn welcome() -> Self {
        Self {
            id: WELCOME_TURN_ID.to_string(),
            role: Role::Model,
            text: WELCOME_TEXT.to_string(),
            timestamp: Utc::now(),
            is_error: false,
        }
    }

    pub fn is_welcome(&self) -> bool {
        self.id == WELCOME_TURN_ID
    }

    /// Whether this turn belongs in the history replayed to the remote service.
    pub fn is_replayable(&self) -> bool {
        !self.is_welcome() && !self.is_error
    }
}

/// Ordered log of turns.
///
/// Append-only except for [`Conversation::reset`], which replaces the whole
/// log with the greeting turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub turns: Vec<Turn>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self {
            turns: vec![Turn::welcome()],
        }
    }
}

impl Conversation {
    /// Builds a conversation from already-ordered turns.
    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Appends a turn and returns a reference to it.
    pub fn push(&mut self, turn: Turn) -> &Turn {
        self.turns.push(turn);
        // Safe to index because we just pushed an element
        &self.turns[self.turns.len() - 1]
    }

    /// Replaces every turn with a fresh greeting.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True when the conversation holds nothing but the greeting.
    pub fn is_pristine(&self) -> bool {
        matches!(self.turns.as_slice(), [only] if only.is_welcome())
    }

    /// Projects the conversation into the remote service's history format.
    ///
    /// The greeting and error notices are dropped; order is preserved.
    pub fn to_remote_history(&self) -> Vec<RemoteTurn> {
        self.turns
            .iter()
            .filter(|turn| turn.is_replayable())
            .map(|turn| RemoteTurn {
                role: turn.role,
                text: turn.text.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_conversation_is_single_welcome() {
        let conversation = Conversation::default();
        assert_eq!(conversation.len(), 1);
        assert!(conversation.is_pristine());
        assert_eq!(conversation.turns()[0].id, WELCOME_TURN_ID);
        assert_eq!(conversation.turns()[0].role, Role::Model);
        assert_eq!(conversation.turns()[0].text, WELCOME_TEXT);
    }

    #[test]
    fn test_remote_history_skips_welcome_and_errors() {
        let mut conversation = Conversation::default();
        conversation.push(Turn::user("When should I prune roses?"));
        conversation.push(Turn::model("Late winter."));
        conversation.push(Turn::user("And hydrangeas?"));
        conversation.push(Turn::error("Sorry, I had trouble connecting."));
        conversation.push(Turn::user("Hello again"));

        let history = conversation.to_remote_history();
        let texts: Vec<&str> = history.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "When should I prune roses?",
                "Late winter.",
                "And hydrangeas?",
                "Hello again"
            ]
        );
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Model);
    }

    #[test]
    fn test_remote_history_of_empty_conversation() {
        let conversation = Conversation::from_turns(Vec::new());
        assert!(conversation.is_empty());
        assert!(conversation.to_remote_history().is_empty());
    }

    #[test]
    fn test_reset_restores_greeting() {
        let mut conversation = Conversation::default();
        conversation.push(Turn::user("hi"));
        conversation.push(Turn::model("hello"));
        conversation.reset();
        assert!(conversation.is_pristine());
    }

    #[test]
    fn test_turn_ids_are_unique() {
        let a = Turn::user("a");
        let b = Turn::user("a");
        assert_ne!(a.id, b.id);
        assert!(!a.is_welcome());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), "\"model\"");
        assert_eq!(Role::User.as_str(), "user");
    }
}
