//! Conversation domain module.
//!
//! - `model`: turns, roles and the ordered conversation log
//! - `repository`: persistence interface for the single stored conversation

mod model;
mod repository;

pub use model::{Conversation, Role, Turn, WELCOME_TEXT, WELCOME_TURN_ID};
pub use repository::ConversationRepository;
