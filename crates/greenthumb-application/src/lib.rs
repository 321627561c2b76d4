//! Use cases for GreenThumb.
//!
//! - [`ChatService`]: the chat conversation, its persistence and error turns
//! - [`PlantAnalyzerService`]: photo normalization and plant identification
//! - [`SessionGateway`]: the single live remote chat session
//! - [`ConversationStore`]: load/save/reset with fallback to the greeting

pub mod chat_service;
pub mod conversation_store;
mod pending;
pub mod plant_analyzer_service;
pub mod session_gateway;

#[cfg(test)]
mod test_support;

pub use chat_service::{ChatService, SendOutcome};
pub use conversation_store::ConversationStore;
pub use plant_analyzer_service::{AnalysisOutcome, PlantAnalyzerService, preparation_failure_message};
pub use session_gateway::SessionGateway;
