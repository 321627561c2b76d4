//! Generation service interfaces.
//!
//! The remote model is an opaque capability: given text (optionally with an
//! image) and prior turns, it returns generated text or fails. These traits
//! are the only seam between the use cases and any concrete provider.

use async_trait::async_trait;

use crate::conversation::Role;
use crate::error::Result;
use crate::image::ImagePayload;

/// One entry of the history replayed to the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTurn {
    pub role: Role,
    pub text: String,
}

impl RemoteTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// An open conversation context on the remote service.
///
/// A session remembers every successful exchange so later messages carry
/// the full context. A failed send leaves the remembered history unchanged.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Submits one user utterance and returns the generated reply.
    async fn send_message(&mut self, text: &str) -> Result<String>;

    /// Turns the session currently replays with each request.
    fn history(&self) -> &[RemoteTurn];
}

/// Factory for chat sessions plus the stateless multimodal call.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Opens a chat session seeded with prior turns.
    ///
    /// Fails with `GreenThumbError::Configuration` when credentials are absent.
    async fn open_chat(&self, history: Vec<RemoteTurn>) -> Result<Box<dyn ChatSession>>;

    /// One-shot call combining an image and an instruction.
    async fn analyze_image(&self, image: &ImagePayload, prompt: &str) -> Result<String>;
}
