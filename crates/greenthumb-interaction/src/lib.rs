//! Remote generation clients for GreenThumb.

pub mod gemini_api_client;

pub use gemini_api_client::{GeminiApiClient, GeminiChatSession};
