//! Core domain for GreenThumb.
//!
//! UI-agnostic types and interfaces shared by the infrastructure,
//! interaction and application layers. Nothing in here performs I/O.

pub mod config;
pub mod conversation;
pub mod error;
pub mod generation;
pub mod image;
pub mod markdown;
pub mod prompts;
pub mod secret;

// Re-export common error type
pub use error::{GreenThumbError, Result};
