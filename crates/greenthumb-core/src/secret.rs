//! Secret management service trait.
//!
//! Defines the interface for resolving the service credential.

use crate::config::SecretConfig;

/// Service for resolving secret configuration.
///
/// # Security Note
///
/// Implementations must never log secret values or embed them in error
/// messages.
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration.
    ///
    /// A missing credential is not an error here: callers decide whether its
    /// absence is fatal, which keeps the failure lazy (first remote action).
    async fn load_secrets(&self) -> SecretConfig;
}
