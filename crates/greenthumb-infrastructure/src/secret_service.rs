//! Secret service implementation.
//!
//! Reads the Gemini API key from the process environment. A `.env` file is
//! loaded into the environment by the binary before this service runs.

use std::sync::Arc;

use greenthumb_core::config::{GeminiConfig, SecretConfig};
use greenthumb_core::secret::SecretService;

/// Environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "API_KEY";

type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolves secrets from environment variables.
///
/// The variable is read on every call so a key exported after startup is
/// picked up at the next remote action.
#[derive(Clone)]
pub struct EnvSecretService {
    var_name: String,
    lookup: Lookup,
}

impl Default for EnvSecretService {
    fn default() -> Self {
        Self::new(API_KEY_VAR)
    }
}

impl EnvSecretService {
    /// Creates a service reading `var_name` from the process environment.
    pub fn new(var_name: impl Into<String>) -> Self {
        Self::with_lookup(var_name, |name| std::env::var(name).ok())
    }

    /// Creates a service with a custom variable source (for testing).
    pub fn with_lookup<F>(var_name: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            var_name: var_name.into(),
            lookup: Arc::new(lookup),
        }
    }
}

impl std::fmt::Debug for EnvSecretService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvSecretService")
            .field("var_name", &self.var_name)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl SecretService for EnvSecretService {
    async fn load_secrets(&self) -> SecretConfig {
        let gemini = (self.lookup)(&self.var_name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(|api_key| GeminiConfig { api_key });

        SecretConfig { gemini }
    }
}
