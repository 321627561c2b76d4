//! Application configuration model.
//!
//! Non-secret settings come from `config.toml`; the API key is resolved
//! separately through [`crate::secret::SecretService`].

use serde::{Deserialize, Serialize};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub gemini: GeminiSettings,
}

/// Settings for the Gemini REST client.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GeminiSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Credentials resolved at the first remote action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretConfig {
    pub gemini: Option<GeminiConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
}
