//! Error types for the GreenThumb application.

use thiserror::Error;

/// A shared error type for the entire GreenThumb workspace.
///
/// Every failure that can cross a layer boundary is classified into one of
/// these variants. Use cases decide which ones become user-visible state
/// (an error turn, an analysis message) and which are logged and recovered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GreenThumbError {
    /// Missing credential or malformed configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport or model-side failure reported by the generation service.
    #[error("Remote error{}: {message}", status_suffix(.status_code))]
    Remote {
        status_code: Option<u16>,
        message: String,
    },

    /// The uploaded bytes could not be decoded as an image.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The upload exceeds the accepted size ceiling.
    #[error("Input too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    /// Stored history could not be parsed, migrated or validated.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },
}

impl GreenThumbError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a Remote error without an HTTP status (transport failure).
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            status_code: None,
            message: message.into(),
        }
    }

    /// Creates a Remote error carrying the HTTP status returned by the service.
    pub fn remote_with_status(status_code: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    /// Creates a Decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    pub fn is_too_large(&self) -> bool {
        matches!(self, Self::TooLarge { .. })
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for GreenThumbError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for GreenThumbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Persistence(format!("JSON - {err}"))
    }
}

impl From<toml::de::Error> for GreenThumbError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration(format!("TOML - {err}"))
    }
}

fn status_suffix(status_code: &Option<u16>) -> String {
    status_code
        .map(|code| format!(" ({code})"))
        .unwrap_or_default()
}

/// A type alias for `Result<T, GreenThumbError>`.
pub type Result<T> = std::result::Result<T, GreenThumbError>;
