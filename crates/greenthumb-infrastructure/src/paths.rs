//! Unified path management for GreenThumb files.
//!
//! The config directory is resolved via `AppPaths` from the version-migrate
//! crate, unless `GREENTHUMB_HOME` points somewhere else.

use std::path::{Path, PathBuf};
use version_migrate::AppPaths;

/// Environment variable overriding the config directory.
pub const HOME_OVERRIDE_VAR: &str = "GREENTHUMB_HOME";

const APP_NAME: &str = "greenthumb";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Path resolution for GreenThumb.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/greenthumb/        # Config directory (AppPaths default)
/// ├── config.toml              # Optional settings ([gemini] table)
/// ├── store/                   # Key/value documents
/// │   └── chat_history.json
/// └── logs/                    # Application logs
///     └── greenthumb.log.YYYY-MM-DD
/// ```
#[derive(Debug, Clone, Default)]
pub struct GreenThumbPaths {
    base: Option<PathBuf>,
}

impl GreenThumbPaths {
    /// Creates a resolver. `base` replaces the platform config directory.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Creates a resolver honouring `GREENTHUMB_HOME` when it is set and non-empty.
    pub fn from_env() -> Self {
        let base = std::env::var_os(HOME_OVERRIDE_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self { base }
    }

    /// Returns the GreenThumb configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/greenthumb/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => AppPaths::new(APP_NAME)
                .config_dir()
                .map_err(|_| PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn store_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("store"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}
