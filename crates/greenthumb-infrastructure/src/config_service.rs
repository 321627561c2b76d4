//! Configuration service implementation.
//!
//! Loads the optional `config.toml` from the GreenThumb config directory.
//! A missing file yields defaults; a malformed one is a configuration error.

use std::path::{Path, PathBuf};

use tracing::debug;

use greenthumb_core::config::AppConfig;
use greenthumb_core::{GreenThumbError, Result};

use crate::paths::GreenThumbPaths;

/// Reads [`AppConfig`] from a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigService {
    config_path: PathBuf,
}

impl ConfigService {
    /// Creates a service reading `config.toml` under the resolved config directory.
    pub fn new(paths: &GreenThumbPaths) -> Result<Self> {
        let config_path = paths
            .config_file()
            .map_err(|e| GreenThumbError::configuration(e.to_string()))?;
        Ok(Self { config_path })
    }

    /// Creates a service reading an explicit file (for testing).
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Loads the configuration.
    ///
    /// # Returns
    ///
    /// - `Ok(AppConfig)`: Parsed file, or defaults when the file is absent
    /// - `Err(GreenThumbError::Configuration)`: The file exists but is not valid TOML
    pub fn load(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
