//! Key/value store keeping one JSON document per key.
//!
//! Each key maps to `{dir}/{key}.json`. Writes go through a temporary file,
//! `sync_all` and an atomic rename so a crash never leaves a half-written
//! document behind.

use std::fs::{self, File};
use std::io::{ErrorKind, Write as IoWrite};
use std::path::PathBuf;

use greenthumb_core::{GreenThumbError, Result};

/// File-backed string store.
#[derive(Debug, Clone)]
pub struct JsonKeyValueStore {
    dir: PathBuf,
}

impl JsonKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the document stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(String))`: Raw document contents
    /// - `Ok(None)`: Nothing stored, or the document is blank
    /// - `Err`: The key is invalid or the file could not be read
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GreenThumbError::io(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Replaces the document stored under `key`.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;

        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }

        // Write to temporary file in the same directory
        let tmp_path = self.dir.join(format!(".{}.json.tmp", key));
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(value.as_bytes())?;

        // Ensure data is written to disk
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Deletes the document stored under `key`. Missing keys are not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(GreenThumbError::persistence(format!(
                "Invalid store key: {:?}",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}
