//! Compression settings and their on-disk persistence.
//!
//! [`BatchSettings`] is the immutable snapshot of user-chosen parameters for
//! one batch. [`SettingsStore`] is the keyed persistence collaborator: a TOML
//! file read at startup and written (or cleared) on save, gated by the
//! `keep_settings` flag — when the flag is off, saving *clears* any persisted
//! record instead of updating it, so nothing sticks around that the user did
//! not ask to keep.

use crate::codec::{EncodeOptions, FillColor, Quality};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings serialization failed: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// User-chosen compression parameters for one batch.
///
/// `quality` 0 means "unset": the encoder falls back to its stock default
/// of 75. `max_width`/`max_height` 0 mean "unconstrained" on that axis; both
/// zero means no resize, but every input is still re-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    pub quality: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub prefix: String,
    pub suffix: String,
    pub fill_color: FillColor,
    pub keep_settings: bool,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            quality: 85,
            max_width: 0,
            max_height: 0,
            prefix: String::new(),
            suffix: String::new(),
            fill_color: FillColor::Black,
            keep_settings: false,
        }
    }
}

impl BatchSettings {
    /// Encoder options for this batch: defaults plus the effective quality.
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions::with_quality(Quality::from_setting(self.quality))
    }
}

/// TOML-file-backed settings store.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read whatever is persisted. A missing or unreadable file yields the
    /// defaults — the store never fails a read.
    pub fn read(&self) -> BatchSettings {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| toml::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Settings to start a session with: the persisted record is applied only
    /// when it was saved with `keep_settings`; otherwise defaults.
    pub fn load(&self) -> BatchSettings {
        let stored = self.read();
        if stored.keep_settings {
            stored
        } else {
            BatchSettings::default()
        }
    }

    /// Write the record unconditionally.
    pub fn write(&self, settings: &BatchSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(settings)?)?;
        Ok(())
    }

    /// Remove the persisted record. Missing file is fine.
    pub fn clear(&self) -> Result<(), SettingsError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Save honoring the keep flag: write when `keep_settings` is set, clear
    /// the store otherwise.
    pub fn persist(&self, settings: &BatchSettings) -> Result<(), SettingsError> {
        if settings.keep_settings {
            self.write(settings)
        } else {
            self.clear()
        }
    }
}
