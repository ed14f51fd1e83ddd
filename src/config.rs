//! Save system configuration
//!
//! Loaded from JSON; every field is optional and falls back to its default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::SaveError;
use crate::autosave::DEFAULT_AUTOSAVE_INTERVAL;

/// Default canonical save key
pub const DEFAULT_SAVE_KEY: &str = "SAVE_DATA";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Store key of the canonical global record
    pub save_key: String,
    /// Seconds between autosave attempts
    pub autosave_interval: f64,
    /// Prefs file used by the native file store
    pub store_path: Option<PathBuf>,
    /// LocalStorage item used by the web store
    pub local_storage_key: String,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            save_key: DEFAULT_SAVE_KEY.to_string(),
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
            store_path: None,
            local_storage_key: "savekit_prefs".to_string(),
        }
    }
}

impl SaveConfig {
    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Config with a different canonical save key
    pub fn with_save_key(mut self, key: impl Into<String>) -> Self {
        self.save_key = key.into();
        self
    }

    pub fn with_autosave_interval(mut self, seconds: f64) -> Self {
        self.autosave_interval = seconds;
        self
    }
}
