//! Application settings and configuration

use crate::{safety::DEFAULT_REMOTE_TIMEOUT, Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application settings
///
/// Persistent configuration for CampusTrade. Stored as JSON; a missing or
/// empty file yields the defaults. The model API key is deliberately not part
/// of the file, see [`crate::classifier::api_key_from_env`].
///
/// # Example
/// ```rust,no_run
/// use campustrade::storage::Settings;
///
/// let mut settings = Settings::load("settings.json").expect("Failed to load");
/// settings.remote_screening_enabled = false;
/// settings.save("settings.json").expect("Failed to save");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root URL of the text model API
    pub classifier_base_url: String,
    /// Model used for moderation and listing descriptions
    pub classifier_model: String,
    /// Upper bound on one remote classification call, in milliseconds
    pub classifier_timeout_ms: u64,
    /// Run the remote screening stage when a model is available
    pub remote_screening_enabled: bool,
    /// Pause between simulated verification steps, in milliseconds
    pub verification_step_delay_ms: u64,
    /// Where the application state snapshot is written
    pub state_path: String,
}

impl Settings {
    /// Load settings from a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to the settings file
    ///
    /// # Returns
    /// The loaded settings, or default settings if file doesn't exist
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::Storage(format!("Failed to read settings: {}", e)))?;

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&data)
            .map_err(|e| Error::Storage(format!("Failed to parse settings: {}", e)))
    }

    /// Save settings to a JSON file, creating parent directories
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Storage(format!("Failed to create settings directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Storage(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(path, json)
            .map_err(|e| Error::Storage(format!("Failed to write settings: {}", e)))?;

        Ok(())
    }

    /// Remote classification timeout
    ///
    /// Zero is treated as unset and yields [`DEFAULT_REMOTE_TIMEOUT`].
    pub fn classifier_timeout(&self) -> Duration {
        match self.classifier_timeout_ms {
            0 => DEFAULT_REMOTE_TIMEOUT,
            ms => Duration::from_millis(ms),
        }
    }

    /// Pause between simulated verification steps
    pub fn verification_step_delay(&self) -> Duration {
        Duration::from_millis(self.verification_step_delay_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            classifier_base_url: "https://generativelanguage.googleapis.com".to_string(),
            classifier_model: "gemini-2.5-flash".to_string(),
            classifier_timeout_ms: 8_000,
            remote_screening_enabled: true,
            verification_step_delay_ms: 2_000,
            state_path: "./data/campustrade_state.json".to_string(),
        }
    }
}
