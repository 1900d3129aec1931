use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::core::{MalformedPolicy, NormalizeOptions, StartTimeFormat};
use crate::playback::PlaybackConfig;
use crate::sync::ProjectionMode;

/// Persistent application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Milliseconds between playback ticks
    pub tick_interval_ms: u64,
    /// Day the data set covers; frames the clock and picks the cloud imagery
    pub date: NaiveDate,
    pub time_format: StartTimeFormat,
    pub malformed_policy: MalformedPolicy,
    pub projection: ProjectionMode,
    pub show_clouds: bool,
    /// Start playing as soon as data is loaded
    pub autoplay: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,
            date: NaiveDate::from_ymd_opt(2019, 3, 4).unwrap_or_default(),
            time_format: StartTimeFormat::Text,
            malformed_policy: MalformedPolicy::Skip,
            projection: ProjectionMode::Scene2D,
            show_clouds: false,
            autoplay: true,
        }
    }
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("flashviz").join("settings.json"))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from `path`, falling back to defaults when it is missing or unreadable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path).map(|contents| serde_json::from_str(&contents)) {
            Ok(Ok(settings)) => {
                debug!("Loaded settings from {:?}", path);
                settings
            }
            Ok(Err(e)) => {
                warn!("Ignoring malformed settings {:?}: {}", path, e);
                Self::default()
            }
            Err(e) => {
                warn!("Could not read settings {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save to the default location
    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            self.save_to(&path);
        }
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let result = serde_json::to_string_pretty(self)
            .map_err(std::io::Error::from)
            .and_then(|json| fs::write(path, json));
        if let Err(e) = result {
            warn!("Failed to save settings to {:?}: {}", path, e);
        }
    }

    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            date: self.date,
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            time_format: self.time_format,
            policy: self.malformed_policy,
        }
    }
}
