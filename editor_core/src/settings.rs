//! Editor settings and their JSON persistence.

use crate::syntax::ThemeKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Default autosave interval (30 seconds).
pub const DEFAULT_AUTO_SAVE_INTERVAL_MS: u64 = 30_000;

/// Per-document editor settings.
///
/// Missing fields in a settings file take their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Re-render the preview on every content change.
    pub is_live_preview: bool,
    /// Editor font size in pixels.
    pub font_size: u32,
    pub font_family: String,
    pub theme: ThemeKind,
    pub auto_save: bool,
    pub auto_save_interval_ms: u64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            is_live_preview: true,
            font_size: 16,
            font_family: "system-ui".to_string(),
            theme: ThemeKind::Github,
            auto_save: true,
            auto_save_interval_ms: DEFAULT_AUTO_SAVE_INTERVAL_MS,
        }
    }
}

impl EditorSettings {
    /// Returns the autosave interval as a duration.
    pub fn auto_save_interval(&self) -> Duration {
        Duration::from_millis(self.auto_save_interval_ms)
    }

    /// Parses settings from JSON.
    pub fn from_json(json: &str) -> io::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes settings to pretty-printed JSON.
    pub fn to_json(&self) -> io::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Saves settings to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, self.to_json()?)
    }
}
