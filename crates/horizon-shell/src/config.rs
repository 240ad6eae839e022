//! Shell configuration.
//!
//! Every knob has a default, so an empty document is a valid configuration.
//!
//! ```
//! use horizon_shell::ShellConfig;
//!
//! let config = ShellConfig::from_toml_str(r#"
//!     settle_delay_ms = 1000
//!     auto_open_enabled = false
//! "#).unwrap();
//!
//! assert_eq!(config.settle_delay_ms, 1000);
//! assert_eq!(config.main_window_url, "main.html");
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellError};
use crate::window::{GEOMETRY_KEY_PREFIX, SHIFT_DISTANCE};

/// Default quiet period before an idle process terminates, in milliseconds.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 5000;

/// Tunable behavior of a [`Shell`](crate::Shell).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// How long the process must stay idle before it terminates.
    pub settle_delay_ms: u64,
    /// Distance a new window is shifted when it would cover a sibling.
    pub shift_distance: i32,
    /// Content URL of main windows.
    pub main_window_url: String,
    /// Prefix of main-window ids; the window number follows it.
    pub window_id_prefix: String,
    /// Namespace of persisted geometry records.
    pub geometry_key_prefix: String,
    pub audio_player_url: String,
    pub audio_player_icon: String,
    pub video_player_url: String,
    /// Whether the "auto-open" task may open windows.
    pub auto_open_enabled: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            shift_distance: SHIFT_DISTANCE,
            main_window_url: "main.html".to_owned(),
            window_id_prefix: "files#".to_owned(),
            geometry_key_prefix: GEOMETRY_KEY_PREFIX.to_owned(),
            audio_player_url: "audio_player.html".to_owned(),
            audio_player_icon: "audio_player/icons/audio-player-64.png".to_owned(),
            video_player_url: "video_player.html".to_owned(),
            auto_open_enabled: true,
        }
    }
}

impl ShellConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Parse a JSON document. Missing keys take their defaults.
    pub fn from_json_str(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(ShellError::ConfigJson)
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_shift_distance(mut self, shift: i32) -> Self {
        self.shift_distance = shift;
        self
    }

    pub fn with_main_window_url(mut self, url: impl Into<String>) -> Self {
        self.main_window_url = url.into();
        self
    }

    pub fn with_window_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.window_id_prefix = prefix.into();
        self
    }

    pub fn with_auto_open(mut self, enabled: bool) -> Self {
        self.auto_open_enabled = enabled;
        self
    }

    /// The settle delay as a duration.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Persistence key of the geometry record for a content URL.
    pub fn geometry_key(&self, url: &str) -> String {
        format!("{}:{url}", self.geometry_key_prefix)
    }

    /// Id of main window number `number`.
    pub fn main_window_id(&self, number: u32) -> String {
        format!("{}{number}", self.window_id_prefix)
    }
}
