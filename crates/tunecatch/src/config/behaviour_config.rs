use crate::config::{DEFAULT_SHOW_ADDED_SONG, default_save_last_recording};

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Show a registered song on the song card, not only in a notification.
    #[serde(default)]
    pub show_added_song: bool,

    /// Keep the most recent upload as `last_recording.wav` in the data dir.
    #[serde(default = "default_save_last_recording")]
    pub save_last_recording: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            show_added_song: DEFAULT_SHOW_ADDED_SONG,
            save_last_recording: default_save_last_recording(),
        }
    }
}
