use crate::config::default_max_recording_secs;

use serde::{Deserialize, Serialize};

/// Audio capture configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Longest recording kept per session; audio past this is dropped.
    #[serde(default = "default_max_recording_secs")]
    pub max_recording_secs: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            max_recording_secs: default_max_recording_secs(),
        }
    }
}
