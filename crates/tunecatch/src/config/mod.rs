mod audio_config;
mod backend_config;
mod behaviour_config;
#[allow(clippy::module_inception)]
mod config;

pub(crate) use {
    audio_config::AudioConfig, backend_config::BackendConfig, behaviour_config::BehaviourConfig,
    config::Config,
};

pub(crate) const BACKEND_URL_ENV: &str = "TUNECATCH_BACKEND_URL";
pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_MAX_RECORDING_SECS: u32 = 300;
pub(crate) const DEFAULT_SHOW_ADDED_SONG: bool = false;
pub(crate) const DEFAULT_SAVE_LAST_RECORDING: bool = true;
pub(crate) const LAST_RECORDING_FILE: &str = "last_recording.wav";

pub(crate) fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub(crate) fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

pub(crate) fn default_max_recording_secs() -> u32 {
    DEFAULT_MAX_RECORDING_SECS
}

pub(crate) fn default_save_last_recording() -> bool {
    DEFAULT_SAVE_LAST_RECORDING
}
