//! `config.toml` under the platform config dir: load, validate once at
//! startup, save atomically.

use crate::{
    AppError, AppResult,
    config::{AudioConfig, BACKEND_URL_ENV, BackendConfig, BehaviourConfig, LAST_RECORDING_FILE},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use tunecatch_core::{Url, parse_base_url};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Backend location and request timeout.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Audio capture settings.
    #[serde(default)]
    pub audio: AudioConfig,
    /// Application behavior settings.
    #[serde(default)]
    pub behavior: BehaviourConfig,
}

impl Config {
    /// Load configuration from disk, creating default if not found.
    ///
    /// Does not validate; call [`Self::validate`] once before wiring up the
    /// backend client.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)
                .map_err(|e| config_error(format!("Failed to read config: {e}")))?;

            let config = Self::from_toml(&contents)?;

            info!(config_path = ?config_path, "Configuration loaded");

            Ok(config)
        } else {
            info!("No config found, creating default");
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Parse configuration from TOML text. Missing sections and keys take
    /// their defaults.
    #[track_caller]
    pub fn from_toml(contents: &str) -> AppResult<Self> {
        toml::from_str(contents).map_err(|e| config_error(format!("Failed to parse config: {e}")))
    }

    /// Validate the configuration and resolve the backend base URL.
    ///
    /// `TUNECATCH_BACKEND_URL` overrides `backend.base_url` when set.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate(&self) -> AppResult<Url> {
        self.validate_with(std::env::var(BACKEND_URL_ENV).ok())
    }

    /// [`Self::validate`] with the environment override passed in.
    #[track_caller]
    pub fn validate_with(&self, env_base_url: Option<String>) -> AppResult<Url> {
        if self.backend.timeout_secs == 0 {
            return Err(config_error("backend.timeout_secs must be greater than zero".into()));
        }
        if self.audio.max_recording_secs == 0 {
            return Err(config_error("audio.max_recording_secs must be greater than zero".into()));
        }

        let raw = self.resolve_base_url(env_base_url);
        let url = parse_base_url(&raw)
            .map_err(|e| config_error(format!("Invalid backend base URL {raw:?}: {e}")))?;

        info!(base_url = %url, "Backend configured");

        Ok(url)
    }

    /// The base URL in effect: a non-blank override wins over the file.
    pub fn resolve_base_url(&self, env_base_url: Option<String>) -> String {
        match env_base_url {
            Some(url) if !url.trim().is_empty() => {
                debug!(env = BACKEND_URL_ENV, "Backend URL overridden by environment");
                url
            }
            _ => self.backend.base_url.clone(),
        }
    }

    /// Where the most recent upload is kept, or `None` when disabled.
    /// Creates the data directory on first use.
    #[track_caller]
    pub fn last_recording_path(&self) -> AppResult<Option<PathBuf>> {
        if !self.behavior.save_last_recording {
            return Ok(None);
        }

        let proj_dirs = Self::project_dirs()?;
        let data_dir = proj_dirs.data_dir();

        if !data_dir.exists() {
            fs::create_dir_all(data_dir)?;
            debug!(data_dir = ?data_dir, "Created data directory");
        }

        Ok(Some(data_dir.join(LAST_RECORDING_FILE)))
    }

    /// Save configuration to the platform config file.
    #[track_caller]
    #[instrument]
    pub fn save(&self) -> AppResult<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Write to a sibling temp file, sync, then rename over the target so a
    /// crash mid-write leaves the old file intact.
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| config_error(format!("Failed to serialize config: {e}")))?;

        let temp_path = config_path.with_extension("toml.tmp");
        let write_temp = || -> std::io::Result<()> {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()
        };
        write_temp().map_err(|e| {
            config_error(format!("Failed to write {}: {e}", temp_path.display()))
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| {
            config_error(format!("Failed to replace {}: {e}", config_path.display()))
        })?;

        info!(config_path = ?config_path, "Configuration saved");

        Ok(())
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "tunecatch", "Tunecatch")
            .ok_or_else(|| config_error("No home directory to place config under".into()))
    }
}

#[track_caller]
fn config_error(reason: String) -> AppError {
    AppError::ConfigError {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}
