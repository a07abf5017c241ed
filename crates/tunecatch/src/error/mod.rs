use tunecatch_core::CoreError;

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Errors raised by the tray binary. Each carries the call site that
/// produced it.
#[derive(Error, Debug)]
pub enum AppError {
    /// Capture, upload or backend failure bubbled up from the core crate.
    #[error("Core error: {source} {location}")]
    Core {
        /// Core failure.
        #[source]
        source: CoreError,
        /// Call site.
        location: ErrorLocation,
    },

    /// CTRL+SHIFT+Space could not be claimed.
    #[error("Hotkey registration failed: {reason} {location}")]
    HotkeyRegistrationFailed {
        /// What the hotkey manager reported.
        reason: String,
        /// Call site.
        location: ErrorLocation,
    },

    /// The system clipboard could not be opened or read.
    #[error("Clipboard unavailable: {reason} {location}")]
    ClipboardError {
        /// What arboard reported.
        reason: String,
        /// Call site.
        location: ErrorLocation,
    },

    /// The app loop stopped receiving commands.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Which command was dropped.
        message: String,
        /// Call site.
        location: ErrorLocation,
    },

    /// `config.toml` is unreadable or holds an unusable value.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Offending key or I/O step.
        reason: String,
        /// Call site.
        location: ErrorLocation,
    },

    /// Tray icon or menu could not be built or updated.
    #[error("Tray error: {reason} {location}")]
    TrayError {
        /// What tray-icon reported.
        reason: String,
        /// Call site.
        location: ErrorLocation,
    },

    /// Filesystem or runtime setup failure.
    #[error("IO error: {source} {location}")]
    IoError {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Call site.
        location: ErrorLocation,
    },
}

// #[from] cannot fill the location field.
impl From<CoreError> for AppError {
    #[track_caller]
    fn from(source: CoreError) -> Self {
        AppError::Core {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result alias for the binary.
pub type Result<T> = StdResult<T, AppError>;
