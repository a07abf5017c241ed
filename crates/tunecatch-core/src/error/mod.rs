use std::panic::Location;

use error_location::ErrorLocation;
use reqwest::StatusCode;
use thiserror::Error;

/// Microphone capture and payload packaging errors.
#[derive(Error, Debug)]
pub enum AudioError {
    /// The host exposes no default input device.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The input device exists but could not be opened (permission denied,
    /// unplugged, or held exclusively by another process).
    #[error("Microphone unavailable: {reason} {location}")]
    MicrophoneUnavailable {
        /// Description reported by the audio backend.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A recording session is already active.
    #[error("Already recording (session {session_id}) {location}")]
    AlreadyRecording {
        /// Session that currently owns the microphone.
        session_id: uuid::Uuid,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Stop was requested while no session is active.
    #[error("Not recording {location}")]
    NotRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The view that owns the microphone has been shut down.
    #[error("Listening is shut down {location}")]
    ShutDown {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// WAV encoding failed.
    #[error("WAV encoding failed: {source} {location}")]
    WavEncoding {
        /// Underlying error from hound.
        #[source]
        source: hound::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl AudioError {
    /// Whether this error came from acquiring the microphone, as opposed to
    /// a misuse of the session state machine or a packaging failure.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            AudioError::NoMicrophoneFound { .. }
                | AudioError::MicrophoneUnavailable { .. }
                | AudioError::DeviceError { .. }
        )
    }
}

/// Errors talking to the recognition backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The configured base URL is missing, malformed or not http(s).
    #[error("Invalid backend URL {url:?}: {reason} {location}")]
    InvalidBaseUrl {
        /// The rejected value.
        url: String,
        /// Why it was rejected.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {source} {location}")]
    ClientBuild {
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Connection, timeout or body transfer failure.
    #[error("Request to {endpoint} failed: {source} {location}")]
    Transport {
        /// Endpoint path that was called.
        endpoint: &'static str,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The backend answered outside the 2xx range.
    #[error("{endpoint} returned {status}: {} {location}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        /// Endpoint path that was called.
        endpoint: &'static str,
        /// HTTP status returned.
        status: StatusCode,
        /// The backend's `detail` message, when the body carried one.
        detail: Option<String>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The request body could not be built.
    #[error("Could not build request for {endpoint}: {source} {location}")]
    Encode {
        /// Endpoint path that was called.
        endpoint: &'static str,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The 2xx response body did not match the expected shape.
    #[error("Malformed response from {endpoint}: {source} {location}")]
    Decode {
        /// Endpoint path that was called.
        endpoint: &'static str,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Any error raised by the core library.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Capture or packaging error.
    #[error("Audio error: {source} {location}")]
    Audio {
        /// The underlying audio error.
        #[source]
        source: AudioError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Backend communication error.
    #[error("Backend error: {source} {location}")]
    Backend {
        /// The underlying backend error.
        #[source]
        source: BackendError,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

impl CoreError {
    /// The audio error, if this is one.
    pub fn as_audio(&self) -> Option<&AudioError> {
        match self {
            CoreError::Audio { source, .. } => Some(source),
            CoreError::Backend { .. } => None,
        }
    }

    /// The backend error, if this is one.
    pub fn as_backend(&self) -> Option<&BackendError> {
        match self {
            CoreError::Backend { source, .. } => Some(source),
            CoreError::Audio { .. } => None,
        }
    }
}

// Manual From impls with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<AudioError> for CoreError {
    #[track_caller]
    fn from(source: AudioError) -> Self {
        CoreError::Audio {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<BackendError> for CoreError {
    #[track_caller]
    fn from(source: BackendError) -> Self {
        CoreError::Backend {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
