use crate::{
    AudioError, CoreResult,
    audio::{
        CapturedAudio,
        chunk_buffer::{Append, ChunkBuffer, DEFAULT_MAX_RECORDING_SECS, cap_samples},
        source::AudioSource,
    },
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use cpal::{
    BuildStreamError, DefaultStreamConfigError, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Default-microphone capture backed by cpal.
///
/// The device is acquired in [`AudioSource::start`], not at construction,
/// so a missing or denied microphone surfaces when the user asks to listen.
pub struct MicrophoneCapturer {
    stream: Option<Stream>,
    config: Option<StreamConfig>,
    max_recording_secs: u32,
    chunks: Arc<Mutex<ChunkBuffer>>,
    /// Signals the audio callback to stop appending. Set to `true` before
    /// dropping the stream so no in-flight callback writes after `stop()`
    /// drains the buffer.
    shutdown: Arc<AtomicBool>,
}

impl MicrophoneCapturer {
    /// Creates a capturer that keeps at most `max_recording_secs` seconds
    /// per session. The cap is converted to samples once the device format
    /// is known.
    pub fn new(max_recording_secs: u32) -> Self {
        Self {
            stream: None,
            config: None,
            max_recording_secs,
            chunks: Arc::new(Mutex::new(ChunkBuffer::new(0))),
            shutdown: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Creates a capturer with the default five minute cap.
    pub fn with_default_cap() -> Self {
        Self::new(DEFAULT_MAX_RECORDING_SECS)
    }

    #[track_caller]
    fn lock_chunks(&self) -> CoreResult<std::sync::MutexGuard<'_, ChunkBuffer>> {
        self.chunks.lock().map_err(|e| {
            AudioError::DeviceError {
                reason: format!("Failed to lock chunk buffer: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
            .into()
        })
    }

    #[track_caller]
    fn open_stream(&self) -> CoreResult<(Stream, StreamConfig)> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or(AudioError::NoMicrophoneFound {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let supported = device.default_input_config().map_err(|e| match e {
            DefaultStreamConfigError::DeviceNotAvailable => AudioError::MicrophoneUnavailable {
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            },
            other => AudioError::DeviceError {
                reason: format!("Failed to get config: {}", other),
                location: ErrorLocation::from(Location::caller()),
            },
        })?;

        let config: StreamConfig = supported.into();

        let chunks = Arc::clone(&self.chunks);
        let shutdown = Arc::clone(&self.shutdown);
        let mut cap_logged = false;

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    // A poisoned mutex still holds valid chunks; keep appending.
                    let mut buf = chunks.lock().unwrap_or_else(|e| {
                        error!("Chunk buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    if buf.push(data) == Append::CapReached && !cap_logged {
                        cap_logged = true;
                        warn!(
                            sample_count = buf.sample_count(),
                            "Recording cap reached, further audio discarded"
                        );
                    }
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| match e {
                BuildStreamError::DeviceNotAvailable => AudioError::MicrophoneUnavailable {
                    reason: e.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                },
                other => AudioError::DeviceError {
                    reason: format!("Failed to build stream: {}", other),
                    location: ErrorLocation::from(Location::caller()),
                },
            })?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate,
            channels = config.channels,
            "Microphone acquired"
        );

        Ok((stream, config))
    }
}

impl AudioSource for MicrophoneCapturer {
    #[track_caller]
    #[instrument(skip(self))]
    fn start(&mut self) -> CoreResult<()> {
        if self.stream.is_some() {
            return Err(AudioError::DeviceError {
                reason: "Capture stream already open".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
            .into());
        }

        let (stream, config) = self.open_stream()?;

        // The callback stays muted until the flag below flips, so the cap is
        // in place before the first chunk lands.
        let max_samples = cap_samples(self.max_recording_secs, config.sample_rate, config.channels);
        self.lock_chunks()?.reset(max_samples);
        debug!(
            max_recording_secs = self.max_recording_secs,
            max_samples, "Recording cap sized to device format"
        );

        self.shutdown.store(false, Ordering::Release);

        if let Err(e) = stream.play() {
            self.shutdown.store(true, Ordering::Release);
            return Err(AudioError::MicrophoneUnavailable {
                reason: format!("Failed to start stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
            .into());
        }

        self.stream = Some(stream);
        self.config = Some(config);
        info!("Audio capture started");

        Ok(())
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn stop(&mut self) -> CoreResult<CapturedAudio> {
        // Flag first, then drop the stream. Dropping joins the audio thread
        // on cpal's backends, so every chunk callback has returned before
        // the buffer is drained below.
        self.shutdown.store(true, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Audio capture stopped");
        }

        let chunks = self.lock_chunks()?.drain();

        let (sample_rate, channels) = self
            .config
            .take()
            .map(|c| (c.sample_rate, c.channels))
            .unwrap_or((0, 1));

        let captured = CapturedAudio {
            chunks,
            sample_rate,
            channels,
        };

        debug!(
            chunk_count = captured.chunks.len(),
            sample_count = captured.sample_count(),
            "Drained captured chunks"
        );

        Ok(captured)
    }

    fn buffered_chunks(&self) -> usize {
        self.chunks
            .lock()
            .map(|buf| buf.chunk_count())
            .unwrap_or_else(|e| e.into_inner().chunk_count())
    }
}

impl Drop for MicrophoneCapturer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if self.stream.take().is_some() {
            warn!("MicrophoneCapturer dropped mid-recording, microphone released");
        }
    }
}
