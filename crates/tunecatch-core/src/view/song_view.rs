use crate::{
    AddedSong, AudioError, CoreError, CoreResult, Song, WavPayload,
    audio::{AudioSource, CapturedAudio},
    backend::SongBackend,
    notify::{EMPTY_LINK, GENERIC_FAILURE, NO_AUDIO, NoticeKind, Notifier},
    song::{match_message, uploaded_message},
    view::{RecordingState, song_slot::SongSlot},
};

use std::{
    panic::Location,
    path::PathBuf,
    sync::{
        Mutex as StdMutex, MutexGuard,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Instant,
};

use error_location::ErrorLocation;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Behaviour switches for [`SongView`].
#[derive(Debug, Clone)]
pub struct ViewOptions {
    /// Also show a successfully registered song on the song card.
    pub show_added_song: bool,
    /// Downmix and resample uploads to this rate; `None` keeps the device
    /// format.
    pub upload_sample_rate: Option<u32>,
    /// Where to keep the most recent upload for local playback.
    pub last_recording_path: Option<PathBuf>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            show_added_song: false,
            upload_sample_rate: Some(crate::RECOGNITION_SAMPLE_RATE),
            last_recording_path: None,
        }
    }
}

/// Result of [`SongView::submit_link`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Blank input; nothing was sent.
    Invalid,
    /// Another submission is in flight; nothing was sent.
    Busy,
    /// The backend call failed; the generic failure notice was shown.
    Failed,
    /// The backend registered the song.
    Added(AddedSong),
    /// The view was shut down before the response arrived.
    Discarded,
}

/// Result of [`SongView::stop_listening`].
#[derive(Debug, Clone, PartialEq)]
pub enum ListenOutcome {
    /// A match was found and is now the current song.
    Matched(Song),
    /// The backend found nothing; the current song is unchanged.
    NoMatch,
    /// The session captured no audio; nothing was uploaded.
    Empty,
    /// Packaging or the backend call failed; the generic notice was shown.
    Failed,
    /// A newer result had already been applied, so this match was dropped.
    Superseded(Song),
    /// The view was shut down before the response arrived.
    Discarded,
}

/// Point-in-time copy of everything the tray renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewSnapshot {
    /// A recording session is active.
    pub recording: bool,
    /// A link submission is in flight.
    pub submitting: bool,
    /// At least one recognition upload is in flight.
    pub recognizing: bool,
    /// The song card.
    pub song: Option<Song>,
}

struct Capture<S> {
    source: S,
    state: RecordingState,
}

/// View model shared by the link-submission and audio-capture flows.
///
/// Owns the recording state machine, the capture source and the current
/// song slot. Every flow error is logged and turned into a notification
/// here; nothing escapes as a panic or a process exit.
///
/// # Concurrency
///
/// The capture source sits behind an async mutex that also holds the
/// [`RecordingState`], so the double-start check and opening the device
/// happen atomically. Network calls run without holding any lock; the two
/// flows may overlap and only meet at the ticketed song slot.
pub struct SongView<S, B, N> {
    capture: Mutex<Capture<S>>,
    backend: B,
    notifier: N,
    slot: StdMutex<SongSlot>,
    submitting: AtomicBool,
    recognizing: AtomicUsize,
    disposed: AtomicBool,
    options: ViewOptions,
}

impl<S, B, N> SongView<S, B, N>
where
    S: AudioSource,
    B: SongBackend,
    N: Notifier,
{
    /// Creates an idle view with an empty song card.
    pub fn new(source: S, backend: B, notifier: N, options: ViewOptions) -> Self {
        Self {
            capture: Mutex::new(Capture {
                source,
                state: RecordingState::Idle,
            }),
            backend,
            notifier,
            slot: StdMutex::new(SongSlot::default()),
            submitting: AtomicBool::new(false),
            recognizing: AtomicUsize::new(0),
            disposed: AtomicBool::new(false),
            options,
        }
    }

    /// Registers a Spotify track link with the backend.
    ///
    /// Blank input shows a validation notice and sends nothing. While a
    /// submission is in flight further calls return [`SubmitOutcome::Busy`].
    #[instrument(skip(self))]
    pub async fn submit_link(&self, input: &str) -> SubmitOutcome {
        let spotify_url = input.trim();
        if spotify_url.is_empty() {
            warn!("Rejected blank Spotify link");
            self.notifier.notify(NoticeKind::Error, EMPTY_LINK);
            return SubmitOutcome::Invalid;
        }

        if self.is_disposed() {
            return SubmitOutcome::Discarded;
        }

        if self.submitting.swap(true, Ordering::AcqRel) {
            debug!("Submission already in flight");
            return SubmitOutcome::Busy;
        }
        let _submitting = FlagGuard(&self.submitting);

        let ticket = self.options.show_added_song.then(|| self.slot().ticket());

        let result = self.backend.add_song(spotify_url).await;

        if self.is_disposed() {
            debug!("View shut down, dropping add-song response");
            return SubmitOutcome::Discarded;
        }

        match result {
            Err(e) => {
                error!(error = ?e, "Failed to add song");
                self.notifier.notify(NoticeKind::Error, GENERIC_FAILURE);
                SubmitOutcome::Failed
            }
            Ok(added) => {
                self.notifier
                    .notify(NoticeKind::Success, &uploaded_message(&added.meta));

                if let Some(ticket) = ticket
                    && !self.slot().apply(ticket, added.meta.to_song())
                {
                    debug!("Newer song already shown, leaving card unchanged");
                }

                SubmitOutcome::Added(added)
            }
        }
    }

    /// Opens the microphone and starts a new recording session.
    ///
    /// # Errors
    ///
    /// [`AudioError::AlreadyRecording`] if a session is active (the device
    /// is not touched), [`AudioError::ShutDown`] after [`Self::shutdown`],
    /// or the acquisition error, which is also shown as a notice.
    #[instrument(skip(self))]
    pub async fn start_listening(&self) -> CoreResult<Uuid> {
        if self.is_disposed() {
            return Err(AudioError::ShutDown {
                location: ErrorLocation::from(Location::caller()),
            }
            .into());
        }

        let mut capture = self.capture.lock().await;

        // Shutdown may have run while this call waited for the lock.
        if self.is_disposed() {
            return Err(AudioError::ShutDown {
                location: ErrorLocation::from(Location::caller()),
            }
            .into());
        }

        if let RecordingState::Recording { session_id, .. } = capture.state {
            warn!(session_id = %session_id, "Start ignored, already recording");
            return Err(AudioError::AlreadyRecording {
                session_id,
                location: ErrorLocation::from(Location::caller()),
            }
            .into());
        }

        if let Err(e) = capture.source.start() {
            error!(error = ?e, "Failed to acquire microphone");
            self.notifier
                .notify(NoticeKind::Error, &microphone_notice(&e));
            return Err(e);
        }

        let session_id = Uuid::new_v4();
        capture.state = RecordingState::Recording {
            started_at: Instant::now(),
            session_id,
        };

        info!(session_id = %session_id, "Listening");

        Ok(session_id)
    }

    /// Stops the active session, drains its audio and submits it for
    /// recognition.
    ///
    /// The chunk buffer is empty when this returns, whatever the upload
    /// outcome. A session with no audio is not uploaded.
    ///
    /// # Errors
    ///
    /// [`AudioError::NotRecording`] when idle, or the device error if the
    /// capture handle could not be closed cleanly.
    #[instrument(skip(self))]
    pub async fn stop_listening(&self) -> CoreResult<ListenOutcome> {
        let (session_id, started_at, stopped) = {
            let mut capture = self.capture.lock().await;

            let RecordingState::Recording {
                started_at,
                session_id,
            } = capture.state
            else {
                return Err(AudioError::NotRecording {
                    location: ErrorLocation::from(Location::caller()),
                }
                .into());
            };

            capture.state = RecordingState::Idle;
            (session_id, started_at, capture.source.stop())
        };

        let captured = match stopped {
            Ok(captured) => captured,
            Err(e) => {
                error!(session_id = %session_id, error = ?e, "Failed to stop recording");
                self.notifier.notify(NoticeKind::Error, GENERIC_FAILURE);
                return Err(e);
            }
        };

        info!(
            session_id = %session_id,
            duration_ms = started_at.elapsed().as_millis(),
            chunk_count = captured.chunks.len(),
            "Recording stopped"
        );

        if captured.is_empty() {
            warn!(session_id = %session_id, "No audio captured, skipping upload");
            self.notifier.notify(NoticeKind::Info, NO_AUDIO);
            return Ok(ListenOutcome::Empty);
        }

        Ok(self.recognize(session_id, captured).await)
    }

    async fn recognize(&self, session_id: Uuid, captured: CapturedAudio) -> ListenOutcome {
        let _in_flight = CountGuard::new(&self.recognizing);
        let ticket = self.slot().ticket();

        let payload = match WavPayload::from_captured(captured, self.options.upload_sample_rate) {
            Ok(payload) => payload,
            Err(e) => {
                error!(session_id = %session_id, error = ?e, "Failed to package recording");
                self.notifier.notify(NoticeKind::Error, GENERIC_FAILURE);
                return ListenOutcome::Failed;
            }
        };

        self.keep_last_recording(&payload).await;

        let result = self.backend.recognize(payload).await;

        if self.is_disposed() {
            debug!(session_id = %session_id, "View shut down, dropping recognition response");
            return ListenOutcome::Discarded;
        }

        match result {
            Err(e) => {
                error!(session_id = %session_id, error = ?e, "Recognition failed");
                self.notifier.notify(NoticeKind::Error, GENERIC_FAILURE);
                ListenOutcome::Failed
            }
            Ok(None) => {
                info!(session_id = %session_id, "No match for recording");
                ListenOutcome::NoMatch
            }
            Ok(Some(song)) => {
                if !self.slot().apply(ticket, song.clone()) {
                    debug!(session_id = %session_id, "Stale match dropped");
                    return ListenOutcome::Superseded(song);
                }
                self.notifier
                    .notify(NoticeKind::Success, &match_message(&song));
                ListenOutcome::Matched(song)
            }
        }
    }

    async fn keep_last_recording(&self, payload: &WavPayload) {
        let Some(path) = &self.options.last_recording_path else {
            return;
        };
        match tokio::fs::write(path, &payload.bytes).await {
            Ok(()) => debug!(path = ?path, "Saved last recording"),
            Err(e) => warn!(path = ?path, error = ?e, "Failed to save last recording"),
        }
    }

    /// Disposes the view: releases the microphone if a session is active
    /// and makes every in-flight response a no-op. Idempotent.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        let mut capture = self.capture.lock().await;
        if let RecordingState::Recording { session_id, .. } = capture.state {
            capture.state = RecordingState::Idle;
            match capture.source.stop() {
                Ok(discarded) => info!(
                    session_id = %session_id,
                    chunk_count = discarded.chunks.len(),
                    "Microphone released on shutdown"
                ),
                Err(e) => error!(session_id = %session_id, error = ?e, "Failed to release microphone"),
            }
        }

        info!("Song view shut down");
    }

    /// True while a recording session is active.
    pub async fn is_recording(&self) -> bool {
        self.capture.lock().await.state.is_recording()
    }

    /// Current recording state.
    pub async fn recording_state(&self) -> RecordingState {
        self.capture.lock().await.state
    }

    /// Chunks currently buffered by the capture source.
    pub async fn buffered_chunks(&self) -> usize {
        self.capture.lock().await.source.buffered_chunks()
    }

    /// True while a link submission is in flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// The song card, if anything has been shown yet.
    pub fn current_song(&self) -> Option<Song> {
        self.slot().current().cloned()
    }

    /// Everything the tray needs to render.
    pub async fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            recording: self.is_recording().await,
            submitting: self.is_submitting(),
            recognizing: self.recognizing.load(Ordering::Acquire) > 0,
            song: self.current_song(),
        }
    }

    /// The notifier flows report through.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The backend flows call.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn slot(&self) -> MutexGuard<'_, SongSlot> {
        // The slot is only ever replaced wholesale, so a poisoned value is
        // still consistent.
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// User-facing text for a microphone acquisition failure.
pub fn microphone_notice(error: &CoreError) -> String {
    let reason = match error.as_audio() {
        Some(AudioError::NoMicrophoneFound { .. }) => "no input device found".to_string(),
        Some(AudioError::MicrophoneUnavailable { reason, .. })
        | Some(AudioError::DeviceError { reason, .. }) => reason.clone(),
        _ => "unexpected error".to_string(),
    };
    format!("Microphone unavailable: {reason}")
}

/// Clears the flag on drop so a cancelled submission cannot wedge the view.
struct FlagGuard<'a>(&'a AtomicBool);

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct CountGuard<'a>(&'a AtomicUsize);

impl<'a> CountGuard<'a> {
    fn new(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::AcqRel);
        Self(count)
    }
}

impl Drop for CountGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
