//! Tunecatch Core Library
//!
//! Client side of a song-recognition service: records the microphone with
//! CPAL, packages the recording as WAV, and talks to the backend's
//! `/add-song` and `/audio/recognize` endpoints.
//!
//! # Example
//!
//! ```no_run
//! use tunecatch_core::{
//!     BackendClient, CoreResult, MicrophoneCapturer, NoticeKind, Notifier, SongView,
//!     ViewOptions, parse_base_url,
//! };
//!
//! use std::{thread::sleep, time::Duration};
//!
//! struct Stdout;
//!
//! impl Notifier for Stdout {
//!     fn notify(&self, _kind: NoticeKind, message: &str) {
//!         println!("{message}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let base = parse_base_url("http://localhost:8000")?;
//!     let backend = BackendClient::new(&base, Duration::from_secs(30))?;
//!     let view = SongView::new(
//!         MicrophoneCapturer::with_default_cap(),
//!         backend,
//!         Stdout,
//!         ViewOptions::default(),
//!     );
//!
//!     view.start_listening().await?;
//!     sleep(Duration::from_secs(5));
//!     let outcome = view.stop_listening().await?;
//!
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

mod audio;
mod backend;
mod error;
mod notify;
mod song;
mod view;

pub use {
    audio::{AudioSource, CapturedAudio, MicrophoneCapturer, RECOGNITION_SAMPLE_RATE, WavPayload},
    backend::{ADD_SONG_PATH, BackendClient, RECOGNIZE_PATH, SongBackend, parse_base_url},
    error::{AudioError, BackendError, CoreError, Result as CoreResult},
    notify::{EMPTY_LINK, GENERIC_FAILURE, NO_AUDIO, NoticeKind, Notifier},
    reqwest::Url,
    song::{AddedSong, Song, SongMeta, match_message, uploaded_message},
    view::{
        ListenOutcome, RecordingState, SongView, SubmitOutcome, ViewOptions, ViewSnapshot,
        microphone_notice,
    },
};
