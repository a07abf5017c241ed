//! The recognition backend as seen by the client.

pub(crate) mod client;

pub use client::{ADD_SONG_PATH, BackendClient, RECOGNIZE_PATH, parse_base_url};

use crate::{AddedSong, CoreResult, Song, WavPayload};

use std::future::Future;

/// Operations the client needs from the backend.
///
/// [`BackendClient`] talks HTTP; tests substitute scripted fakes.
pub trait SongBackend: Send + Sync {
    /// Registers a Spotify track link. `spotify_url` is already trimmed and
    /// non-empty.
    fn add_song(&self, spotify_url: &str) -> impl Future<Output = CoreResult<AddedSong>> + Send;

    /// Submits a recording for fingerprint matching. `Ok(None)` means the
    /// backend found no match.
    fn recognize(&self, payload: WavPayload) -> impl Future<Output = CoreResult<Option<Song>>> + Send;
}
