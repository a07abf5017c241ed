//! Song metadata exchanged with the recognition backend.

use serde::{Deserialize, Serialize};

/// A song as displayed on the song card.
///
/// Value object: it is replaced wholesale whenever a newer result arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Track title.
    pub title: String,
    /// Primary artist(s).
    pub artist: String,
    /// Album artwork URL. Empty when the backend has no artwork.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub album_cover: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Metadata the backend resolved for a registered Spotify track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMeta {
    /// Track title.
    pub title: String,
    /// Primary artist(s).
    pub artist: String,
    /// Album name.
    #[serde(default)]
    pub album: Option<String>,
    /// Album artwork URL.
    #[serde(default)]
    pub album_cover: Option<String>,
    /// Spotify track id.
    #[serde(default)]
    pub spotify_track_id: Option<String>,
    /// Canonical Spotify link.
    #[serde(default)]
    pub spotify_url: Option<String>,
    /// Track length.
    #[serde(default)]
    pub duration_ms: Option<u64>,
    /// Release date as reported by Spotify.
    #[serde(default)]
    pub release_date: Option<String>,
}

impl SongMeta {
    /// The card form of this metadata. Missing artwork becomes an empty
    /// cover, as it does for recognition matches.
    pub fn to_song(&self) -> Song {
        Song {
            title: self.title.clone(),
            artist: self.artist.clone(),
            album_cover: self.album_cover.clone().unwrap_or_default(),
        }
    }
}

/// Response of `POST /add-song`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedSong {
    /// Backend document id of the stored song.
    #[serde(default)]
    pub id: Option<String>,
    /// Resolved track metadata.
    pub meta: SongMeta,
    /// Source the backend fingerprinted.
    #[serde(default)]
    pub youtube_url: Option<String>,
}

/// Request body of `POST /add-song`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AddSongRequest<'a> {
    pub(crate) spotify_url: &'a str,
}

/// Response of `POST /audio/recognize`. An absent `match` means no match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct RecognizeResponse {
    #[serde(default, rename = "match")]
    pub(crate) matched: Option<Song>,
}

/// Error body the backend sends with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    detail: serde_json::Value,
}

impl ErrorBody {
    pub(crate) fn into_detail(self) -> Option<String> {
        match self.detail {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

/// Formats the notice shown after a successful registration.
pub fn uploaded_message(meta: &SongMeta) -> String {
    format!("{} by {} was uploaded.", meta.title, meta.artist)
}

/// Formats the notice shown after a successful recognition.
pub fn match_message(song: &Song) -> String {
    format!("Found {} by {} as a match", song.title, song.artist)
}
