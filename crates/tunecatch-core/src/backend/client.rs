use crate::{
    AddedSong, BackendError, CoreResult, Song, WavPayload,
    backend::SongBackend,
    song::{AddSongRequest, ErrorBody, RecognizeResponse},
};

use std::{future::Future, panic::Location, time::Duration};

use error_location::ErrorLocation;
use reqwest::{
    Client, Response, Url,
    multipart::{Form, Part},
};
use tracing::{debug, error, info, instrument};

/// Path of the song registration endpoint, relative to the base URL.
pub const ADD_SONG_PATH: &str = "add-song";
/// Path of the recognition endpoint, relative to the base URL.
pub const RECOGNIZE_PATH: &str = "audio/recognize";

const UPLOAD_FIELD: &str = "file";
const UPLOAD_FILE_NAME: &str = "audio.wav";
const UPLOAD_MIME: &str = "audio/wav";

/// Validates the configured backend base URL.
///
/// Accepts absolute `http`/`https` URLs only. Surrounding whitespace is
/// ignored.
#[track_caller]
pub fn parse_base_url(raw: &str) -> CoreResult<Url> {
    let trimmed = raw.trim();
    let invalid = |reason: String| BackendError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
        location: ErrorLocation::from(Location::caller()),
    };

    if trimmed.is_empty() {
        return Err(invalid("backend URL is not configured".to_string()).into());
    }

    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {other:?}")).into()),
    }

    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()).into());
    }

    Ok(url)
}

/// HTTP client for the `/add-song` and `/audio/recognize` endpoints.
///
/// Endpoint URLs are resolved once, at construction.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    add_song_url: Url,
    recognize_url: Url,
}

impl BackendClient {
    /// Creates a client for `base_url` with a per-request timeout.
    #[track_caller]
    #[instrument]
    pub fn new(base_url: &Url, timeout: Duration) -> CoreResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| BackendError::ClientBuild {
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;

        let add_song_url = endpoint(base_url, ADD_SONG_PATH)?;
        let recognize_url = endpoint(base_url, RECOGNIZE_PATH)?;

        info!(
            add_song = %add_song_url,
            recognize = %recognize_url,
            timeout_secs = timeout.as_secs(),
            "Backend client ready"
        );

        Ok(Self {
            http,
            add_song_url,
            recognize_url,
        })
    }

    /// Resolved `/add-song` URL.
    pub fn add_song_url(&self) -> &Url {
        &self.add_song_url
    }

    /// Resolved `/audio/recognize` URL.
    pub fn recognize_url(&self) -> &Url {
        &self.recognize_url
    }
}

impl SongBackend for BackendClient {
    fn add_song(&self, spotify_url: &str) -> impl Future<Output = CoreResult<AddedSong>> + Send {
        async move {
            debug!(spotify_url, "Posting add-song request");

            let response = self
                .http
                .post(self.add_song_url.clone())
                .json(&AddSongRequest { spotify_url })
                .send()
                .await
                .map_err(|source| transport(ADD_SONG_PATH, source))?;

            let response =
                ensure_success(ADD_SONG_PATH, response, ErrorLocation::from(Location::caller()))
                    .await?;

            let added: AddedSong = response
                .json()
                .await
                .map_err(|source| decode(ADD_SONG_PATH, source))?;

            info!(
                id = added.id.as_deref().unwrap_or("-"),
                youtube_url = added.youtube_url.as_deref().unwrap_or("-"),
                title = %added.meta.title,
                artist = %added.meta.artist,
                "Song registered"
            );

            Ok(added)
        }
    }

    fn recognize(&self, payload: WavPayload) -> impl Future<Output = CoreResult<Option<Song>>> + Send {
        async move {
            let byte_len = payload.bytes.len();

            let part = Part::bytes(payload.bytes)
                .file_name(UPLOAD_FILE_NAME)
                .mime_str(UPLOAD_MIME)
                .map_err(|source| encode(RECOGNIZE_PATH, source))?;
            let form = Form::new().part(UPLOAD_FIELD, part);

            debug!(byte_len, "Uploading recording for recognition");

            let response = self
                .http
                .post(self.recognize_url.clone())
                .multipart(form)
                .send()
                .await
                .map_err(|source| transport(RECOGNIZE_PATH, source))?;

            let response =
                ensure_success(RECOGNIZE_PATH, response, ErrorLocation::from(Location::caller()))
                    .await?;

            let body: RecognizeResponse = response
                .json()
                .await
                .map_err(|source| decode(RECOGNIZE_PATH, source))?;

            match &body.matched {
                Some(song) => info!(title = %song.title, artist = %song.artist, "Match found"),
                None => info!("No match"),
            }

            Ok(body.matched)
        }
    }
}

/// Joins `path` under `base`, treating the base path as a directory so a
/// base like `https://host/api` keeps its `api` segment.
#[track_caller]
fn endpoint(base: &Url, path: &str) -> CoreResult<Url> {
    let mut dir = base.clone();
    if !dir.path().ends_with('/') {
        let with_slash = format!("{}/", dir.path());
        dir.set_path(&with_slash);
    }
    dir.set_query(None);
    dir.set_fragment(None);

    dir.join(path).map_err(|e| {
        BackendError::InvalidBaseUrl {
            url: base.to_string(),
            reason: format!("cannot join {path:?}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        }
        .into()
    })
}

/// Passes 2xx responses through; anything else becomes a `Status` error
/// pinned to `location`, the call site awaiting the request.
pub(crate) async fn ensure_success(
    endpoint: &'static str,
    response: Response,
    location: ErrorLocation,
) -> CoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(ErrorBody::into_detail);

    error!(endpoint, %status, detail = detail.as_deref().unwrap_or("-"), "Backend rejected request");

    Err(BackendError::Status {
        endpoint,
        status,
        detail,
        location,
    }
    .into())
}

#[track_caller]
fn transport(endpoint: &'static str, source: reqwest::Error) -> BackendError {
    BackendError::Transport {
        endpoint,
        source,
        location: ErrorLocation::from(Location::caller()),
    }
}

#[track_caller]
fn encode(endpoint: &'static str, source: reqwest::Error) -> BackendError {
    BackendError::Encode {
        endpoint,
        source,
        location: ErrorLocation::from(Location::caller()),
    }
}

#[track_caller]
fn decode(endpoint: &'static str, source: reqwest::Error) -> BackendError {
    BackendError::Decode {
        endpoint,
        source,
        location: ErrorLocation::from(Location::caller()),
    }
}
