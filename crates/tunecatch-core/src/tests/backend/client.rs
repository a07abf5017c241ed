use crate::{
    ADD_SONG_PATH, BackendClient, BackendError, SongBackend, WavPayload,
    backend::client::ensure_success, parse_base_url, tests::support::song,
};

use std::{
    panic::Location,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use error_location::ErrorLocation;
use reqwest::{Response, Url};
use serde_json::{Value, json};

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Default)]
struct Upload {
    field: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone, Default)]
struct Seen {
    add_bodies: Arc<Mutex<Vec<Value>>>,
    uploads: Arc<Mutex<Vec<Upload>>>,
}

#[allow(clippy::unwrap_used)]
async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Url::parse(&format!("http://{addr}")).unwrap()
}

async fn add_song_ok(State(seen): State<Seen>, Json(body): Json<Value>) -> impl IntoResponse {
    seen.add_bodies
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .push(body);
    Json(json!({
        "id": "66b1f0c2a1",
        "meta": {
            "spotify_track_id": "abc123",
            "title": "X",
            "artist": "Y",
            "album": "Z",
            "release_date": "2020-01-01",
            "duration_ms": 215000,
            "spotify_url": "https://open.spotify.com/track/abc123",
            "album_cover": "https://i.scdn.co/image/cover"
        },
        "youtube_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
    }))
}

#[allow(clippy::unwrap_used)]
async fn recognize_match(State(seen): State<Seen>, mut multipart: Multipart) -> impl IntoResponse {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let upload = Upload {
            field: field.name().map(str::to_owned),
            file_name: field.file_name().map(str::to_owned),
            content_type: field.content_type().map(str::to_owned),
            bytes: field.bytes().await.unwrap().to_vec(),
        };
        seen.uploads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(upload);
    }
    Json(json!({ "match": { "title": "A", "artist": "B", "album_cover": "u" } }))
}

fn router(seen: Seen) -> Router {
    Router::new()
        .route("/add-song", post(add_song_ok))
        .route("/audio/recognize", post(recognize_match))
        .with_state(seen)
}

#[allow(clippy::unwrap_used)]
fn client(base: &Url) -> BackendClient {
    BackendClient::new(base, TIMEOUT).unwrap()
}

#[allow(clippy::unwrap_used)]
fn tiny_payload() -> WavPayload {
    WavPayload::encode(&[0.1; 160], 16_000, 1).unwrap()
}

/// WHAT: add-song posts `{spotify_url}` as JSON and decodes the metadata
/// WHY: This is the backend's registration contract
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_backend_when_adding_song_then_json_body_and_meta_round_trip() {
    // Given: A backend that records request bodies
    let seen = Seen::default();
    let base = serve(router(seen.clone())).await;

    // When: Adding a song
    let added = client(&base)
        .add_song("https://open.spotify.com/track/abc123")
        .await
        .unwrap();

    // Then: Exactly one body with the link, and the metadata decoded
    let bodies = seen.add_bodies.lock().unwrap().clone();
    assert_eq!(bodies, vec![json!({ "spotify_url": "https://open.spotify.com/track/abc123" })]);
    assert_eq!(added.meta.title, "X");
    assert_eq!(added.meta.artist, "Y");
    assert_eq!(added.meta.album.as_deref(), Some("Z"));
    assert_eq!(added.id.as_deref(), Some("66b1f0c2a1"));
    assert!(added.youtube_url.is_some());
}

/// WHAT: recognize uploads one multipart `file` field named audio.wav
/// WHY: The backend reads `UploadFile` from the `file` field
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_backend_when_recognizing_then_multipart_file_field_sent() {
    // Given: A backend that records uploads
    let seen = Seen::default();
    let base = serve(router(seen.clone())).await;
    let payload = tiny_payload();
    let expected_bytes = payload.bytes.clone();

    // When: Recognizing
    let matched = client(&base).recognize(payload).await.unwrap();

    // Then: One upload with the right field, name, type and bytes
    let uploads = seen.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].field.as_deref(), Some("file"));
    assert_eq!(uploads[0].file_name.as_deref(), Some("audio.wav"));
    assert_eq!(uploads[0].content_type.as_deref(), Some("audio/wav"));
    assert_eq!(uploads[0].bytes, expected_bytes);
    assert_eq!(matched, Some(song("A", "B", "u")));
}

/// WHAT: A body without `match` decodes as no match
/// WHY: Absent match is a normal empty result, not an error
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_empty_body_when_recognizing_then_none() {
    let app = Router::new().route("/audio/recognize", post(|| async { Json(json!({})) }));
    let base = serve(app).await;

    let matched = client(&base).recognize(tiny_payload()).await.unwrap();

    assert_eq!(matched, None);
}

/// WHAT: A match with null artwork still decodes
/// WHY: The backend stores `album_cover: null` for tracks without images
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_null_album_cover_when_recognizing_then_empty_cover() {
    let app = Router::new().route(
        "/audio/recognize",
        post(|| async {
            Json(json!({ "match": { "title": "A", "artist": "B", "album_cover": null, "album": "Q" } }))
        }),
    );
    let base = serve(app).await;

    let matched = client(&base).recognize(tiny_payload()).await.unwrap();

    assert_eq!(matched, Some(song("A", "B", "")));
}

/// WHAT: Non-2xx statuses map to Status errors carrying the detail
/// WHY: Details are logged; the status drives the generic failure notice
#[tokio::test]
#[allow(clippy::unwrap_used, clippy::panic)]
async fn given_404_with_detail_when_recognizing_then_status_error_with_detail() {
    let app = Router::new().route(
        "/audio/recognize",
        post(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "No match found" })),
            )
        }),
    );
    let base = serve(app).await;

    let err = client(&base).recognize(tiny_payload()).await.unwrap_err();

    match err.as_backend() {
        Some(BackendError::Status { status, detail, .. }) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(detail.as_deref(), Some("No match found"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

/// WHAT: Server errors on add-song surface as Status errors
/// WHY: Bad links and backend faults share one failure path
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_400_when_adding_song_then_status_error() {
    let app = Router::new().route(
        "/add-song",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": "Invalid Spotify track URL/URI" })),
            )
        }),
    );
    let base = serve(app).await;

    let err = client(&base).add_song("not-a-link").await.unwrap_err();

    assert!(matches!(
        err.as_backend(),
        Some(BackendError::Status { detail: Some(d), .. }) if d == "Invalid Spotify track URL/URI"
    ));
}

/// WHAT: A 2xx body of the wrong shape is a Decode error
/// WHY: Missing `meta` must not be mistaken for success
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_malformed_body_when_adding_song_then_decode_error() {
    let app = Router::new().route("/add-song", post(|| async { Json(json!({ "ok": true })) }));
    let base = serve(app).await;

    let err = client(&base).add_song("https://open.spotify.com/track/x").await.unwrap_err();

    assert!(matches!(err.as_backend(), Some(BackendError::Decode { .. })));
}

/// WHAT: Connection refused is a Transport error
/// WHY: "Backend down" goes through the same generic failure path
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_closed_port_when_adding_song_then_transport_error() {
    // Given: A port that was bound and released
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let base = Url::parse(&format!("http://{addr}")).unwrap();

    // When: Calling it
    let err = client(&base).add_song("https://open.spotify.com/track/x").await.unwrap_err();

    // Then: Transport error
    assert!(matches!(err.as_backend(), Some(BackendError::Transport { .. })));
}

/// WHAT: A non-2xx status error points at the awaiting call site
/// WHY: The recorded location must name the request, not the status check
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_error_status_when_checking_then_location_is_callers() {
    // Given: A 502 with a detail body
    let response = Response::from(
        axum::http::Response::builder()
            .status(502)
            .body(r#"{"detail":"upstream down"}"#)
            .unwrap(),
    );
    let here = ErrorLocation::from(Location::caller());

    // When
    let err = ensure_success(ADD_SONG_PATH, response, here).await.unwrap_err();

    // Then
    assert!(matches!(
        err.as_backend(),
        Some(BackendError::Status { status, detail: Some(d), location, .. })
            if status.as_u16() == 502
                && d == "upstream down"
                && location.file == here.file
                && location.line == here.line
    ));
}

/// WHAT: A 2xx response passes through untouched
/// WHY: Only failures are turned into errors
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_success_status_when_checking_then_response_returned() {
    let response = Response::from(axum::http::Response::builder().status(200).body("{}").unwrap());

    let checked = ensure_success(ADD_SONG_PATH, response, ErrorLocation::from(Location::caller()))
        .await
        .unwrap();

    assert_eq!(checked.status().as_u16(), 200);
}

/// WHAT: Endpoints are joined under the base path
/// WHY: A backend mounted at /api must keep its prefix
#[test]
#[allow(clippy::unwrap_used)]
fn given_base_with_path_when_building_client_then_endpoints_nested() {
    let base = parse_base_url("https://songs.example.com/api").unwrap();

    let client = client(&base);

    assert_eq!(client.add_song_url().as_str(), "https://songs.example.com/api/add-song");
    assert_eq!(
        client.recognize_url().as_str(),
        "https://songs.example.com/api/audio/recognize"
    );
}

/// WHAT: Host-only bases resolve to root endpoints
/// WHY: The default backend runs at the server root
#[test]
#[allow(clippy::unwrap_used)]
fn given_host_only_base_when_building_client_then_root_endpoints() {
    let base = parse_base_url(" http://localhost:8000/ ").unwrap();

    let client = client(&base);

    assert_eq!(client.add_song_url().as_str(), "http://localhost:8000/add-song");
    assert_eq!(client.recognize_url().as_str(), "http://localhost:8000/audio/recognize");
}

/// WHAT: Missing, malformed and non-http base URLs are rejected
/// WHY: Startup validation must catch what would become broken request targets
#[test]
fn given_invalid_base_urls_when_parsing_then_rejected() {
    for raw in ["", "   ", "localhost:8000", "ftp://files.example.com", "not a url", "/add-song"] {
        let result = parse_base_url(raw);
        assert!(
            matches!(
                result.as_ref().map_err(|e| e.as_backend()),
                Err(Some(BackendError::InvalidBaseUrl { .. }))
            ),
            "{raw:?} should be rejected"
        );
    }
}
