//! Adapter tests against a local mock vendor server.
//!
//! A small axum router stands in for the vendor APIs: it enforces each
//! vendor's auth header convention and serves canned wire-format
//! responses, so the adapters' request shaping, response extraction, and
//! error normalization are exercised over real HTTP.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio_util::sync::CancellationToken;

use nexusone_core::polling::PollPolicy;
use nexusone_vendors::elevenlabs::ElevenLabs;
use nexusone_vendors::luma::Luma;
use nexusone_vendors::openai::OpenAi;
use nexusone_vendors::poll::poll_until_terminal;
use nexusone_vendors::VendorError;

// ---------------------------------------------------------------------------
// Mock vendor server
// ---------------------------------------------------------------------------

/// Shared state: how many status probes a Luma job needs before it
/// reports completed.
#[derive(Clone)]
struct MockState {
    luma_probes: Arc<AtomicU32>,
    luma_probes_needed: u32,
    luma_fails: bool,
}

fn bearer_ok(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {expected}"))
        .unwrap_or(false)
}

async fn chat_completions(
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    if !bearer_ok(&headers, "sk-good") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "invalid api key" })),
        );
    }
    let prompt = body["messages"][0]["content"].as_str().unwrap_or("");
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": format!("copy for: {prompt}") } }
            ]
        })),
    )
}

async fn luma_create(
    headers: HeaderMap,
    Json(_body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    if !bearer_ok(&headers, "luma-good") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "detail": "unauthorized" })),
        );
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({ "id": "job-42", "state": "queued" })),
    )
}

async fn luma_status(
    State(state): State<MockState>,
    Path(id): Path<String>,
) -> Json<serde_json::Value> {
    if state.luma_fails {
        return Json(serde_json::json!({
            "id": id,
            "state": "failed",
            "failure_reason": "prompt rejected",
        }));
    }
    let probes = state.luma_probes.fetch_add(1, Ordering::SeqCst) + 1;
    if probes < state.luma_probes_needed {
        Json(serde_json::json!({ "id": id, "state": "dreaming" }))
    } else {
        Json(serde_json::json!({
            "id": id,
            "state": "completed",
            "assets": { "video": "https://cdn.mock/video.mp4" },
        }))
    }
}

async fn tts(
    headers: HeaderMap,
    Path(_voice): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    let key_ok = headers
        .get("xi-api-key")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "xi-good")
        .unwrap_or(false);
    if !key_ok {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "detail": "invalid key" })),
        );
    }
    let text = body["text"].as_str().unwrap_or("");
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "audio_base64": format!("QVVESU8t{}", text.len()),
            "alignment": null,
        })),
    )
}

/// Bind the mock vendor on an ephemeral port and return its base URL.
async fn spawn_mock(state: MockState) -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/dream-machine/v1/generations", post(luma_create))
        .route("/dream-machine/v1/generations/{id}", get(luma_status))
        .route("/v1/text-to-speech/{voice}/with-timestamps", post(tts))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn default_state() -> MockState {
    MockState {
        luma_probes: Arc::new(AtomicU32::new(0)),
        luma_probes_needed: 3,
        luma_fails: false,
    }
}

/// Tight schedule so polling tests finish in milliseconds.
fn fast_policy() -> PollPolicy {
    PollPolicy {
        initial_interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(2),
        backoff_multiplier: 1.5,
        max_attempts: 10,
    }
}

// ---------------------------------------------------------------------------
// OpenAI
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_openai_content_generation() {
    let base = spawn_mock(default_state()).await;
    let openai = OpenAi::new(&base, "sk-good");

    let content = openai
        .generate_content("spring sale email", &serde_json::Value::Null)
        .await
        .unwrap();
    assert_eq!(content, "copy for: spring sale email");
}

#[tokio::test]
async fn test_openai_bad_key_surfaces_status_and_body() {
    let base = spawn_mock(default_state()).await;
    let openai = OpenAi::new(&base, "sk-wrong");

    let err = openai
        .generate_content("x", &serde_json::Value::Null)
        .await
        .unwrap_err();
    assert_matches!(err, VendorError::Api { status: 401, ref body } if body.contains("invalid api key"));
}

// ---------------------------------------------------------------------------
// Luma
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_luma_submit_and_poll_to_completion() {
    let base = spawn_mock(default_state()).await;
    let luma = Luma::new(&base, "luma-good");

    let job_id = luma
        .create_generation("sunset over a harbor", &serde_json::json!({ "aspect_ratio": "16:9" }))
        .await
        .unwrap();
    assert_eq!(job_id, "job-42");

    let cancel = CancellationToken::new();
    let url = poll_until_terminal(&fast_policy(), &cancel, || luma.probe_generation(&job_id))
        .await
        .unwrap();
    assert_eq!(url, "https://cdn.mock/video.mp4");
}

#[tokio::test]
async fn test_luma_vendor_failure_reported() {
    let state = MockState {
        luma_fails: true,
        ..default_state()
    };
    let base = spawn_mock(state).await;
    let luma = Luma::new(&base, "luma-good");

    let cancel = CancellationToken::new();
    let result = poll_until_terminal(&fast_policy(), &cancel, || luma.probe_generation("job-9"))
        .await;
    assert_matches!(result, Err(VendorError::JobFailed(reason)) if reason == "prompt rejected");
}

#[tokio::test]
async fn test_luma_poll_timeout_when_never_terminal() {
    // Needs more probes than the policy allows.
    let state = MockState {
        luma_probes_needed: 100,
        ..default_state()
    };
    let base = spawn_mock(state).await;
    let luma = Luma::new(&base, "luma-good");

    let cancel = CancellationToken::new();
    let result = poll_until_terminal(&fast_policy(), &cancel, || luma.probe_generation("job-7"))
        .await;
    assert_matches!(result, Err(VendorError::PollTimeout { attempts: 10 }));
}

// ---------------------------------------------------------------------------
// ElevenLabs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_elevenlabs_synthesis() {
    let base = spawn_mock(default_state()).await;
    let eleven = ElevenLabs::new(&base, "xi-good");

    let audio = eleven
        .synthesize("welcome to the store", &serde_json::json!({ "voice_id": "voice-1" }))
        .await
        .unwrap();
    assert!(audio.starts_with("QVVESU8t"));
}

#[tokio::test]
async fn test_elevenlabs_requires_xi_api_key_header() {
    let base = spawn_mock(default_state()).await;
    let eleven = ElevenLabs::new(&base, "xi-wrong");

    let err = eleven
        .synthesize("x", &serde_json::Value::Null)
        .await
        .unwrap_err();
    assert_matches!(err, VendorError::Api { status: 401, .. });
}
