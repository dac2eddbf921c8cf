//! A local stand-in for the vendor APIs.
//!
//! Serves the endpoints the adapters touch, enforcing each vendor's auth
//! header convention, so generation and settings tests run against real
//! HTTP without leaving the machine.

use std::net::SocketAddr;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};

use nexusone_api::config::VendorEndpoints;

/// Credentials the mock accepts, one per vendor convention.
pub const GOOD_OPENAI_KEY: &str = "sk-good";
pub const GOOD_ELEVENLABS_KEY: &str = "xi-good";
pub const GOOD_LUMA_KEY: &str = "luma-good";

fn bearer_ok(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {expected}"))
        .unwrap_or(false)
}

fn xi_key_ok(headers: &HeaderMap) -> bool {
    headers
        .get("xi-api-key")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == GOOD_ELEVENLABS_KEY)
        .unwrap_or(false)
}

async fn chat_completions(
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    if !bearer_ok(&headers, GOOD_OPENAI_KEY) {
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

async fn list_models(headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
    if !bearer_ok(&headers, GOOD_OPENAI_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "invalid api key" })),
        );
    }
    (StatusCode::OK, Json(serde_json::json!({ "data": [] })))
}

async fn tts(
    headers: HeaderMap,
    Path(_voice): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    if !xi_key_ok(&headers) {
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

async fn elevenlabs_user(headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
    if !xi_key_ok(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "detail": "invalid key" })),
        );
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({ "subscription": { "tier": "starter" } })),
    )
}

async fn luma_credits(headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
    if !bearer_ok(&headers, GOOD_LUMA_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "detail": "unauthorized" })),
        );
    }
    (
        StatusCode::OK,
        Json(serde_json::json!({ "credit_balance": 1000.0 })),
    )
}

/// Bind the mock vendor on an ephemeral port and return endpoints that
/// route every vendor at it.
pub async fn spawn() -> VendorEndpoints {
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/v1/models", get(list_models))
        .route("/v1/text-to-speech/{voice}/with-timestamps", post(tts))
        .route("/v1/user", get(elevenlabs_user))
        .route("/dream-machine/v1/credits", get(luma_credits));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base = format!("http://{addr}");
    VendorEndpoints {
        openai_base_url: base.clone(),
        elevenlabs_base_url: base.clone(),
        luma_base_url: base,
    }
}
