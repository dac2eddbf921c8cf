//! Shared helpers for HTTP-level integration tests.
//!
//! Builds the full application router with the production middleware
//! stack and provides request/response helpers on top of
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

pub mod mock_vendor;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use nexusone_api::auth::jwt::JwtConfig;
use nexusone_api::config::{ServerConfig, VendorEndpoints};
use nexusone_api::router::build_app_router;
use nexusone_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
///
/// Vendor base URLs point at localhost so an accidental dispatch in a
/// test that did not set up a mock fails fast instead of reaching a
/// real vendor.
pub fn test_config() -> ServerConfig {
    test_config_with_vendors(VendorEndpoints {
        openai_base_url: "http://127.0.0.1:9".to_string(),
        elevenlabs_base_url: "http://127.0.0.1:9".to_string(),
        luma_base_url: "http://127.0.0.1:9".to_string(),
    })
}

/// Build a test `ServerConfig` with the given vendor endpoints (used by
/// generation tests that run a local mock vendor).
pub fn test_config_with_vendors(vendors: VendorEndpoints) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-that-is-long-enough".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        vendors,
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool.
///
/// This goes through [`build_app_router`] so integration tests exercise
/// the same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_config(pool, test_config())
}

/// Same as [`build_test_app`] with a caller-supplied config.
pub fn build_test_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request without authentication.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    app.oneshot(request).await.expect("request should succeed")
}

/// Send a GET request with a Bearer token.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    app.oneshot(request).await.expect("request should succeed")
}

/// Send a POST request with a JSON body, without authentication.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    app.oneshot(request).await.expect("request should succeed")
}

/// Send a POST request with a JSON body and a Bearer token.
pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request should build");
    app.oneshot(request).await.expect("request should succeed")
}

/// Send a POST request with an empty body and a Bearer token.
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    app.oneshot(request).await.expect("request should succeed")
}

/// Send a PUT request with a JSON body and a Bearer token.
pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request should build");
    app.oneshot(request).await.expect("request should succeed")
}

/// Send a DELETE request with a Bearer token.
pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    app.oneshot(request).await.expect("request should succeed")
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

/// Register an account through the API and return `(access_token, profile_id)`.
pub async fn register_account(app: Router, email: &str) -> (String, i64) {
    let body = serde_json::json!({
        "email": email,
        "password": "test_password_123!",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;

    let token = json["access_token"]
        .as_str()
        .expect("register must return an access token")
        .to_string();
    let profile_id = json["profile"]["id"]
        .as_i64()
        .expect("register must return the profile id");
    (token, profile_id)
}
