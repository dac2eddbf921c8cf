//! Route definitions for the `/settings/apis` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Routes mounted at `/settings/apis`.
///
/// ```text
/// GET  /                -> list
/// PUT  /{service}       -> upsert
/// POST /{service}/test  -> test
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(settings::list))
        .route("/{service}", put(settings::upsert))
        .route("/{service}/test", post(settings::test))
}
