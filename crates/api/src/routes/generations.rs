//! Route definitions for the `/generations` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generations;
use crate::state::AppState;

/// Routes mounted at `/generations`.
///
/// ```text
/// POST /             -> submit
/// GET  /             -> list
/// GET  /{id}         -> get
/// POST /{id}/cancel  -> cancel
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(generations::submit).get(generations::list))
        .route("/{id}", get(generations::get))
        .route("/{id}/cancel", post(generations::cancel))
}
