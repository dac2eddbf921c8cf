//! Route definitions for the `/credits` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::credits;
use crate::state::AppState;

/// Routes mounted at `/credits`.
///
/// ```text
/// GET /balance      -> get_balance
/// GET /transactions -> list_transactions
/// GET /audit        -> audit_balance
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/balance", get(credits::get_balance))
        .route("/transactions", get(credits::list_transactions))
        .route("/audit", get(credits::audit_balance))
}
