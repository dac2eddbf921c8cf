pub mod auth;
pub mod credits;
pub mod generations;
pub mod health;
pub mod profile;
pub mod settings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                     register (public)
/// /auth/login                        login (public)
/// /auth/refresh                      refresh (public)
/// /auth/logout                       logout (requires auth)
///
/// /profile                           get, deactivate
///
/// /credits/balance                   current balance
/// /credits/transactions              ledger history
/// /credits/audit                     ledger reconciliation
///
/// /generations                       submit, list
/// /generations/{id}                  get
/// /generations/{id}/cancel           request cancellation (POST)
///
/// /settings/apis                     list configurations
/// /settings/apis/{service}           upsert credential (PUT)
/// /settings/apis/{service}/test      live credential probe (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication (register, login, refresh, logout).
        .nest("/auth", auth::router())
        // The authenticated profile.
        .nest("/profile", profile::router())
        // Credit balance and ledger.
        .nest("/credits", credits::router())
        // Metered generation dispatch and history.
        .nest("/generations", generations::router())
        // Bring-your-own vendor credentials.
        .nest("/settings/apis", settings::router())
}
