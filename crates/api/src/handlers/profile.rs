//! Handlers for the `/profile` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use nexusone_core::error::CoreError;
use nexusone_db::models::profile::ProfileResponse;
use nexusone_db::repositories::{ProfileRepo, SessionRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/profile
///
/// The authenticated profile with its plan, balance, and quota counters.
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<ProfileResponse>>> {
    let profile = ProfileRepo::find_by_id(&state.pool, auth_user.profile_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Profile",
                id: auth_user.profile_id,
            })
        })?;

    Ok(Json(DataResponse {
        data: profile.into(),
    }))
}

/// DELETE /api/v1/profile
///
/// Soft-deactivate the authenticated profile and revoke its sessions.
/// Ledger and generation history are retained. Returns 204 No Content.
pub async fn deactivate_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<StatusCode> {
    let deactivated = ProfileRepo::deactivate(&state.pool, auth_user.profile_id).await?;
    if !deactivated {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Profile",
            id: auth_user.profile_id,
        }));
    }

    SessionRepo::revoke_all_for_profile(&state.pool, auth_user.profile_id).await?;

    tracing::info!(profile_id = auth_user.profile_id, "profile deactivated");
    Ok(StatusCode::NO_CONTENT)
}
