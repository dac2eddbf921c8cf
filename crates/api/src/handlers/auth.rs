//! Handlers for the `/auth` resource (register, login, refresh, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use nexusone_core::error::CoreError;
use nexusone_core::plan::PlanTier;
use nexusone_core::types::DbId;
use nexusone_db::models::profile::CreateProfile;
use nexusone_db::repositories::{LedgerRepo, ProfileRepo, SessionRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

/// Ledger reason recorded for the signup credit grant.
const SIGNUP_GRANT_REASON: &str = "signup_grant";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
///
/// Every new profile starts on the free tier; plan upgrades are an
/// operator action, same as `plan_renewal` credits. A self-selected plan
/// here would hand out the paid tiers' signup grants for free.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by register, login, and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub profile: ProfileInfo,
}

/// Public profile info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct ProfileInfo {
    pub id: DbId,
    pub email: String,
    pub plan: PlanTier,
    pub credits: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a free-tier profile, apply its signup credit grant through the
/// ledger, and return tokens so the client is logged in immediately.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let plan = PlanTier::Free;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let profile_input = CreateProfile {
        email: input.email.to_lowercase(),
        password_hash,
        plan_id: plan.id(),
    };
    // Duplicate emails surface as 409 via the uq_profiles_email constraint.
    let profile = ProfileRepo::create(&state.pool, &profile_input).await?;

    // The grant goes through the ledger so the transaction log stays complete.
    let grant = LedgerRepo::credit(
        &state.pool,
        profile.id,
        plan.signup_grant(),
        SIGNUP_GRANT_REASON,
    )
    .await?;

    tracing::info!(profile_id = profile.id, plan = ?plan, "profile registered");

    let response = create_auth_response(
        &state,
        profile.id,
        &profile.email,
        plan,
        grant.balance_after,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let profile = ProfileRepo::find_by_email(&state.pool, &input.email.to_lowercase())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    if !profile.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if let Some(locked_until) = profile.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(&input.password, &profile.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        ProfileRepo::increment_failed_login(&state.pool, profile.id).await?;

        let new_count = profile.failed_login_count + 1;
        if new_count >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            ProfileRepo::lock_account(&state.pool, profile.id, lock_until).await?;
        }

        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    ProfileRepo::record_successful_login(&state.pool, profile.id).await?;

    let response = create_auth_response(
        &state,
        profile.id,
        &profile.email,
        profile.plan(),
        profile.credits,
    )
    .await?;

    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    // Token rotation: the presented refresh token is single-use.
    SessionRepo::revoke(&state.pool, session.id).await?;

    let profile = ProfileRepo::find_by_id(&state.pool, session.profile_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Profile no longer exists".into()))
        })?;

    if !profile.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let response = create_auth_response(
        &state,
        profile.id,
        &profile.email,
        profile.plan(),
        profile.credits,
    )
    .await?;

    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated profile. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for_profile(&state.pool, auth_user.profile_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate access + refresh tokens, persist a session row, and build the response.
async fn create_auth_response(
    state: &AppState,
    profile_id: DbId,
    email: &str,
    plan: PlanTier,
    credits: i64,
) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(profile_id, plan.as_str(), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();

    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    let session_input = nexusone_db::models::session::CreateSession {
        profile_id,
        refresh_token_hash: refresh_hash,
        expires_at,
    };
    SessionRepo::create(&state.pool, &session_input).await?;

    let expires_in = state.config.jwt.access_token_expiry_mins * 60;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in,
        profile: ProfileInfo {
            id: profile_id,
            email: email.to_string(),
            plan,
            credits,
        },
    })
}
