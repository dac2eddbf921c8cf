//! Handlers for the `/settings/apis` resource.
//!
//! Users bring their own vendor credentials; these endpoints store,
//! list, and live-test them. Credentials are never echoed back in full.

use axum::extract::{Path, State};
use axum::Json;
use nexusone_core::error::CoreError;
use nexusone_db::models::api_config::{ApiConfigurationResponse, UpsertApiConfiguration};
use nexusone_db::repositories::ApiConfigRepo;
use nexusone_vendors::{elevenlabs::ElevenLabs, luma::Luma, openai::OpenAi, VendorError};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Services a credential can be stored for.
const KNOWN_SERVICES: &[&str] = &["openai", "elevenlabs", "luma"];

fn validate_service(service: &str) -> Result<(), AppError> {
    if !KNOWN_SERVICES.contains(&service) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown service '{service}'; expected one of: {}",
            KNOWN_SERVICES.join(", ")
        ))));
    }
    Ok(())
}

/// GET /api/v1/settings/apis
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<ApiConfigurationResponse>>>> {
    let configs = ApiConfigRepo::list_for_profile(&state.pool, auth_user.profile_id).await?;

    Ok(Json(DataResponse {
        data: configs.into_iter().map(Into::into).collect(),
    }))
}

/// PUT /api/v1/settings/apis/{service}
///
/// Store or replace the credential for a service. Replacing a credential
/// clears its previous test result.
pub async fn upsert(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(service): Path<String>,
    Json(input): Json<UpsertApiConfiguration>,
) -> AppResult<Json<DataResponse<ApiConfigurationResponse>>> {
    validate_service(&service)?;

    if input.credential.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Credential must not be empty".into(),
        )));
    }

    let config =
        ApiConfigRepo::upsert(&state.pool, auth_user.profile_id, &service, &input).await?;

    tracing::info!(
        profile_id = auth_user.profile_id,
        service = %service,
        "API configuration stored"
    );

    Ok(Json(DataResponse {
        data: config.into(),
    }))
}

/// POST /api/v1/settings/apis/{service}/test
///
/// Probe the stored credential against the live vendor and record the
/// outcome on the configuration row.
pub async fn test(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(service): Path<String>,
) -> AppResult<Json<DataResponse<ApiConfigurationResponse>>> {
    validate_service(&service)?;

    let config = ApiConfigRepo::find(&state.pool, auth_user.profile_id, &service)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "No API configuration stored for service '{service}'"
            )))
        })?;

    let outcome = probe_service(&state, &service, &config.credential).await;
    let status = match &outcome {
        Ok(()) => "ok".to_string(),
        Err(err) => format!("failed: {err}"),
    };

    let updated = ApiConfigRepo::record_test(&state.pool, config.id, &status).await?;

    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

/// Run the service's cheapest authenticated read with the credential.
async fn probe_service(
    state: &AppState,
    service: &str,
    credential: &str,
) -> Result<(), VendorError> {
    match service {
        "openai" => {
            OpenAi::new(&state.config.vendors.openai_base_url, credential)
                .probe()
                .await
        }
        "elevenlabs" => {
            ElevenLabs::new(&state.config.vendors.elevenlabs_base_url, credential)
                .probe()
                .await
        }
        "luma" => {
            Luma::new(&state.config.vendors.luma_base_url, credential)
                .probe()
                .await
        }
        other => Err(VendorError::UnexpectedResponse(format!(
            "no adapter for service '{other}'"
        ))),
    }
}
