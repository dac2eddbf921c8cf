//! Handlers for the `/generations` resource.
//!
//! This is the metered proxy path: authenticate, pre-check the balance,
//! dispatch the vendor call, debit on success, persist the result.
//! Content and audio are synchronous (the vendor answers within the
//! request); video is queued for the worker and answered with 202.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use nexusone_core::credits::cost_of;
use nexusone_core::error::CoreError;
use nexusone_core::generation::{GenerationKind, GenerationStatus};
use nexusone_core::plan::check_quota;
use nexusone_core::types::DbId;
use nexusone_db::models::generation::{
    Generation, GenerationListQuery, GenerationResponse, SubmitGeneration,
};
use nexusone_db::repositories::{
    ApiConfigRepo, GenerationRepo, LedgerRepo, ProfileRepo, QuotaResource,
};
use nexusone_vendors::{elevenlabs::ElevenLabs, openai::OpenAi};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Vendor service name for a generation kind.
pub fn service_for(kind: GenerationKind) -> &'static str {
    match kind {
        GenerationKind::Content => "openai",
        GenerationKind::Audio => "elevenlabs",
        GenerationKind::Video => "luma",
    }
}

/// POST /api/v1/generations
///
/// Dispatch a generation. Synchronous kinds return the completed record;
/// video returns 202 with the queued record.
pub async fn submit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<SubmitGeneration>,
) -> AppResult<(StatusCode, Json<DataResponse<GenerationResponse>>)> {
    if input.prompt.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Prompt must not be empty".into(),
        )));
    }

    let kind = input.kind;
    let cost = cost_of(kind);
    let service = service_for(kind);

    let profile = ProfileRepo::find_by_id(&state.pool, auth_user.profile_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Profile",
                id: auth_user.profile_id,
            })
        })?;

    // Cheap pre-check so we never dispatch a vendor call we cannot pay
    // for. The authoritative check is the conditional decrement at
    // commit time.
    if profile.credits < cost {
        return Err(AppError::Core(CoreError::InsufficientCredits {
            required: cost,
            available: profile.credits,
        }));
    }

    // Video consumes a plan quota slot in addition to credits.
    if kind == GenerationKind::Video {
        check_quota(profile.videos_used, profile.plan().quotas().videos, "videos")?;
    }

    // The profile must have an enabled credential for the vendor.
    let config = ApiConfigRepo::find_enabled(&state.pool, auth_user.profile_id, service)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "No enabled API configuration for service '{service}'"
            )))
        })?;

    if kind.is_synchronous() {
        let generation = GenerationRepo::create(
            &state.pool,
            auth_user.profile_id,
            service,
            &input,
            GenerationStatus::Processing,
        )
        .await?;

        let generation =
            run_synchronous(&state, generation, kind, &input, &config.credential, cost).await?;

        Ok((
            StatusCode::OK,
            Json(DataResponse {
                data: generation.into(),
            }),
        ))
    } else {
        // Queued for the worker; credits are debited only after the
        // vendor job completes.
        let generation = GenerationRepo::create(
            &state.pool,
            auth_user.profile_id,
            service,
            &input,
            GenerationStatus::Queued,
        )
        .await?;

        tracing::info!(
            generation_id = generation.id,
            profile_id = auth_user.profile_id,
            "video generation queued"
        );

        Ok((
            StatusCode::ACCEPTED,
            Json(DataResponse {
                data: generation.into(),
            }),
        ))
    }
}

/// Execute a synchronous vendor call and settle the record.
///
/// On vendor failure the record is marked failed and nothing is charged.
/// On success the debit runs first; only a successful debit completes
/// the record.
async fn run_synchronous(
    state: &AppState,
    generation: Generation,
    kind: GenerationKind,
    input: &SubmitGeneration,
    credential: &str,
    cost: i64,
) -> AppResult<Generation> {
    let output = match kind {
        GenerationKind::Content => {
            let adapter = OpenAi::new(&state.config.vendors.openai_base_url, credential);
            adapter.generate_content(&input.prompt, &input.parameters).await
        }
        GenerationKind::Audio => {
            let adapter = ElevenLabs::new(&state.config.vendors.elevenlabs_base_url, credential);
            adapter.synthesize(&input.prompt, &input.parameters).await
        }
        GenerationKind::Video => {
            return Err(AppError::InternalError(
                "video generations are not dispatched synchronously".into(),
            ));
        }
    };

    let output = match output {
        Ok(output) => output,
        Err(err) => {
            GenerationRepo::fail(&state.pool, generation.id, &err.to_string()).await?;
            return Err(err.into());
        }
    };

    // Settle: debit, then complete. A losing race against a concurrent
    // debit leaves the record failed and the balance untouched.
    let debited = LedgerRepo::debit(
        &state.pool,
        generation.profile_id,
        cost,
        service_for(kind),
    )
    .await?;

    if debited.is_none() {
        GenerationRepo::fail(
            &state.pool,
            generation.id,
            "insufficient credits at commit time",
        )
        .await?;
        let available = LedgerRepo::balance(&state.pool, generation.profile_id)
            .await?
            .unwrap_or(0);
        return Err(AppError::Core(CoreError::InsufficientCredits {
            required: cost,
            available,
        }));
    }

    GenerationRepo::complete(&state.pool, generation.id, None, Some(&output), cost).await?;

    let settled = GenerationRepo::find_by_id(&state.pool, generation.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Generation",
                id: generation.id,
            })
        })?;

    tracing::info!(
        generation_id = settled.id,
        profile_id = settled.profile_id,
        credits_used = cost,
        "synchronous generation completed"
    );
    Ok(settled)
}

/// GET /api/v1/generations
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<GenerationListQuery>,
) -> AppResult<Json<DataResponse<Vec<GenerationResponse>>>> {
    let generations =
        GenerationRepo::list_for_profile(&state.pool, auth_user.profile_id, &query).await?;

    Ok(Json(DataResponse {
        data: generations.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/v1/generations/{id}
pub async fn get(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<GenerationResponse>>> {
    let generation = GenerationRepo::find_for_profile(&state.pool, id, auth_user.profile_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Generation",
                id,
            })
        })?;

    Ok(Json(DataResponse {
        data: generation.into(),
    }))
}

/// POST /api/v1/generations/{id}/cancel
///
/// Flag a queued or processing generation for cancellation. The worker
/// observes the flag between poll attempts. Returns 202 Accepted.
pub async fn cancel(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let flagged = GenerationRepo::request_cancel(&state.pool, id, auth_user.profile_id).await?;
    if flagged {
        tracing::info!(generation_id = id, "cancellation requested");
        return Ok(StatusCode::ACCEPTED);
    }

    // Distinguish "not yours / missing" from "already finished".
    let generation = GenerationRepo::find_for_profile(&state.pool, id, auth_user.profile_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Generation",
                id,
            })
        })?;

    Err(AppError::Core(CoreError::Conflict(format!(
        "Generation is already {}",
        generation.status().as_str()
    ))))
}
