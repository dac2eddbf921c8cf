//! Repository for the `generations` table.
//!
//! Every UPDATE carries a status guard so terminal rows stay immutable:
//! `complete` and `fail` match only non-terminal rows and report whether
//! anything was written. Worker claims use `FOR UPDATE SKIP LOCKED` so
//! multiple worker instances never double-claim a job.

use nexusone_core::generation::GenerationStatus;
use nexusone_core::types::{CreditAmount, DbId};
use sqlx::PgPool;

use crate::models::generation::{Generation, GenerationListQuery, SubmitGeneration};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, profile_id, kind_id, status_id, service, prompt, parameters, \
    vendor_job_id, output_url, output_content, credits_used, error_message, \
    cancel_requested, started_at, completed_at, created_at, updated_at";

/// Maximum page size for generation listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for generation listing.
const DEFAULT_LIMIT: i64 = 50;

/// Terminal statuses: completed, failed.
const TERMINAL_COMPLETED: i16 = 3;
const TERMINAL_FAILED: i16 = 4;

/// Provides lifecycle operations for generation records.
pub struct GenerationRepo;

impl GenerationRepo {
    /// Insert a new generation record in the given initial status
    /// (queued for asynchronous kinds, processing for synchronous ones).
    pub async fn create(
        pool: &PgPool,
        profile_id: DbId,
        service: &str,
        input: &SubmitGeneration,
        initial: GenerationStatus,
    ) -> Result<Generation, sqlx::Error> {
        let started_at_clause = if initial == GenerationStatus::Processing {
            "NOW()"
        } else {
            "NULL"
        };
        let query = format!(
            "INSERT INTO generations \
             (profile_id, kind_id, status_id, service, prompt, parameters, started_at) \
             VALUES ($1, $2, $3, $4, $5, $6, {started_at_clause}) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Generation>(&query)
            .bind(profile_id)
            .bind(input.kind.id())
            .bind(initial.id())
            .bind(service)
            .bind(&input.prompt)
            .bind(&input.parameters)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Generation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generations WHERE id = $1");
        sqlx::query_as::<_, Generation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a generation scoped to its owner.
    pub async fn find_for_profile(
        pool: &PgPool,
        id: DbId,
        profile_id: DbId,
    ) -> Result<Option<Generation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generations WHERE id = $1 AND profile_id = $2");
        sqlx::query_as::<_, Generation>(&query)
            .bind(id)
            .bind(profile_id)
            .fetch_optional(pool)
            .await
    }

    /// Newest-first page of a profile's generations.
    pub async fn list_for_profile(
        pool: &PgPool,
        profile_id: DbId,
        query_params: &GenerationListQuery,
    ) -> Result<Vec<Generation>, sqlx::Error> {
        let limit = query_params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = query_params.offset.unwrap_or(0).max(0);

        match query_params.status {
            Some(status) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM generations \
                     WHERE profile_id = $1 AND status_id = $2 \
                     ORDER BY created_at DESC, id DESC \
                     LIMIT $3 OFFSET $4"
                );
                sqlx::query_as::<_, Generation>(&query)
                    .bind(profile_id)
                    .bind(status.id())
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM generations \
                     WHERE profile_id = $1 \
                     ORDER BY created_at DESC, id DESC \
                     LIMIT $2 OFFSET $3"
                );
                sqlx::query_as::<_, Generation>(&query)
                    .bind(profile_id)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Atomically claim the oldest queued generation for the worker.
    ///
    /// Uses `SELECT ... FOR UPDATE SKIP LOCKED` so concurrent worker
    /// instances never claim the same row. The claimed row moves to
    /// processing with `started_at` stamped.
    pub async fn claim_next_queued(pool: &PgPool) -> Result<Option<Generation>, sqlx::Error> {
        let query = format!(
            "UPDATE generations \
             SET status_id = $1, started_at = NOW(), updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM generations \
                 WHERE status_id = $2 AND cancel_requested = false \
                 ORDER BY created_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Generation>(&query)
            .bind(GenerationStatus::Processing.id())
            .bind(GenerationStatus::Queued.id())
            .fetch_optional(pool)
            .await
    }

    /// Record the vendor-assigned job id once the create call succeeds.
    pub async fn set_vendor_job(
        pool: &PgPool,
        id: DbId,
        vendor_job_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generations \
             SET vendor_job_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id NOT IN ($3, $4)",
        )
        .bind(id)
        .bind(vendor_job_id)
        .bind(TERMINAL_COMPLETED)
        .bind(TERMINAL_FAILED)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a generation completed with its output and the credits
    /// actually debited. Returns `false` when the row was already
    /// terminal (nothing written).
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        output_url: Option<&str>,
        output_content: Option<&str>,
        credits_used: CreditAmount,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generations \
             SET status_id = $2, output_url = $3, output_content = $4, \
                 credits_used = $5, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id NOT IN ($6, $7)",
        )
        .bind(id)
        .bind(GenerationStatus::Completed.id())
        .bind(output_url)
        .bind(output_content)
        .bind(credits_used)
        .bind(TERMINAL_COMPLETED)
        .bind(TERMINAL_FAILED)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a generation failed with a reason. Returns `false` when the
    /// row was already terminal (nothing written).
    pub async fn fail(pool: &PgPool, id: DbId, error: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generations \
             SET status_id = $2, error_message = $3, completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id NOT IN ($4, $5)",
        )
        .bind(id)
        .bind(GenerationStatus::Failed.id())
        .bind(error)
        .bind(TERMINAL_COMPLETED)
        .bind(TERMINAL_FAILED)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flag a non-terminal generation for cancellation. The worker trips
    /// its cancellation token when it observes the flag. Scoped to the
    /// owning profile.
    pub async fn request_cancel(
        pool: &PgPool,
        id: DbId,
        profile_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generations \
             SET cancel_requested = true, updated_at = NOW() \
             WHERE id = $1 AND profile_id = $2 AND status_id NOT IN ($3, $4)",
        )
        .bind(id)
        .bind(profile_id)
        .bind(TERMINAL_COMPLETED)
        .bind(TERMINAL_FAILED)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether cancellation has been requested for a row. Used by the
    /// worker between poll attempts.
    pub async fn is_cancel_requested(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let flag: Option<bool> =
            sqlx::query_scalar("SELECT cancel_requested FROM generations WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(flag.unwrap_or(false))
    }
}
