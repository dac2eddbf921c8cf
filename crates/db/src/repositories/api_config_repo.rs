//! Repository for the `api_configurations` table.

use nexusone_core::types::DbId;
use sqlx::PgPool;

use crate::models::api_config::{ApiConfiguration, UpsertApiConfiguration};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, profile_id, service, credential, is_enabled, \
    last_tested_at, test_status, created_at, updated_at";

/// Provides CRUD operations for vendor API configurations.
pub struct ApiConfigRepo;

impl ApiConfigRepo {
    /// Insert or update the configuration for (profile, service).
    ///
    /// Replacing the credential clears the previous test result; a new
    /// credential has not been probed yet.
    pub async fn upsert(
        pool: &PgPool,
        profile_id: DbId,
        service: &str,
        input: &UpsertApiConfiguration,
    ) -> Result<ApiConfiguration, sqlx::Error> {
        let query = format!(
            "INSERT INTO api_configurations (profile_id, service, credential, is_enabled) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (profile_id, service) DO UPDATE \
             SET credential = EXCLUDED.credential, \
                 is_enabled = EXCLUDED.is_enabled, \
                 last_tested_at = NULL, \
                 test_status = NULL, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiConfiguration>(&query)
            .bind(profile_id)
            .bind(service)
            .bind(&input.credential)
            .bind(input.is_enabled.unwrap_or(true))
            .fetch_one(pool)
            .await
    }

    /// All configurations for a profile, alphabetical by service.
    pub async fn list_for_profile(
        pool: &PgPool,
        profile_id: DbId,
    ) -> Result<Vec<ApiConfiguration>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM api_configurations \
             WHERE profile_id = $1 \
             ORDER BY service ASC"
        );
        sqlx::query_as::<_, ApiConfiguration>(&query)
            .bind(profile_id)
            .fetch_all(pool)
            .await
    }

    /// The configuration for (profile, service), if any.
    pub async fn find(
        pool: &PgPool,
        profile_id: DbId,
        service: &str,
    ) -> Result<Option<ApiConfiguration>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM api_configurations \
             WHERE profile_id = $1 AND service = $2"
        );
        sqlx::query_as::<_, ApiConfiguration>(&query)
            .bind(profile_id)
            .bind(service)
            .fetch_optional(pool)
            .await
    }

    /// The enabled configuration for (profile, service), if any. Vendor
    /// dispatch paths use this so disabled credentials are never sent.
    pub async fn find_enabled(
        pool: &PgPool,
        profile_id: DbId,
        service: &str,
    ) -> Result<Option<ApiConfiguration>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM api_configurations \
             WHERE profile_id = $1 AND service = $2 AND is_enabled = true"
        );
        sqlx::query_as::<_, ApiConfiguration>(&query)
            .bind(profile_id)
            .bind(service)
            .fetch_optional(pool)
            .await
    }

    /// Record the outcome of a live configuration probe.
    pub async fn record_test(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<ApiConfiguration, sqlx::Error> {
        let query = format!(
            "UPDATE api_configurations \
             SET last_tested_at = NOW(), test_status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiConfiguration>(&query)
            .bind(id)
            .bind(status)
            .fetch_one(pool)
            .await
    }
}
