//! Repository for the `profiles` table.
//!
//! Balance mutations do NOT live here -- every credit movement goes
//! through `LedgerRepo` so the transaction log stays complete. This
//! repository covers identity, login bookkeeping, and quota counters.

use nexusone_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::profile::{CreateProfile, Profile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, plan_id, credits, \
    videos_used, pages_used, whatsapp_numbers_used, is_active, \
    last_login_at, failed_login_count, locked_until, created_at, updated_at";

/// Quota counters a metered action can increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaResource {
    Videos,
    LandingPages,
    WhatsappNumbers,
}

impl QuotaResource {
    /// Column holding the counter. Static strings only; never built from
    /// user input.
    fn column(self) -> &'static str {
        match self {
            QuotaResource::Videos => "videos_used",
            QuotaResource::LandingPages => "pages_used",
            QuotaResource::WhatsappNumbers => "whatsapp_numbers_used",
        }
    }
}

/// Provides CRUD operations for profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert a new profile, returning the created row. The balance
    /// starts at zero; the signup grant is applied through the ledger.
    pub async fn create(pool: &PgPool, input: &CreateProfile) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (email, password_hash, plan_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.plan_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE email = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Reset the failed-login counter and stamp `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE profiles \
             SET last_login_at = NOW(), failed_login_count = 0, locked_until = NULL, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE profiles \
             SET failed_login_count = failed_login_count + 1, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Temporarily lock the account until the given time.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE profiles SET locked_until = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Soft-disable a profile. Profiles are never hard-deleted.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE profiles SET is_active = false, updated_at = NOW() \
             WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Increment a quota counter after a successfully metered action.
    pub async fn increment_usage(
        pool: &PgPool,
        id: DbId,
        resource: QuotaResource,
    ) -> Result<(), sqlx::Error> {
        let column = resource.column();
        let query = format!(
            "UPDATE profiles SET {column} = {column} + 1, updated_at = NOW() WHERE id = $1"
        );
        sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(())
    }
}
