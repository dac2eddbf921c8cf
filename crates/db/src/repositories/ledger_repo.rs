//! Repository for the credit ledger.
//!
//! The debit path is the single enforcement point for the "balance never
//! goes negative" invariant: a conditional decrement
//! (`... SET credits = credits - $n WHERE ... AND credits >= $n`) and the
//! ledger insert run in one SQL transaction, so the check and the spend
//! are one atomic operation even under concurrent requests from the same
//! profile.

use nexusone_core::credits::validate_amount;
use nexusone_core::error::CoreError;
use nexusone_core::types::{CreditAmount, DbId};
use sqlx::PgPool;

use crate::models::credit_transaction::{CreditTransaction, LedgerAudit, TransactionListQuery};

/// Failure modes of the mutating ledger operations: the amount failed
/// domain validation, or the database itself errored.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] CoreError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, profile_id, amount, reason, balance_after, created_at";

/// Maximum page size for transaction listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for transaction listing.
const DEFAULT_LIMIT: i64 = 50;

/// Append-only credit ledger operations.
pub struct LedgerRepo;

impl LedgerRepo {
    /// Current balance for a profile, or `None` for an unknown profile.
    pub async fn balance(
        pool: &PgPool,
        profile_id: DbId,
    ) -> Result<Option<CreditAmount>, sqlx::Error> {
        sqlx::query_scalar("SELECT credits FROM profiles WHERE id = $1")
            .bind(profile_id)
            .fetch_optional(pool)
            .await
    }

    /// Cheap pre-check: does the profile currently hold at least `amount`
    /// credits? Callers use this to reject a request before dispatching a
    /// vendor call; the authoritative check is the conditional decrement
    /// in [`debit`](Self::debit).
    pub async fn check_balance(
        pool: &PgPool,
        profile_id: DbId,
        amount: CreditAmount,
    ) -> Result<bool, LedgerError> {
        validate_amount(amount)?;
        let balance = Self::balance(pool, profile_id).await?.unwrap_or(0);
        Ok(balance >= amount)
    }

    /// Atomically spend `amount` credits and append the ledger entry.
    /// `amount` must be strictly positive.
    ///
    /// Returns `None` when the balance is below `amount` at commit time
    /// (including when a concurrent debit got there first); in that case
    /// nothing is written.
    pub async fn debit(
        pool: &PgPool,
        profile_id: DbId,
        amount: CreditAmount,
        reason: &str,
    ) -> Result<Option<CreditTransaction>, LedgerError> {
        validate_amount(amount)?;
        let mut tx = pool.begin().await?;

        let balance_after: Option<CreditAmount> = sqlx::query_scalar(
            "UPDATE profiles \
             SET credits = credits - $2, updated_at = NOW() \
             WHERE id = $1 AND credits >= $2 \
             RETURNING credits",
        )
        .bind(profile_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(balance_after) = balance_after else {
            tx.rollback().await?;
            return Ok(None);
        };

        let query = format!(
            "INSERT INTO credit_transactions (profile_id, amount, reason, balance_after) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, CreditTransaction>(&query)
            .bind(profile_id)
            .bind(-amount)
            .bind(reason)
            .bind(balance_after)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            profile_id,
            amount,
            balance_after,
            reason,
            "credits debited"
        );
        Ok(Some(entry))
    }

    /// Grant `amount` credits (signup grant, plan renewal, refund) and
    /// append the ledger entry. `amount` must be strictly positive.
    pub async fn credit(
        pool: &PgPool,
        profile_id: DbId,
        amount: CreditAmount,
        reason: &str,
    ) -> Result<CreditTransaction, LedgerError> {
        validate_amount(amount)?;
        let mut tx = pool.begin().await?;

        let balance_after: CreditAmount = sqlx::query_scalar(
            "UPDATE profiles \
             SET credits = credits + $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING credits",
        )
        .bind(profile_id)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO credit_transactions (profile_id, amount, reason, balance_after) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, CreditTransaction>(&query)
            .bind(profile_id)
            .bind(amount)
            .bind(reason)
            .bind(balance_after)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(entry)
    }

    /// Newest-first page of a profile's ledger entries.
    pub async fn transactions(
        pool: &PgPool,
        profile_id: DbId,
        query_params: &TransactionListQuery,
    ) -> Result<Vec<CreditTransaction>, sqlx::Error> {
        let limit = query_params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = query_params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {COLUMNS} FROM credit_transactions \
             WHERE profile_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, CreditTransaction>(&query)
            .bind(profile_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Reconstruct the balance from the ledger and compare it with the
    /// profile row. The two must agree as long as every balance change
    /// goes through this repository.
    pub async fn audit_balance(
        pool: &PgPool,
        profile_id: DbId,
    ) -> Result<LedgerAudit, sqlx::Error> {
        let ledger_sum: CreditAmount = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM credit_transactions WHERE profile_id = $1",
        )
        .bind(profile_id)
        .fetch_one(pool)
        .await?;

        let profile_balance = Self::balance(pool, profile_id).await?.unwrap_or(0);

        Ok(LedgerAudit {
            profile_id,
            ledger_sum,
            profile_balance,
            consistent: ledger_sum == profile_balance,
        })
    }
}
