//! Credit ledger entry model.

use nexusone_core::types::{CreditAmount, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the append-only `credit_transactions` table.
///
/// Debits carry a negative `amount`, credits a positive one.
/// `balance_after` snapshots the profile balance at write time so the
/// ledger is self-checking.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CreditTransaction {
    pub id: DbId,
    pub profile_id: DbId,
    pub amount: CreditAmount,
    pub reason: String,
    pub balance_after: CreditAmount,
    pub created_at: Timestamp,
}

/// Query parameters for `GET /credits/transactions`.
#[derive(Debug, Deserialize)]
pub struct TransactionListQuery {
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Result of reconstructing a profile's balance from the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerAudit {
    pub profile_id: DbId,
    /// SUM(amount) over the profile's ledger rows.
    pub ledger_sum: CreditAmount,
    /// Current balance on the profile row.
    pub profile_balance: CreditAmount,
    /// True when the two agree.
    pub consistent: bool,
}
