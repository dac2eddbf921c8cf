//! Handlers for the `/credits` resource (balance, ledger history, audit).

use axum::extract::{Query, State};
use axum::Json;
use nexusone_core::error::CoreError;
use nexusone_core::types::CreditAmount;
use nexusone_db::models::credit_transaction::{CreditTransaction, LedgerAudit, TransactionListQuery};
use nexusone_db::repositories::LedgerRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response payload for `GET /credits/balance`.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub credits: CreditAmount,
}

/// GET /api/v1/credits/balance
pub async fn get_balance(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<BalanceResponse>>> {
    let credits = LedgerRepo::balance(&state.pool, auth_user.profile_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Profile",
                id: auth_user.profile_id,
            })
        })?;

    Ok(Json(DataResponse {
        data: BalanceResponse { credits },
    }))
}

/// GET /api/v1/credits/transactions
///
/// Newest-first page of the profile's ledger entries.
pub async fn list_transactions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<TransactionListQuery>,
) -> AppResult<Json<DataResponse<Vec<CreditTransaction>>>> {
    let transactions = LedgerRepo::transactions(&state.pool, auth_user.profile_id, &query).await?;

    Ok(Json(DataResponse { data: transactions }))
}

/// GET /api/v1/credits/audit
///
/// Reconstruct the balance from the ledger and compare it with the
/// profile row. A mismatch points at a write that bypassed the ledger.
pub async fn audit_balance(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<LedgerAudit>>> {
    let audit = LedgerRepo::audit_balance(&state.pool, auth_user.profile_id).await?;

    if !audit.consistent {
        tracing::warn!(
            profile_id = auth_user.profile_id,
            ledger_sum = audit.ledger_sum,
            profile_balance = audit.profile_balance,
            "ledger does not reconcile with profile balance"
        );
    }

    Ok(Json(DataResponse { data: audit }))
}
