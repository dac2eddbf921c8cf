//! Credit cost rules for metered actions.
//!
//! Every metered action debits a fixed number of credits determined solely
//! by the generation kind. Costs are decoupled from real currency; payment
//! settlement happens outside this system.

use crate::error::CoreError;
use crate::generation::GenerationKind;
use crate::types::CreditAmount;

/// Credits debited for a synchronous content (text) generation.
pub const COST_CONTENT: CreditAmount = 5;

/// Credits debited for a synchronous text-to-speech generation.
pub const COST_AUDIO: CreditAmount = 8;

/// Credits debited for an asynchronous video generation.
pub const COST_VIDEO: CreditAmount = 30;

/// Credit cost for one action of the given kind.
pub fn cost_of(kind: GenerationKind) -> CreditAmount {
    match kind {
        GenerationKind::Content => COST_CONTENT,
        GenerationKind::Audio => COST_AUDIO,
        GenerationKind::Video => COST_VIDEO,
    }
}

/// Validate that a ledger operation amount is strictly positive.
///
/// Both debits and credits take positive amounts at the API boundary; the
/// sign is applied when the ledger row is written.
pub fn validate_amount(amount: CreditAmount) -> Result<(), CoreError> {
    if amount <= 0 {
        return Err(CoreError::Validation(format!(
            "Credit amount must be positive, got {amount}"
        )));
    }
    Ok(())
}
