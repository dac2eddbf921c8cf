//! Plan tiers, credit grants, and quota ceilings.
//!
//! A profile's plan determines its signup/monthly credit grants and the
//! ceilings on its quota counters (videos, landing pages, WhatsApp numbers).
//! Quota checks are pure predicates over the counters stored on the profile.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::CreditAmount;

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Free,
    Pro,
    Premium,
}

impl PlanTier {
    /// Database discriminant (SMALLINT, 1-based).
    pub fn id(self) -> i16 {
        match self {
            PlanTier::Free => 1,
            PlanTier::Pro => 2,
            PlanTier::Premium => 3,
        }
    }

    /// Inverse of [`id`](Self::id).
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(PlanTier::Free),
            2 => Some(PlanTier::Pro),
            3 => Some(PlanTier::Premium),
            _ => None,
        }
    }

    /// Lowercase name as used in JWT claims and API payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
            PlanTier::Premium => "premium",
        }
    }

    /// One-time credit grant applied at signup.
    pub fn signup_grant(self) -> CreditAmount {
        match self {
            PlanTier::Free => 50,
            PlanTier::Pro => 500,
            PlanTier::Premium => 2000,
        }
    }

    /// Credits granted on each monthly renewal.
    pub fn monthly_credits(self) -> CreditAmount {
        match self {
            PlanTier::Free => 0,
            PlanTier::Pro => 500,
            PlanTier::Premium => 2000,
        }
    }

    /// Quota ceilings for this tier.
    pub fn quotas(self) -> PlanQuotas {
        match self {
            PlanTier::Free => PlanQuotas {
                videos: 3,
                landing_pages: 1,
                whatsapp_numbers: 1,
            },
            PlanTier::Pro => PlanQuotas {
                videos: 50,
                landing_pages: 10,
                whatsapp_numbers: 3,
            },
            PlanTier::Premium => PlanQuotas {
                videos: 500,
                landing_pages: 100,
                whatsapp_numbers: 10,
            },
        }
    }
}

/// Per-tier ceilings on metered resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanQuotas {
    pub videos: i32,
    pub landing_pages: i32,
    pub whatsapp_numbers: i32,
}

/// Check a single quota counter against its ceiling before an action that
/// would increment it.
pub fn check_quota(used: i32, ceiling: i32, resource: &str) -> Result<(), CoreError> {
    if used >= ceiling {
        return Err(CoreError::QuotaExceeded(format!(
            "{resource} quota exhausted ({used}/{ceiling})"
        )));
    }
    Ok(())
}
