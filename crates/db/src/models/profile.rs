//! Profile entity model and DTOs.

use nexusone_core::plan::{PlanQuotas, PlanTier};
use nexusone_core::types::{CreditAmount, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full profile row from the `profiles` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`ProfileResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub plan_id: i16,
    pub credits: CreditAmount,
    pub videos_used: i32,
    pub pages_used: i32,
    pub whatsapp_numbers_used: i32,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Profile {
    /// The profile's plan tier, defaulting to free for unknown ids.
    pub fn plan(&self) -> PlanTier {
        PlanTier::from_id(self.plan_id).unwrap_or(PlanTier::Free)
    }
}

/// Safe profile representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: DbId,
    pub email: String,
    pub plan: PlanTier,
    pub credits: CreditAmount,
    pub videos_used: i32,
    pub pages_used: i32,
    pub whatsapp_numbers_used: i32,
    /// Ceilings for the profile's current plan.
    pub quotas: PlanQuotas,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        let plan = p.plan();
        Self {
            id: p.id,
            email: p.email,
            plan,
            credits: p.credits,
            videos_used: p.videos_used,
            pages_used: p.pages_used,
            whatsapp_numbers_used: p.whatsapp_numbers_used,
            quotas: plan.quotas(),
            is_active: p.is_active,
            created_at: p.created_at,
        }
    }
}

/// DTO for creating a new profile at signup.
#[derive(Debug, Deserialize)]
pub struct CreateProfile {
    pub email: String,
    pub password_hash: String,
    pub plan_id: i16,
}
