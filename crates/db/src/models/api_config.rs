//! Vendor API configuration model and DTOs.

use nexusone_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `api_configurations` table.
///
/// The credential is the user's own vendor API key, supplied through the
/// settings endpoints. Use [`ApiConfigurationResponse`] for external
/// output -- it masks the credential.
#[derive(Debug, Clone, FromRow)]
pub struct ApiConfiguration {
    pub id: DbId,
    pub profile_id: DbId,
    pub service: String,
    pub credential: String,
    pub is_enabled: bool,
    pub last_tested_at: Option<Timestamp>,
    pub test_status: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `PUT /settings/apis/{service}`.
#[derive(Debug, Deserialize)]
pub struct UpsertApiConfiguration {
    pub credential: String,
    /// Defaults to enabled when omitted.
    pub is_enabled: Option<bool>,
}

/// External-facing configuration representation; the credential is
/// reduced to its last four characters.
#[derive(Debug, Clone, Serialize)]
pub struct ApiConfigurationResponse {
    pub id: DbId,
    pub service: String,
    pub credential_hint: String,
    pub is_enabled: bool,
    pub last_tested_at: Option<Timestamp>,
    pub test_status: Option<String>,
    pub updated_at: Timestamp,
}

impl From<ApiConfiguration> for ApiConfigurationResponse {
    fn from(c: ApiConfiguration) -> Self {
        let hint = mask_credential(&c.credential);
        Self {
            id: c.id,
            service: c.service,
            credential_hint: hint,
            is_enabled: c.is_enabled,
            last_tested_at: c.last_tested_at,
            test_status: c.test_status,
            updated_at: c.updated_at,
        }
    }
}

/// Reduce a credential to `****` plus its last four characters.
fn mask_credential(credential: &str) -> String {
    let tail: String = credential
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{tail}")
}
