//! Refresh-token session model.

use nexusone_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `sessions` table. Stores only the SHA-256 hash of the
/// refresh token, never the plaintext.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub profile_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new session at login or refresh.
#[derive(Debug)]
pub struct CreateSession {
    pub profile_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}
