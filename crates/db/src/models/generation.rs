//! Generation entity model and DTOs.

use nexusone_core::generation::{GenerationKind, GenerationStatus};
use nexusone_core::types::{CreditAmount, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `generations` table.
#[derive(Debug, Clone, FromRow)]
pub struct Generation {
    pub id: DbId,
    pub profile_id: DbId,
    pub kind_id: i16,
    pub status_id: i16,
    pub service: String,
    pub prompt: String,
    pub parameters: serde_json::Value,
    pub vendor_job_id: Option<String>,
    pub output_url: Option<String>,
    pub output_content: Option<String>,
    pub credits_used: Option<CreditAmount>,
    pub error_message: Option<String>,
    pub cancel_requested: bool,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Generation {
    /// Decoded lifecycle status. Unknown ids are treated as failed so a
    /// corrupted row can never look in-flight.
    pub fn status(&self) -> GenerationStatus {
        GenerationStatus::from_id(self.status_id).unwrap_or(GenerationStatus::Failed)
    }

    /// Decoded generation kind.
    pub fn kind(&self) -> Option<GenerationKind> {
        GenerationKind::from_id(self.kind_id)
    }
}

/// DTO for dispatching a new generation via `POST /generations`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitGeneration {
    pub kind: GenerationKind,
    pub prompt: String,
    /// Vendor-specific parameters passed through opaque to the adapter
    /// (model name, voice id, aspect ratio, ...).
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// Query parameters for `GET /generations`.
#[derive(Debug, Deserialize)]
pub struct GenerationListQuery {
    /// Filter by lifecycle status.
    pub status: Option<GenerationStatus>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// External-facing generation representation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResponse {
    pub id: DbId,
    pub kind: Option<GenerationKind>,
    pub status: GenerationStatus,
    pub service: String,
    pub prompt: String,
    pub parameters: serde_json::Value,
    pub output_url: Option<String>,
    pub output_content: Option<String>,
    pub credits_used: Option<CreditAmount>,
    pub error_message: Option<String>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<Generation> for GenerationResponse {
    fn from(g: Generation) -> Self {
        Self {
            id: g.id,
            kind: g.kind(),
            status: g.status(),
            service: g.service,
            prompt: g.prompt,
            parameters: g.parameters,
            output_url: g.output_url,
            output_content: g.output_content,
            credits_used: g.credits_used,
            error_message: g.error_message,
            started_at: g.started_at,
            completed_at: g.completed_at,
            created_at: g.created_at,
        }
    }
}
