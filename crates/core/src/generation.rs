//! Generation lifecycle rules.
//!
//! A generation record moves through queued → processing → completed|failed.
//! Transitions are monotonic: once a record reaches a terminal state it is
//! immutable. Repositories enforce this with status guards on every UPDATE;
//! the rule table here is the single source of truth for what is legal.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// What kind of output a generation produces. Determines the vendor adapter
/// used, whether the call is synchronous, and the credit cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    /// Text content (marketing copy); synchronous vendor call.
    Content,
    /// Text-to-speech audio; synchronous vendor call.
    Audio,
    /// Video; asynchronous vendor job driven by the worker.
    Video,
}

impl GenerationKind {
    /// Database discriminant (SMALLINT, 1-based).
    pub fn id(self) -> i16 {
        match self {
            GenerationKind::Content => 1,
            GenerationKind::Audio => 2,
            GenerationKind::Video => 3,
        }
    }

    /// Inverse of [`id`](Self::id).
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(GenerationKind::Content),
            2 => Some(GenerationKind::Audio),
            3 => Some(GenerationKind::Video),
            _ => None,
        }
    }

    /// Whether generations of this kind complete within the request, as
    /// opposed to being queued for the worker.
    pub fn is_synchronous(self) -> bool {
        !matches!(self, GenerationKind::Video)
    }
}

/// Lifecycle status of a generation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl GenerationStatus {
    /// Database discriminant (SMALLINT, 1-based).
    pub fn id(self) -> i16 {
        match self {
            GenerationStatus::Queued => 1,
            GenerationStatus::Processing => 2,
            GenerationStatus::Completed => 3,
            GenerationStatus::Failed => 4,
        }
    }

    /// Inverse of [`id`](Self::id).
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(GenerationStatus::Queued),
            2 => Some(GenerationStatus::Processing),
            3 => Some(GenerationStatus::Completed),
            4 => Some(GenerationStatus::Failed),
            _ => None,
        }
    }

    /// Lowercase name as used in API payloads and log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationStatus::Queued => "queued",
            GenerationStatus::Processing => "processing",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Failed => "failed",
        }
    }

    /// Completed and failed records never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, GenerationStatus::Completed | GenerationStatus::Failed)
    }
}

/// Whether a status transition is legal.
///
/// Legal transitions: queued → processing, processing → completed|failed,
/// and queued → failed (a job can be rejected before it is ever claimed,
/// e.g. no vendor credential configured). Everything else is forbidden,
/// in particular any transition out of a terminal state.
pub fn can_transition(from: GenerationStatus, to: GenerationStatus) -> bool {
    use GenerationStatus::*;
    matches!(
        (from, to),
        (Queued, Processing) | (Processing, Completed) | (Processing, Failed) | (Queued, Failed)
    )
}

/// Validate a requested transition, yielding a conflict error when illegal.
pub fn validate_transition(
    from: GenerationStatus,
    to: GenerationStatus,
) -> Result<(), CoreError> {
    if !can_transition(from, to) {
        return Err(CoreError::Conflict(format!(
            "Illegal generation transition {from:?} -> {to:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use GenerationStatus::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(can_transition(Queued, Processing));
        assert!(can_transition(Processing, Completed));
        assert!(can_transition(Processing, Failed));
        assert!(can_transition(Queued, Failed));
    }

    #[test]
    fn test_terminal_states_are_immutable() {
        for terminal in [Completed, Failed] {
            for to in [Queued, Processing, Completed, Failed] {
                assert!(
                    !can_transition(terminal, to),
                    "terminal {terminal:?} must not transition to {to:?}"
                );
            }
        }
    }

    #[test]
    fn test_no_backwards_transition() {
        assert!(!can_transition(Processing, Queued));
        assert_matches!(
            validate_transition(Completed, Processing),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn test_id_round_trip() {
        for status in [Queued, Processing, Completed, Failed] {
            assert_eq!(GenerationStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(GenerationStatus::from_id(0), None);
        assert_eq!(GenerationStatus::from_id(5), None);
    }

    #[test]
    fn test_kind_sync_split() {
        assert!(GenerationKind::Content.is_synchronous());
        assert!(GenerationKind::Audio.is_synchronous());
        assert!(!GenerationKind::Video.is_synchronous());
    }
}
