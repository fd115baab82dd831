//! Attempt idempotency record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AttemptId, PlayerId, RunId, StepId};

/// Durable de-duplication record for step attempts, unique per (run, step).
///
/// Written in pending form (`reward_applied = false`, no response) before any
/// ledger mutation, inside the same transaction that settles the attempt.
/// Only after the settlement writes succeed is it finalized with the encoded
/// response and `reward_applied = true`, so a crash mid-settlement rolls the
/// whole attempt back and a retry starts clean.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub id: AttemptId,
    pub run_id: RunId,
    pub step_id: StepId,
    pub player_id: PlayerId,
    pub idempotency_key: String,
    pub reward_applied: bool,
    /// JSON-encoded settled response, absent until finalized.
    pub response_json: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AttemptRecord {
    /// Creates the pending marker inserted before any reward is granted.
    pub fn pending(
        run_id: RunId,
        step_id: StepId,
        player_id: PlayerId,
        idempotency_key: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AttemptId::new(),
            run_id,
            step_id,
            player_id,
            idempotency_key: idempotency_key.into(),
            reward_applied: false,
            response_json: None,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_record_has_no_response() {
        let record = AttemptRecord::pending(
            RunId::new(),
            StepId::new(),
            PlayerId::new(),
            "key-12345678",
            Utc::now(),
        );
        assert!(!record.reward_applied);
        assert!(record.response_json.is_none());
    }
}
