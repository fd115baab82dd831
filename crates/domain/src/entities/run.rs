//! Run entity - one player's traversal of one dungeon.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{AttemptId, DungeonId, PlayerId, RunId, StepId};

/// Lifecycle of a run.
///
/// `Abandoned` is a valid terminal value with no trigger in the current
/// engine; it exists so stored runs can already carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Active,
    Completed,
    Abandoned,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Active => "active",
            RunState::Completed => "completed",
            RunState::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RunState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RunState::Active),
            "completed" => Ok(RunState::Completed),
            "abandoned" => Ok(RunState::Abandoned),
            other => Err(DomainError::parse(format!("unknown run state: {}", other))),
        }
    }
}

/// Record of one cleared step inside a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KilledStep {
    pub boss_step_id: StepId,
    pub killed_at: DateTime<Utc>,
    pub attempt_id: AttemptId,
}

/// A player's traversal of a dungeon's ordered steps.
///
/// `current_step` is the 1-based ordinal of the next step to clear; it only
/// moves forward, one successful attempt at a time. At most one active run
/// exists per (player, dungeon) pair; the storage layer enforces this with a
/// uniqueness constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: RunId,
    pub dungeon_id: DungeonId,
    pub player_id: PlayerId,
    pub state: RunState,
    pub current_step: u32,
    pub killed_steps: Vec<KilledStep>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Run {
    /// Starts a fresh run at the first step.
    pub fn start(player_id: PlayerId, dungeon_id: DungeonId, now: DateTime<Utc>) -> Self {
        Self {
            id: RunId::new(),
            dungeon_id,
            player_id,
            state: RunState::Active,
            current_step: 1,
            killed_steps: Vec::new(),
            started_at: now,
            ended_at: None,
            updated_at: now,
        }
    }

    /// Applies a successful attempt: appends the kill, advances the current
    /// step and completes the run once every step is cleared.
    pub fn record_kill(
        &mut self,
        step_id: StepId,
        attempt_id: AttemptId,
        total_steps: u32,
        now: DateTime<Utc>,
    ) {
        self.killed_steps.push(KilledStep {
            boss_step_id: step_id,
            killed_at: now,
            attempt_id,
        });
        self.current_step += 1;
        if self.current_step > total_steps {
            self.state = RunState::Completed;
            self.ended_at = Some(now);
        }
        self.updated_at = now;
    }
}
