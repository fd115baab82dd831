//! Shared types for run operations.

use dungeons_domain::{Player, Rewards, Run, RunId, StepId};
use serde::{Deserialize, Serialize};

/// Settled result of a step attempt.
///
/// The exact struct is serialized into the attempt record when the attempt
/// first settles; replays deserialize it and flip `idempotent_replay`, so a
/// retried request observes the world exactly as it was at settlement time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOutcome {
    pub run_id: RunId,
    pub step_id: StepId,
    pub distance_meters: f64,
    pub rewards: Rewards,
    pub run: Run,
    pub player: Player,
    pub idempotent_replay: bool,
}
