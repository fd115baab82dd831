//! Attempt step use case.
//!
//! The heart of the game loop: a player standing inside a boss geofence
//! submits an attempt and, on success, atomically collects the reward and
//! advances the run. Every attempt carries a client idempotency key; the
//! idempotency record is keyed by (run, step), so a step can settle exactly
//! once and retries of the settled request replay the stored response.
//!
//! Replay detection runs before the state, order and geofence gates: a
//! retry of an already-settled attempt must see the original response even
//! though the run has advanced past the step (or completed) since.

use std::sync::Arc;

use dungeons_domain::{haversine_distance_m, AttemptRecord, PlayerId, RunId, RunState, StepId};

use crate::infrastructure::ports::{ClockPort, DungeonRepo, LedgerPort, RepoError, RunRepo};

use super::error::RunError;
use super::types::AttemptOutcome;

pub struct AttemptStep {
    run_repo: Arc<dyn RunRepo>,
    dungeon_repo: Arc<dyn DungeonRepo>,
    ledger: Arc<dyn LedgerPort>,
    clock: Arc<dyn ClockPort>,
}

impl AttemptStep {
    pub fn new(
        run_repo: Arc<dyn RunRepo>,
        dungeon_repo: Arc<dyn DungeonRepo>,
        ledger: Arc<dyn LedgerPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            run_repo,
            dungeon_repo,
            ledger,
            clock,
        }
    }

    pub async fn execute(
        &self,
        player_id: PlayerId,
        run_id: RunId,
        step_id: StepId,
        lat: f64,
        lon: f64,
        idempotency_key: String,
    ) -> Result<AttemptOutcome, RunError> {
        let run = self
            .run_repo
            .get(run_id)
            .await?
            .ok_or(RunError::RunNotFound)?;
        if run.player_id != player_id {
            return Err(RunError::NotRunOwner);
        }

        let step = self
            .dungeon_repo
            .get_step(run.dungeon_id, step_id)
            .await?
            .ok_or(RunError::StepNotFound)?;

        if let Some(existing) = self.run_repo.get_attempt_record(run_id, step_id).await? {
            return replay_outcome(&existing, &idempotency_key);
        }

        if run.state != RunState::Active {
            return Err(RunError::RunNotActive);
        }
        if step.order != run.current_step {
            return Err(RunError::WrongStepOrder {
                expected: run.current_step,
                got: step.order,
            });
        }

        let distance = haversine_distance_m(lat, lon, step.location.lat, step.location.lon);
        if distance > step.location.radius_meters {
            return Err(RunError::NotInRange {
                distance_m: distance,
                radius_m: step.location.radius_meters,
            });
        }

        let total_steps = self.dungeon_repo.list_steps(run.dungeon_id).await?.len() as u32;
        let now = self.clock.now();
        let record = AttemptRecord::pending(run_id, step_id, player_id, &idempotency_key, now);

        let mut tx = self.ledger.begin().await?;
        match tx.insert_attempt_record(&record).await {
            Ok(()) => {}
            Err(RepoError::Duplicate(_)) => {
                // Another request settled this step between our replay check
                // and the insert. Roll back and serve their stored response.
                drop(tx);
                let existing = self
                    .run_repo
                    .get_attempt_record(run_id, step_id)
                    .await?
                    .ok_or(RunError::AlreadyHandled)?;
                return replay_outcome(&existing, &idempotency_key);
            }
            Err(e) => return Err(e.into()),
        }

        let player = tx.credit_gold(player_id, step.rewards.gold, now).await?;
        for item in &step.rewards.items {
            tx.add_item(player_id, item.item_id, item.qty, now).await?;
        }

        let expected_step = run.current_step;
        let mut updated_run = run;
        updated_run.record_kill(step_id, record.id, total_steps, now);
        tx.replace_run(&updated_run, expected_step).await?;

        let outcome = AttemptOutcome {
            run_id,
            step_id,
            distance_meters: distance,
            rewards: step.rewards.clone(),
            run: updated_run,
            player,
            idempotent_replay: false,
        };
        let response_json = serde_json::to_string(&outcome)
            .map_err(|e| RepoError::serialization(format!("attempt response: {}", e)))?;
        tx.finalize_attempt_record(record.id, &response_json).await?;
        tx.commit().await?;

        tracing::info!(
            run_id = %run_id,
            step_id = %step_id,
            player_id = %player_id,
            distance_m = distance,
            gold = step.rewards.gold,
            completed = outcome.run.state == RunState::Completed,
            "Step attempt settled"
        );

        Ok(outcome)
    }
}

/// Serves a stored attempt back to the caller, provided the request carries
/// the key that originally settled it. A pending record (reward not applied
/// yet) means another request is mid-settlement and is never replayed.
fn replay_outcome(record: &AttemptRecord, idempotency_key: &str) -> Result<AttemptOutcome, RunError> {
    if record.idempotency_key != idempotency_key {
        return Err(RunError::AlreadyHandled);
    }
    let Some(json) = record.response_json.as_deref().filter(|_| record.reward_applied) else {
        return Err(RunError::AlreadyHandled);
    };
    let mut outcome: AttemptOutcome = serde_json::from_str(json)
        .map_err(|e| RepoError::serialization(format!("attempt response: {}", e)))?;
    outcome.idempotent_replay = true;
    Ok(outcome)
}
