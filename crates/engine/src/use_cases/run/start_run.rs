//! Start run use case.
//!
//! Opens a fresh run on a published dungeon, positioned at step 1. At most
//! one active run per (player, dungeon) pair; the storage layer backs the
//! pre-check with a uniqueness constraint so races collapse to one winner.

use std::sync::Arc;

use dungeons_domain::{DungeonId, DungeonStatus, PlayerId, Run};

use crate::infrastructure::ports::{ClockPort, DungeonRepo, PlayerRepo, RepoError, RunRepo};

use super::error::RunError;

pub struct StartRun {
    dungeon_repo: Arc<dyn DungeonRepo>,
    player_repo: Arc<dyn PlayerRepo>,
    run_repo: Arc<dyn RunRepo>,
    clock: Arc<dyn ClockPort>,
}

impl StartRun {
    pub fn new(
        dungeon_repo: Arc<dyn DungeonRepo>,
        player_repo: Arc<dyn PlayerRepo>,
        run_repo: Arc<dyn RunRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            dungeon_repo,
            player_repo,
            run_repo,
            clock,
        }
    }

    pub async fn execute(
        &self,
        player_id: PlayerId,
        dungeon_id: DungeonId,
    ) -> Result<Run, RunError> {
        let dungeon = self
            .dungeon_repo
            .get(dungeon_id)
            .await?
            .ok_or(RunError::DungeonNotFound)?;
        if dungeon.status != DungeonStatus::Published {
            return Err(RunError::DungeonNotPublished);
        }

        self.player_repo
            .get(player_id)
            .await?
            .ok_or(RunError::PlayerNotFound)?;

        if self.run_repo.has_active(player_id, dungeon_id).await? {
            return Err(RunError::ActiveRunExists);
        }

        let run = Run::start(player_id, dungeon_id, self.clock.now());
        match self.run_repo.create(&run).await {
            Ok(()) => {}
            // Lost a race against a concurrent start; same outcome as the
            // pre-check.
            Err(RepoError::Duplicate(_)) => return Err(RunError::ActiveRunExists),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            run_id = %run.id,
            player_id = %player_id,
            dungeon_id = %dungeon_id,
            "Run started"
        );

        Ok(run)
    }
}
