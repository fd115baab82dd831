//! Run read operations.

use std::sync::Arc;

use dungeons_domain::{PageParams, PlayerId, Run, RunId};

use crate::infrastructure::ports::RunRepo;

use super::error::RunError;

/// Read side of runs. Runs are private: a player only ever sees their own.
pub struct RunQueries {
    run_repo: Arc<dyn RunRepo>,
}

impl RunQueries {
    pub fn new(run_repo: Arc<dyn RunRepo>) -> Self {
        Self { run_repo }
    }

    pub async fn get(&self, player_id: PlayerId, run_id: RunId) -> Result<Run, RunError> {
        let run = self
            .run_repo
            .get(run_id)
            .await?
            .ok_or(RunError::RunNotFound)?;
        if run.player_id != player_id {
            return Err(RunError::NotRunOwner);
        }
        Ok(run)
    }

    pub async fn list(
        &self,
        player_id: PlayerId,
        params: PageParams,
    ) -> Result<Vec<Run>, RunError> {
        Ok(self.run_repo.list_by_player(player_id, params).await?)
    }
}
