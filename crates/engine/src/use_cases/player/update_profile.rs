//! Display name changes, by the owner or an mj.

use std::sync::Arc;

use dungeons_domain::{Player, PlayerId, Role};

use crate::infrastructure::ports::{ClockPort, PlayerRepo};

use super::error::PlayerError;

pub struct UpdateProfile {
    player_repo: Arc<dyn PlayerRepo>,
    clock: Arc<dyn ClockPort>,
}

impl UpdateProfile {
    pub fn new(player_repo: Arc<dyn PlayerRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { player_repo, clock }
    }

    pub async fn execute(
        &self,
        caller_id: PlayerId,
        caller_role: Role,
        player_id: PlayerId,
        display_name: &str,
    ) -> Result<Player, PlayerError> {
        if caller_id != player_id && caller_role != Role::Mj {
            return Err(PlayerError::NotAllowed);
        }

        let mut player = self
            .player_repo
            .get(player_id)
            .await?
            .ok_or(PlayerError::PlayerNotFound)?;

        player.display_name = display_name.to_string();
        player.updated_at = self.clock.now();
        self.player_repo.update(&player).await?;

        Ok(player)
    }
}
