//! Account registration.

use std::sync::Arc;

use dungeons_domain::{Player, Role};

use crate::infrastructure::auth::{hash_password, AuthTokens};
use crate::infrastructure::ports::{ClockPort, PlayerRepo};

use super::error::PlayerError;
use super::types::AuthSession;

pub struct Register {
    player_repo: Arc<dyn PlayerRepo>,
    tokens: Arc<AuthTokens>,
    clock: Arc<dyn ClockPort>,
}

impl Register {
    pub fn new(
        player_repo: Arc<dyn PlayerRepo>,
        tokens: Arc<AuthTokens>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            player_repo,
            tokens,
            clock,
        }
    }

    /// Creates the account with an empty wallet and signs a first session
    /// token. A taken email surfaces as [`PlayerError::EmailTaken`].
    pub async fn execute(
        &self,
        display_name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<AuthSession, PlayerError> {
        let now = self.clock.now();
        let player = Player::new(display_name, email, hash_password(password), role, now);

        match self.player_repo.create(&player).await {
            Ok(()) => {}
            Err(e) if e.is_duplicate() => return Err(PlayerError::EmailTaken),
            Err(e) => return Err(e.into()),
        }

        let token = self.tokens.issue(player.id, player.role, now)?;

        tracing::info!(player_id = %player.id, role = %player.role, "Player registered");

        Ok(AuthSession { token, player })
    }
}
