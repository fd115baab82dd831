//! Credential check and session issuing.

use std::sync::Arc;

use crate::infrastructure::auth::{verify_password, AuthTokens};
use crate::infrastructure::ports::{ClockPort, PlayerRepo};

use super::error::PlayerError;
use super::types::AuthSession;

pub struct Login {
    player_repo: Arc<dyn PlayerRepo>,
    tokens: Arc<AuthTokens>,
    clock: Arc<dyn ClockPort>,
}

impl Login {
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

    pub async fn execute(&self, email: &str, password: &str) -> Result<AuthSession, PlayerError> {
        let player = self
            .player_repo
            .get_by_email(email)
            .await?
            .ok_or(PlayerError::PlayerNotFound)?;

        if !verify_password(password, &player.password_hash) {
            return Err(PlayerError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(player.id, player.role, self.clock.now())?;

        Ok(AuthSession { token, player })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::auth::hash_password;
    use crate::infrastructure::ports::{MockClockPort, MockPlayerRepo};
    use crate::test_fixtures::test_player;
    use chrono::{Duration, Utc};
    use dungeons_domain::Role;

    fn fixed_clock() -> MockClockPort {
        let mut clock = MockClockPort::new();
        clock.expect_now().returning(Utc::now);
        clock
    }

    fn tokens() -> Arc<AuthTokens> {
        Arc::new(AuthTokens::new("test-secret", Duration::minutes(60)))
    }

    #[tokio::test]
    async fn when_email_unknown_returns_not_found() {
        let mut player_repo = MockPlayerRepo::new();
        player_repo.expect_get_by_email().returning(|_| Ok(None));

        let use_case = Login::new(Arc::new(player_repo), tokens(), Arc::new(fixed_clock()));
        let result = use_case.execute("ghost@example.com", "Password123!").await;

        assert!(matches!(result, Err(PlayerError::PlayerNotFound)));
    }

    #[tokio::test]
    async fn when_password_wrong_returns_unauthorized() {
        let mut player_repo = MockPlayerRepo::new();
        player_repo.expect_get_by_email().returning(|_| {
            let mut player = test_player(Role::Player, 100);
            player.password_hash = hash_password("Password123!");
            Ok(Some(player))
        });

        let use_case = Login::new(Arc::new(player_repo), tokens(), Arc::new(fixed_clock()));
        let result = use_case.execute("ada@example.com", "WrongPass99!").await;

        assert!(matches!(result, Err(PlayerError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn when_credentials_match_issues_verifiable_token() {
        let mut player_repo = MockPlayerRepo::new();
        player_repo.expect_get_by_email().returning(|_| {
            let mut player = test_player(Role::Mj, 100);
            player.password_hash = hash_password("Password123!");
            Ok(Some(player))
        });

        let auth = tokens();
        let use_case = Login::new(Arc::new(player_repo), auth.clone(), Arc::new(fixed_clock()));
        let session = use_case
            .execute("ada@example.com", "Password123!")
            .await
            .unwrap();

        let claims = auth.verify(&session.token).unwrap();
        assert_eq!(claims.sub, session.player.id.to_string());
        assert_eq!(claims.role, Role::Mj);
    }
}
