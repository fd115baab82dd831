use std::sync::Arc;

use dungeons_domain::{InventoryEntry, PageParams, Player, PlayerId, Role};

use crate::infrastructure::ports::{InventoryRepo, PlayerRepo};

use super::error::PlayerError;

/// Read side of the player area: own profile, other profiles (owner or mj),
/// the account listing and the inventory view.
pub struct PlayerQueries {
    player_repo: Arc<dyn PlayerRepo>,
    inventory_repo: Arc<dyn InventoryRepo>,
}

impl PlayerQueries {
    pub fn new(player_repo: Arc<dyn PlayerRepo>, inventory_repo: Arc<dyn InventoryRepo>) -> Self {
        Self {
            player_repo,
            inventory_repo,
        }
    }

    pub async fn me(&self, player_id: PlayerId) -> Result<Player, PlayerError> {
        self.player_repo
            .get(player_id)
            .await?
            .ok_or(PlayerError::PlayerNotFound)
    }

    /// Another player's profile; only the owner and mj accounts may read it.
    pub async fn get(
        &self,
        caller_id: PlayerId,
        caller_role: Role,
        player_id: PlayerId,
    ) -> Result<Player, PlayerError> {
        if caller_id != player_id && caller_role != Role::Mj {
            return Err(PlayerError::NotAllowed);
        }
        self.player_repo
            .get(player_id)
            .await?
            .ok_or(PlayerError::PlayerNotFound)
    }

    pub async fn list(&self, params: PageParams) -> Result<Vec<Player>, PlayerError> {
        Ok(self.player_repo.list(params).await?)
    }

    pub async fn inventory(&self, player_id: PlayerId) -> Result<Vec<InventoryEntry>, PlayerError> {
        Ok(self.inventory_repo.list_for_player(player_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockInventoryRepo, MockPlayerRepo};
    use crate::test_fixtures::test_player;
    use chrono::Utc;
    use dungeons_domain::ItemId;

    fn queries(player_repo: MockPlayerRepo, inventory_repo: MockInventoryRepo) -> PlayerQueries {
        PlayerQueries::new(Arc::new(player_repo), Arc::new(inventory_repo))
    }

    #[tokio::test]
    async fn when_me_is_missing_returns_not_found() {
        let mut player_repo = MockPlayerRepo::new();
        player_repo.expect_get().returning(|_| Ok(None));

        let result = queries(player_repo, MockInventoryRepo::new())
            .me(PlayerId::new())
            .await;

        assert!(matches!(result, Err(PlayerError::PlayerNotFound)));
    }

    #[tokio::test]
    async fn when_reading_foreign_profile_as_player_returns_forbidden() {
        let result = queries(MockPlayerRepo::new(), MockInventoryRepo::new())
            .get(PlayerId::new(), Role::Player, PlayerId::new())
            .await;

        assert!(matches!(result, Err(PlayerError::NotAllowed)));
    }

    #[tokio::test]
    async fn when_reading_foreign_profile_as_mj_it_is_returned() {
        let mut player_repo = MockPlayerRepo::new();
        player_repo.expect_get().returning(|id| {
            let mut player = test_player(Role::Player, 42);
            player.id = id;
            Ok(Some(player))
        });

        let player = queries(player_repo, MockInventoryRepo::new())
            .get(PlayerId::new(), Role::Mj, PlayerId::new())
            .await
            .unwrap();

        assert_eq!(player.gold, 42);
    }

    #[tokio::test]
    async fn when_inventory_has_stacks_they_are_returned() {
        let mut inventory_repo = MockInventoryRepo::new();
        inventory_repo.expect_list_for_player().returning(|player_id| {
            Ok(vec![InventoryEntry {
                player_id,
                item_id: ItemId::new(),
                qty: 5,
                updated_at: Utc::now(),
            }])
        });

        let entries = queries(MockPlayerRepo::new(), inventory_repo)
            .inventory(PlayerId::new())
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].qty, 5);
    }
}
