use std::sync::Arc;

use dungeons_domain::{BossStep, Dungeon, DungeonId, DungeonStatus, PageParams};

use crate::infrastructure::ports::DungeonRepo;

use super::error::DungeonError;

/// Public, published-only view of the dungeon catalog. Drafts and archived
/// dungeons read as not found through this lens.
pub struct DungeonCatalog {
    dungeon_repo: Arc<dyn DungeonRepo>,
}

impl DungeonCatalog {
    pub fn new(dungeon_repo: Arc<dyn DungeonRepo>) -> Self {
        Self { dungeon_repo }
    }

    pub async fn list_published(&self, params: PageParams) -> Result<Vec<Dungeon>, DungeonError> {
        Ok(self.dungeon_repo.list_published(params).await?)
    }

    /// The dungeon plus its steps ordered by position.
    pub async fn get_published(
        &self,
        dungeon_id: DungeonId,
    ) -> Result<(Dungeon, Vec<BossStep>), DungeonError> {
        let dungeon = self
            .dungeon_repo
            .get(dungeon_id)
            .await?
            .ok_or(DungeonError::DungeonNotFound)?;
        if dungeon.status != DungeonStatus::Published {
            return Err(DungeonError::DungeonNotFound);
        }
        let steps = self.dungeon_repo.list_steps(dungeon_id).await?;
        Ok((dungeon, steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockDungeonRepo;
    use crate::test_fixtures::{test_dungeon, test_step};
    use dungeons_domain::PlayerId;

    #[tokio::test]
    async fn when_dungeon_is_draft_public_read_returns_not_found() {
        let mut dungeon_repo = MockDungeonRepo::new();
        dungeon_repo.expect_get().returning(|id| {
            let mut dungeon = test_dungeon(PlayerId::new(), DungeonStatus::Draft);
            dungeon.id = id;
            Ok(Some(dungeon))
        });

        let catalog = DungeonCatalog::new(Arc::new(dungeon_repo));
        let result = catalog.get_published(DungeonId::new()).await;

        assert!(matches!(result, Err(DungeonError::DungeonNotFound)));
    }

    #[tokio::test]
    async fn when_dungeon_is_published_steps_come_along() {
        let mut dungeon_repo = MockDungeonRepo::new();
        dungeon_repo.expect_get().returning(|id| {
            let mut dungeon = test_dungeon(PlayerId::new(), DungeonStatus::Published);
            dungeon.id = id;
            Ok(Some(dungeon))
        });
        dungeon_repo
            .expect_list_steps()
            .returning(|dungeon_id| Ok(vec![test_step(dungeon_id, 1), test_step(dungeon_id, 2)]));

        let catalog = DungeonCatalog::new(Arc::new(dungeon_repo));
        let (dungeon, steps) = catalog.get_published(DungeonId::new()).await.unwrap();

        assert_eq!(dungeon.status, DungeonStatus::Published);
        assert_eq!(steps.len(), 2);
    }

    #[tokio::test]
    async fn when_listing_only_published_dungeons_flow_through() {
        let mut dungeon_repo = MockDungeonRepo::new();
        dungeon_repo
            .expect_list_published()
            .returning(|_| Ok(vec![test_dungeon(PlayerId::new(), DungeonStatus::Published)]));

        let catalog = DungeonCatalog::new(Arc::new(dungeon_repo));
        let dungeons = catalog.list_published(PageParams::default()).await.unwrap();

        assert_eq!(dungeons.len(), 1);
    }
}
