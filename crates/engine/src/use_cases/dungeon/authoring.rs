//! Dungeon authoring: the mj-side write operations.
//!
//! Every mutation shares the same preamble (load the dungeon, verify the
//! caller authored it), so the operations live on one struct instead of
//! one file each.

use std::collections::HashSet;
use std::sync::Arc;

use dungeons_domain::{
    BossLocation, BossStep, Dungeon, DungeonId, DungeonStatus, PlayerId, Rewards, StepId,
};

use crate::infrastructure::ports::{ClockPort, DungeonRepo};

use super::error::DungeonError;

/// Author-supplied step fields. Order is separate: assigned at creation,
/// immutable on update, rewritten only through reorder.
#[derive(Debug, Clone)]
pub struct StepInput {
    pub name: String,
    pub location: BossLocation,
    pub zone_description: String,
    pub difficulty: u8,
    pub rewards: Rewards,
}

pub struct DungeonAuthoring {
    dungeon_repo: Arc<dyn DungeonRepo>,
    clock: Arc<dyn ClockPort>,
}

impl DungeonAuthoring {
    pub fn new(dungeon_repo: Arc<dyn DungeonRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { dungeon_repo, clock }
    }

    pub async fn create(
        &self,
        mj_id: PlayerId,
        title: &str,
        description: &str,
        area_name: &str,
    ) -> Result<Dungeon, DungeonError> {
        let dungeon = Dungeon::draft(mj_id, title, description, area_name, self.clock.now());
        self.dungeon_repo.create(&dungeon).await?;

        tracing::info!(dungeon_id = %dungeon.id, mj_id = %mj_id, "Dungeon created");

        Ok(dungeon)
    }

    pub async fn update(
        &self,
        mj_id: PlayerId,
        dungeon_id: DungeonId,
        title: &str,
        description: &str,
        area_name: &str,
    ) -> Result<Dungeon, DungeonError> {
        let mut dungeon = self.owned(mj_id, dungeon_id).await?;
        dungeon.title = title.to_string();
        dungeon.description = description.to_string();
        dungeon.area_name = area_name.to_string();
        dungeon.updated_at = self.clock.now();
        self.dungeon_repo.update(&dungeon).await?;
        Ok(dungeon)
    }

    /// Publishing requires at least one step and a positive radius on every
    /// step; a published dungeon is visible in the catalog and startable.
    pub async fn publish(
        &self,
        mj_id: PlayerId,
        dungeon_id: DungeonId,
    ) -> Result<Dungeon, DungeonError> {
        let mut dungeon = self.owned(mj_id, dungeon_id).await?;

        let steps = self.dungeon_repo.list_steps(dungeon_id).await?;
        if steps.is_empty() {
            return Err(DungeonError::NoSteps);
        }
        if steps.iter().any(|s| s.location.radius_meters <= 0.0) {
            return Err(DungeonError::InvalidRadius);
        }

        dungeon.status = DungeonStatus::Published;
        dungeon.updated_at = self.clock.now();
        self.dungeon_repo.update(&dungeon).await?;

        tracing::info!(dungeon_id = %dungeon_id, steps = steps.len(), "Dungeon published");

        Ok(dungeon)
    }

    pub async fn archive(
        &self,
        mj_id: PlayerId,
        dungeon_id: DungeonId,
    ) -> Result<Dungeon, DungeonError> {
        let mut dungeon = self.owned(mj_id, dungeon_id).await?;
        dungeon.status = DungeonStatus::Archived;
        dungeon.updated_at = self.clock.now();
        self.dungeon_repo.update(&dungeon).await?;
        Ok(dungeon)
    }

    pub async fn add_step(
        &self,
        mj_id: PlayerId,
        dungeon_id: DungeonId,
        order: u32,
        input: StepInput,
    ) -> Result<BossStep, DungeonError> {
        if input.location.radius_meters <= 0.0 {
            return Err(DungeonError::InvalidRadius);
        }
        self.owned(mj_id, dungeon_id).await?;

        let now = self.clock.now();
        let step = BossStep {
            id: StepId::new(),
            dungeon_id,
            order,
            name: input.name,
            location: input.location,
            zone_description: input.zone_description,
            difficulty: input.difficulty,
            rewards: input.rewards,
            created_at: now,
            updated_at: now,
        };

        match self.dungeon_repo.create_step(&step).await {
            Ok(()) => Ok(step),
            Err(e) if e.is_duplicate() => Err(DungeonError::OrderTaken(order)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_step(
        &self,
        mj_id: PlayerId,
        dungeon_id: DungeonId,
        step_id: StepId,
        input: StepInput,
    ) -> Result<BossStep, DungeonError> {
        if input.location.radius_meters <= 0.0 {
            return Err(DungeonError::InvalidRadius);
        }
        self.owned(mj_id, dungeon_id).await?;

        let mut step = self
            .dungeon_repo
            .get_step(dungeon_id, step_id)
            .await?
            .ok_or(DungeonError::StepNotFound)?;
        step.name = input.name;
        step.location = input.location;
        step.zone_description = input.zone_description;
        step.difficulty = input.difficulty;
        step.rewards = input.rewards;
        step.updated_at = self.clock.now();
        self.dungeon_repo.update_step(&step).await?;
        Ok(step)
    }

    /// Rewrites every step order from the list position (1-based). The id
    /// list must be exactly the dungeon's steps, each once.
    pub async fn reorder_steps(
        &self,
        mj_id: PlayerId,
        dungeon_id: DungeonId,
        step_ids: Vec<StepId>,
    ) -> Result<Vec<BossStep>, DungeonError> {
        self.owned(mj_id, dungeon_id).await?;

        let steps = self.dungeon_repo.list_steps(dungeon_id).await?;
        if steps.len() != step_ids.len() {
            return Err(DungeonError::InvalidReorder);
        }
        let known: HashSet<StepId> = steps.iter().map(|s| s.id).collect();

        let mut seen = HashSet::with_capacity(step_ids.len());
        let mut orders = Vec::with_capacity(step_ids.len());
        for (idx, id) in step_ids.into_iter().enumerate() {
            if !known.contains(&id) || !seen.insert(id) {
                return Err(DungeonError::InvalidReorder);
            }
            orders.push((id, idx as u32 + 1));
        }

        self.dungeon_repo
            .reorder_steps(dungeon_id, orders, self.clock.now())
            .await?;

        Ok(self.dungeon_repo.list_steps(dungeon_id).await?)
    }

    async fn owned(
        &self,
        mj_id: PlayerId,
        dungeon_id: DungeonId,
    ) -> Result<Dungeon, DungeonError> {
        let dungeon = self
            .dungeon_repo
            .get(dungeon_id)
            .await?
            .ok_or(DungeonError::DungeonNotFound)?;
        if dungeon.created_by != mj_id {
            return Err(DungeonError::NotDungeonOwner);
        }
        Ok(dungeon)
    }
}
