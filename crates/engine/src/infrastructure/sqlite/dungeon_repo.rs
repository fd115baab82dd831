//! SQLite-backed dungeon and boss step storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dungeons_domain::{
    BossLocation, BossStep, Dungeon, DungeonId, DungeonStatus, PageParams, Rewards, StepId,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{map_write_err, parse_enum, parse_id, parse_timestamp};
use crate::infrastructure::ports::{DungeonRepo, RepoError};

const DUNGEON_COLUMNS: &str =
    "id, title, description, area_name, created_by, status, created_at, updated_at";
const STEP_COLUMNS: &str = "id, dungeon_id, ord, name, lat, lon, radius_m, zone_description, \
     difficulty, reward_gold, reward_items_json, created_at, updated_at";

// Temporary shift applied during reorders so the (dungeon_id, ord) unique
// constraint never trips mid-update.
const REORDER_SHIFT: i64 = 1_000_000;

pub struct SqliteDungeonRepo {
    pool: SqlitePool,
}

impl SqliteDungeonRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_dungeon(row: &SqliteRow, operation: &str) -> Result<Dungeon, RepoError> {
    let id: String = row.get("id");
    let created_by: String = row.get("created_by");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    Ok(Dungeon {
        id: parse_id(&id, operation)?,
        title: row.get("title"),
        description: row.get("description"),
        area_name: row.get("area_name"),
        created_by: parse_id(&created_by, operation)?,
        status: parse_enum::<DungeonStatus>(&status, operation)?,
        created_at: parse_timestamp(&created_at, operation)?,
        updated_at: parse_timestamp(&updated_at, operation)?,
    })
}

fn row_to_step(row: &SqliteRow, operation: &str) -> Result<BossStep, RepoError> {
    let id: String = row.get("id");
    let dungeon_id: String = row.get("dungeon_id");
    let reward_items_json: String = row.get("reward_items_json");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    let reward_items = serde_json::from_str(&reward_items_json)
        .map_err(|e| RepoError::serialization(format!("reward items: {}", e)))?;

    Ok(BossStep {
        id: parse_id(&id, operation)?,
        dungeon_id: parse_id(&dungeon_id, operation)?,
        order: row.get::<i64, _>("ord") as u32,
        name: row.get("name"),
        location: BossLocation {
            lat: row.get("lat"),
            lon: row.get("lon"),
            radius_meters: row.get("radius_m"),
        },
        zone_description: row.get("zone_description"),
        difficulty: row.get::<i64, _>("difficulty") as u8,
        rewards: Rewards {
            gold: row.get("reward_gold"),
            items: reward_items,
        },
        created_at: parse_timestamp(&created_at, operation)?,
        updated_at: parse_timestamp(&updated_at, operation)?,
    })
}

fn encode_reward_items(step: &BossStep) -> Result<String, RepoError> {
    serde_json::to_string(&step.rewards.items)
        .map_err(|e| RepoError::serialization(format!("reward items: {}", e)))
}

#[async_trait]
impl DungeonRepo for SqliteDungeonRepo {
    async fn get(&self, id: DungeonId) -> Result<Option<Dungeon>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM dungeons WHERE id = ?",
            DUNGEON_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_dungeon", e))?;

        row.map(|r| row_to_dungeon(&r, "get_dungeon")).transpose()
    }

    async fn create(&self, dungeon: &Dungeon) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO dungeons (id, title, description, area_name, created_by, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(dungeon.id.to_string())
        .bind(&dungeon.title)
        .bind(&dungeon.description)
        .bind(&dungeon.area_name)
        .bind(dungeon.created_by.to_string())
        .bind(dungeon.status.as_str())
        .bind(dungeon.created_at.to_rfc3339())
        .bind(dungeon.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|e| RepoError::database("create_dungeon", e))
    }

    async fn update(&self, dungeon: &Dungeon) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE dungeons
            SET title = ?, description = ?, area_name = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&dungeon.title)
        .bind(&dungeon.description)
        .bind(&dungeon.area_name)
        .bind(dungeon.status.as_str())
        .bind(dungeon.updated_at.to_rfc3339())
        .bind(dungeon.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("update_dungeon", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("dungeon", dungeon.id));
        }
        Ok(())
    }

    async fn list_published(&self, params: PageParams) -> Result<Vec<Dungeon>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM dungeons WHERE status = 'published' ORDER BY created_at DESC LIMIT ? OFFSET ?",
            DUNGEON_COLUMNS
        ))
        .bind(params.limit() as i64)
        .bind(params.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_published", e))?;

        rows.iter()
            .map(|r| row_to_dungeon(r, "list_published"))
            .collect()
    }

    async fn get_step(
        &self,
        dungeon_id: DungeonId,
        step_id: StepId,
    ) -> Result<Option<BossStep>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM boss_steps WHERE dungeon_id = ? AND id = ?",
            STEP_COLUMNS
        ))
        .bind(dungeon_id.to_string())
        .bind(step_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_step", e))?;

        row.map(|r| row_to_step(&r, "get_step")).transpose()
    }

    async fn list_steps(&self, dungeon_id: DungeonId) -> Result<Vec<BossStep>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM boss_steps WHERE dungeon_id = ? ORDER BY ord",
            STEP_COLUMNS
        ))
        .bind(dungeon_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_steps", e))?;

        rows.iter().map(|r| row_to_step(r, "list_steps")).collect()
    }

    async fn create_step(&self, step: &BossStep) -> Result<(), RepoError> {
        let reward_items_json = encode_reward_items(step)?;

        sqlx::query(
            r#"
            INSERT INTO boss_steps (id, dungeon_id, ord, name, lat, lon, radius_m,
                                    zone_description, difficulty, reward_gold,
                                    reward_items_json, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(step.id.to_string())
        .bind(step.dungeon_id.to_string())
        .bind(step.order as i64)
        .bind(&step.name)
        .bind(step.location.lat)
        .bind(step.location.lon)
        .bind(step.location.radius_meters)
        .bind(&step.zone_description)
        .bind(step.difficulty as i64)
        .bind(step.rewards.gold)
        .bind(reward_items_json)
        .bind(step.created_at.to_rfc3339())
        .bind(step.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|e| map_write_err("create_step", "step order slot", e))
    }

    async fn update_step(&self, step: &BossStep) -> Result<(), RepoError> {
        let reward_items_json = encode_reward_items(step)?;

        let result = sqlx::query(
            r#"
            UPDATE boss_steps
            SET ord = ?, name = ?, lat = ?, lon = ?, radius_m = ?, zone_description = ?,
                difficulty = ?, reward_gold = ?, reward_items_json = ?, updated_at = ?
            WHERE id = ? AND dungeon_id = ?
            "#,
        )
        .bind(step.order as i64)
        .bind(&step.name)
        .bind(step.location.lat)
        .bind(step.location.lon)
        .bind(step.location.radius_meters)
        .bind(&step.zone_description)
        .bind(step.difficulty as i64)
        .bind(step.rewards.gold)
        .bind(reward_items_json)
        .bind(step.updated_at.to_rfc3339())
        .bind(step.id.to_string())
        .bind(step.dungeon_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_err("update_step", "step order slot", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("boss_step", step.id));
        }
        Ok(())
    }

    async fn reorder_steps(
        &self,
        dungeon_id: DungeonId,
        orders: Vec<(StepId, u32)>,
        now: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("reorder_steps", e))?;

        sqlx::query("UPDATE boss_steps SET ord = ord + ? WHERE dungeon_id = ?")
            .bind(REORDER_SHIFT)
            .bind(dungeon_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("reorder_steps", e))?;

        for (step_id, order) in orders {
            let result = sqlx::query(
                "UPDATE boss_steps SET ord = ?, updated_at = ? WHERE id = ? AND dungeon_id = ?",
            )
            .bind(order as i64)
            .bind(now.to_rfc3339())
            .bind(step_id.to_string())
            .bind(dungeon_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("reorder_steps", e))?;

            if result.rows_affected() == 0 {
                return Err(RepoError::not_found("boss_step", step_id));
            }
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::database("reorder_steps", e))
    }
}
