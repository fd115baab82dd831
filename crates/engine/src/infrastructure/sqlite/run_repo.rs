//! SQLite-backed run and attempt storage.

use async_trait::async_trait;
use dungeons_domain::{AttemptRecord, DungeonId, PageParams, PlayerId, Run, RunId, RunState, StepId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{map_write_err, parse_enum, parse_id, parse_timestamp, parse_timestamp_opt};
use crate::infrastructure::ports::{RepoError, RunRepo};

const RUN_COLUMNS: &str =
    "id, dungeon_id, player_id, state, current_step, killed_steps_json, started_at, ended_at, updated_at";
const ATTEMPT_COLUMNS: &str =
    "id, run_id, step_id, player_id, idempotency_key, reward_applied, response_json, created_at";

pub struct SqliteRunRepo {
    pool: SqlitePool,
}

impl SqliteRunRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_run(row: &SqliteRow, operation: &str) -> Result<Run, RepoError> {
    let id: String = row.get("id");
    let dungeon_id: String = row.get("dungeon_id");
    let player_id: String = row.get("player_id");
    let state: String = row.get("state");
    let killed_steps_json: String = row.get("killed_steps_json");
    let started_at: String = row.get("started_at");
    let ended_at: Option<String> = row.get("ended_at");
    let updated_at: String = row.get("updated_at");

    let killed_steps = serde_json::from_str(&killed_steps_json)
        .map_err(|e| RepoError::serialization(format!("killed steps: {}", e)))?;

    Ok(Run {
        id: parse_id(&id, operation)?,
        dungeon_id: parse_id(&dungeon_id, operation)?,
        player_id: parse_id(&player_id, operation)?,
        state: parse_enum::<RunState>(&state, operation)?,
        current_step: row.get::<i64, _>("current_step") as u32,
        killed_steps,
        started_at: parse_timestamp(&started_at, operation)?,
        ended_at: parse_timestamp_opt(ended_at, operation)?,
        updated_at: parse_timestamp(&updated_at, operation)?,
    })
}

fn row_to_attempt(row: &SqliteRow, operation: &str) -> Result<AttemptRecord, RepoError> {
    let id: String = row.get("id");
    let run_id: String = row.get("run_id");
    let step_id: String = row.get("step_id");
    let player_id: String = row.get("player_id");
    let created_at: String = row.get("created_at");

    Ok(AttemptRecord {
        id: parse_id(&id, operation)?,
        run_id: parse_id(&run_id, operation)?,
        step_id: parse_id(&step_id, operation)?,
        player_id: parse_id(&player_id, operation)?,
        idempotency_key: row.get("idempotency_key"),
        reward_applied: row.get("reward_applied"),
        response_json: row.get("response_json"),
        created_at: parse_timestamp(&created_at, operation)?,
    })
}

#[async_trait]
impl RunRepo for SqliteRunRepo {
    async fn create(&self, run: &Run) -> Result<(), RepoError> {
        let killed_steps_json = serde_json::to_string(&run.killed_steps)
            .map_err(|e| RepoError::serialization(format!("killed steps: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO runs (id, dungeon_id, player_id, state, current_step,
                              killed_steps_json, started_at, ended_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(run.id.to_string())
        .bind(run.dungeon_id.to_string())
        .bind(run.player_id.to_string())
        .bind(run.state.as_str())
        .bind(run.current_step as i64)
        .bind(killed_steps_json)
        .bind(run.started_at.to_rfc3339())
        .bind(run.ended_at.map(|t| t.to_rfc3339()))
        .bind(run.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|e| map_write_err("create_run", "active run per dungeon", e))
    }

    async fn get(&self, id: RunId) -> Result<Option<Run>, RepoError> {
        let row = sqlx::query(&format!("SELECT {} FROM runs WHERE id = ?", RUN_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_run", e))?;

        row.map(|r| row_to_run(&r, "get_run")).transpose()
    }

    async fn has_active(
        &self,
        player_id: PlayerId,
        dungeon_id: DungeonId,
    ) -> Result<bool, RepoError> {
        let row = sqlx::query(
            "SELECT id FROM runs WHERE player_id = ? AND dungeon_id = ? AND state = 'active' LIMIT 1",
        )
        .bind(player_id.to_string())
        .bind(dungeon_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("has_active_run", e))?;

        Ok(row.is_some())
    }

    async fn list_by_player(
        &self,
        player_id: PlayerId,
        params: PageParams,
    ) -> Result<Vec<Run>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM runs WHERE player_id = ? ORDER BY started_at DESC LIMIT ? OFFSET ?",
            RUN_COLUMNS
        ))
        .bind(player_id.to_string())
        .bind(params.limit() as i64)
        .bind(params.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_runs", e))?;

        rows.iter().map(|r| row_to_run(r, "list_runs")).collect()
    }

    async fn get_attempt_record(
        &self,
        run_id: RunId,
        step_id: StepId,
    ) -> Result<Option<AttemptRecord>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM attempts WHERE run_id = ? AND step_id = ?",
            ATTEMPT_COLUMNS
        ))
        .bind(run_id.to_string())
        .bind(step_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_attempt", e))?;

        row.map(|r| row_to_attempt(&r, "get_attempt")).transpose()
    }
}
