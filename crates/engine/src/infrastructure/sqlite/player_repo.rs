//! SQLite-backed player storage.

use async_trait::async_trait;
use dungeons_domain::{PageParams, Player, PlayerId, Role};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{map_write_err, parse_enum, parse_id, parse_timestamp};
use crate::infrastructure::ports::{PlayerRepo, RepoError};

const PLAYER_COLUMNS: &str =
    "id, display_name, email, password_hash, role, gold, created_at, updated_at";

pub struct SqlitePlayerRepo {
    pool: SqlitePool,
}

impl SqlitePlayerRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

pub(crate) fn row_to_player(row: &SqliteRow, operation: &str) -> Result<Player, RepoError> {
    let id: String = row.get("id");
    let role: String = row.get("role");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    Ok(Player {
        id: parse_id(&id, operation)?,
        display_name: row.get("display_name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: parse_enum::<Role>(&role, operation)?,
        gold: row.get("gold"),
        created_at: parse_timestamp(&created_at, operation)?,
        updated_at: parse_timestamp(&updated_at, operation)?,
    })
}

#[async_trait]
impl PlayerRepo for SqlitePlayerRepo {
    async fn get(&self, id: PlayerId) -> Result<Option<Player>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM players WHERE id = ?",
            PLAYER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_player", e))?;

        row.map(|r| row_to_player(&r, "get_player")).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Player>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM players WHERE email = ?",
            PLAYER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_player_by_email", e))?;

        row.map(|r| row_to_player(&r, "get_player_by_email"))
            .transpose()
    }

    async fn create(&self, player: &Player) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO players (id, display_name, email, password_hash, role, gold, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(player.id.to_string())
        .bind(&player.display_name)
        .bind(&player.email)
        .bind(&player.password_hash)
        .bind(player.role.as_str())
        .bind(player.gold)
        .bind(player.created_at.to_rfc3339())
        .bind(player.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|e| map_write_err("create_player", "players.email", e))
    }

    async fn update(&self, player: &Player) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE players SET display_name = ?, gold = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&player.display_name)
        .bind(player.gold)
        .bind(player.updated_at.to_rfc3339())
        .bind(player.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("update_player", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("player", player.id));
        }
        Ok(())
    }

    async fn list(&self, params: PageParams) -> Result<Vec<Player>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM players ORDER BY created_at ASC LIMIT ? OFFSET ?",
            PLAYER_COLUMNS
        ))
        .bind(params.limit() as i64)
        .bind(params.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_players", e))?;

        rows.iter().map(|r| row_to_player(r, "list_players")).collect()
    }
}
