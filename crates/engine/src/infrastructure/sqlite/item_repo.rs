//! SQLite-backed item catalog and inventory storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dungeons_domain::{InventoryEntry, ItemDef, ItemId, PageParams, PlayerId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{map_write_err, parse_id, parse_timestamp};
use crate::infrastructure::ports::{InventoryRepo, ItemRepo, RepoError};

const ITEM_COLUMNS: &str =
    "id, item_type, rarity, name, description, stats_json, tradable, base_value, created_at, \
     updated_at";

pub struct SqliteItemRepo {
    pool: SqlitePool,
}

impl SqliteItemRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_item(row: &SqliteRow, operation: &str) -> Result<ItemDef, RepoError> {
    let id: String = row.get("id");
    let stats_json: String = row.get("stats_json");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    let stats = serde_json::from_str(&stats_json)
        .map_err(|e| RepoError::serialization(format!("item stats: {}", e)))?;

    Ok(ItemDef {
        id: parse_id(&id, operation)?,
        item_type: row.get("item_type"),
        rarity: row.get("rarity"),
        name: row.get("name"),
        description: row.get("description"),
        stats,
        tradable: row.get("tradable"),
        base_value: row.get("base_value"),
        created_at: parse_timestamp(&created_at, operation)?,
        updated_at: parse_timestamp(&updated_at, operation)?,
    })
}

#[async_trait]
impl ItemRepo for SqliteItemRepo {
    async fn get(&self, id: ItemId) -> Result<Option<ItemDef>, RepoError> {
        let row = sqlx::query(&format!("SELECT {} FROM items WHERE id = ?", ITEM_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_item", e))?;

        row.map(|r| row_to_item(&r, "get_item")).transpose()
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<ItemDef>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM items WHERE name = ?",
            ITEM_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_item_by_name", e))?;

        row.map(|r| row_to_item(&r, "get_item_by_name")).transpose()
    }

    async fn create(&self, item: &ItemDef) -> Result<(), RepoError> {
        let stats_json = serde_json::to_string(&item.stats)
            .map_err(|e| RepoError::serialization(format!("item stats: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO items (id, item_type, rarity, name, description, stats_json,
                               tradable, base_value, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(&item.item_type)
        .bind(&item.rarity)
        .bind(&item.name)
        .bind(&item.description)
        .bind(stats_json)
        .bind(item.tradable)
        .bind(item.base_value)
        .bind(item.created_at.to_rfc3339())
        .bind(item.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|e| map_write_err("create_item", "items.name", e))
    }

    async fn list(&self, params: PageParams) -> Result<Vec<ItemDef>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM items ORDER BY name LIMIT ? OFFSET ?",
            ITEM_COLUMNS
        ))
        .bind(params.limit() as i64)
        .bind(params.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_items", e))?;

        rows.iter().map(|r| row_to_item(r, "list_items")).collect()
    }
}

pub struct SqliteInventoryRepo {
    pool: SqlitePool,
}

impl SqliteInventoryRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_inventory_entry(row: &SqliteRow, operation: &str) -> Result<InventoryEntry, RepoError> {
    let player_id: String = row.get("player_id");
    let item_id: String = row.get("item_id");
    let updated_at: String = row.get("updated_at");
    Ok(InventoryEntry {
        player_id: parse_id(&player_id, operation)?,
        item_id: parse_id(&item_id, operation)?,
        qty: row.get("qty"),
        updated_at: parse_timestamp(&updated_at, operation)?,
    })
}

#[async_trait]
impl InventoryRepo for SqliteInventoryRepo {
    async fn list_for_player(&self, player_id: PlayerId) -> Result<Vec<InventoryEntry>, RepoError> {
        let rows = sqlx::query(
            "SELECT player_id, item_id, qty, updated_at FROM inventory WHERE player_id = ? ORDER BY item_id",
        )
        .bind(player_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_inventory", e))?;

        rows.iter()
            .map(|r| row_to_inventory_entry(r, "list_inventory"))
            .collect()
    }

    async fn add(
        &self,
        player_id: PlayerId,
        item_id: ItemId,
        qty: i64,
        now: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO inventory (player_id, item_id, qty, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(player_id, item_id) DO UPDATE SET
                qty = qty + excluded.qty,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(player_id.to_string())
        .bind(item_id.to_string())
        .bind(qty)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|e| RepoError::database("add_inventory", e))
    }
}
