//! SQLite-backed marketplace reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dungeons_domain::{Listing, ListingId, ListingStatus, PageParams, PlayerId, Trade};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{parse_enum, parse_id, parse_timestamp, parse_timestamp_opt};
use crate::infrastructure::ports::{MarketRepo, RepoError};

const LISTING_COLUMNS: &str =
    "id, seller_id, buyer_id, item_id, qty, price_per_unit, status, created_at, expires_at";
const TRADE_COLUMNS: &str =
    "id, buyer_id, seller_id, listing_id, item_id, qty, total_price, created_at";

pub struct SqliteMarketRepo {
    pool: SqlitePool,
}

impl SqliteMarketRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_listing(row: &SqliteRow, operation: &str) -> Result<Listing, RepoError> {
    let id: String = row.get("id");
    let seller_id: String = row.get("seller_id");
    let buyer_id: Option<String> = row.get("buyer_id");
    let item_id: String = row.get("item_id");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let expires_at: Option<String> = row.get("expires_at");

    Ok(Listing {
        id: parse_id(&id, operation)?,
        seller_id: parse_id(&seller_id, operation)?,
        buyer_id: buyer_id.map(|v| parse_id(&v, operation)).transpose()?,
        item_id: parse_id(&item_id, operation)?,
        qty: row.get("qty"),
        price_per_unit: row.get("price_per_unit"),
        status: parse_enum::<ListingStatus>(&status, operation)?,
        created_at: parse_timestamp(&created_at, operation)?,
        expires_at: parse_timestamp_opt(expires_at, operation)?,
    })
}

fn row_to_trade(row: &SqliteRow, operation: &str) -> Result<Trade, RepoError> {
    let id: String = row.get("id");
    let buyer_id: String = row.get("buyer_id");
    let seller_id: String = row.get("seller_id");
    let listing_id: String = row.get("listing_id");
    let item_id: String = row.get("item_id");
    let created_at: String = row.get("created_at");

    Ok(Trade {
        id: parse_id(&id, operation)?,
        buyer_id: parse_id(&buyer_id, operation)?,
        seller_id: parse_id(&seller_id, operation)?,
        listing_id: parse_id(&listing_id, operation)?,
        item_id: parse_id(&item_id, operation)?,
        qty: row.get("qty"),
        total_price: row.get("total_price"),
        created_at: parse_timestamp(&created_at, operation)?,
    })
}

#[async_trait]
impl MarketRepo for SqliteMarketRepo {
    async fn get_listing(&self, id: ListingId) -> Result<Option<Listing>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM listings WHERE id = ?",
            LISTING_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_listing", e))?;

        row.map(|r| row_to_listing(&r, "get_listing")).transpose()
    }

    async fn list_active(
        &self,
        now: DateTime<Utc>,
        params: PageParams,
    ) -> Result<Vec<Listing>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM listings \
             WHERE status = 'active' AND (expires_at IS NULL OR expires_at > ?) \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            LISTING_COLUMNS
        ))
        .bind(now.to_rfc3339())
        .bind(params.limit() as i64)
        .bind(params.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_active_listings", e))?;

        rows.iter()
            .map(|r| row_to_listing(r, "list_active_listings"))
            .collect()
    }

    async fn list_trades_for_player(
        &self,
        player_id: PlayerId,
        params: PageParams,
    ) -> Result<Vec<Trade>, RepoError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM trades WHERE buyer_id = ? OR seller_id = ? \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            TRADE_COLUMNS
        ))
        .bind(player_id.to_string())
        .bind(player_id.to_string())
        .bind(params.limit() as i64)
        .bind(params.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_trades", e))?;

        rows.iter().map(|r| row_to_trade(r, "list_trades")).collect()
    }
}
