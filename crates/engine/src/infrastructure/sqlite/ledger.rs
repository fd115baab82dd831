//! SQLite settlement ledger.
//!
//! One [`SqliteLedgerTx`] wraps one database transaction. Guarded UPDATEs
//! carry the optimistic checks (balance, stack size, run step, listing
//! state) so a settlement either lands whole or rolls back whole.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dungeons_domain::{AttemptId, AttemptRecord, ItemId, Listing, Player, PlayerId, Run, Trade};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use super::map_write_err;
use super::player_repo::row_to_player;
use crate::infrastructure::ports::{LedgerPort, LedgerTx, RepoError};

const PLAYER_COLUMNS: &str =
    "id, display_name, email, password_hash, role, gold, created_at, updated_at";

pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerPort for SqliteLedger {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, RepoError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("begin", e))?;
        Ok(Box::new(SqliteLedgerTx { tx: Some(tx) }))
    }
}

/// Rolls back on drop unless committed.
struct SqliteLedgerTx {
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteLedgerTx {
    fn conn(&mut self, operation: &str) -> Result<&mut SqliteConnection, RepoError> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| RepoError::database(operation, "transaction already finished"))
    }

    async fn load_player(
        conn: &mut SqliteConnection,
        id: PlayerId,
        operation: &str,
    ) -> Result<Player, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM players WHERE id = ?",
            PLAYER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| RepoError::database(operation, e))?;

        match row {
            Some(row) => row_to_player(&row, operation),
            None => Err(RepoError::not_found("player", id)),
        }
    }
}

#[async_trait]
impl LedgerTx for SqliteLedgerTx {
    async fn get_player(&mut self, id: PlayerId) -> Result<Option<Player>, RepoError> {
        let conn = self.conn("tx_get_player")?;
        let row = sqlx::query(&format!(
            "SELECT {} FROM players WHERE id = ?",
            PLAYER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| RepoError::database("tx_get_player", e))?;

        row.map(|r| row_to_player(&r, "tx_get_player")).transpose()
    }

    async fn credit_gold(
        &mut self,
        id: PlayerId,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<Player, RepoError> {
        let conn = self.conn("credit_gold")?;
        let result = sqlx::query("UPDATE players SET gold = gold + ?, updated_at = ? WHERE id = ?")
            .bind(amount)
            .bind(now.to_rfc3339())
            .bind(id.to_string())
            .execute(&mut *conn)
            .await
            .map_err(|e| RepoError::database("credit_gold", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("player", id));
        }
        Self::load_player(conn, id, "credit_gold").await
    }

    async fn debit_gold(
        &mut self,
        id: PlayerId,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<Player, RepoError> {
        let conn = self.conn("debit_gold")?;
        let result = sqlx::query(
            "UPDATE players SET gold = gold - ?, updated_at = ? WHERE id = ? AND gold >= ?",
        )
        .bind(amount)
        .bind(now.to_rfc3339())
        .bind(id.to_string())
        .bind(amount)
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::database("debit_gold", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::conflict("insufficient gold"));
        }
        Self::load_player(conn, id, "debit_gold").await
    }

    async fn add_item(
        &mut self,
        player_id: PlayerId,
        item_id: ItemId,
        qty: i64,
        now: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let conn = self.conn("add_item")?;
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
        .execute(&mut *conn)
        .await
        .map(|_| ())
        .map_err(|e| RepoError::database("add_item", e))
    }

    async fn remove_item(
        &mut self,
        player_id: PlayerId,
        item_id: ItemId,
        qty: i64,
        now: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        let conn = self.conn("remove_item")?;
        let result = sqlx::query(
            r#"
            UPDATE inventory SET qty = qty - ?, updated_at = ?
            WHERE player_id = ? AND item_id = ? AND qty >= ?
            "#,
        )
        .bind(qty)
        .bind(now.to_rfc3339())
        .bind(player_id.to_string())
        .bind(item_id.to_string())
        .bind(qty)
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::database("remove_item", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::conflict("insufficient items"));
        }

        // Empty stacks disappear rather than lingering at zero.
        sqlx::query("DELETE FROM inventory WHERE player_id = ? AND item_id = ? AND qty = 0")
            .bind(player_id.to_string())
            .bind(item_id.to_string())
            .execute(&mut *conn)
            .await
            .map(|_| ())
            .map_err(|e| RepoError::database("remove_item", e))
    }

    async fn insert_attempt_record(&mut self, record: &AttemptRecord) -> Result<(), RepoError> {
        let conn = self.conn("insert_attempt")?;
        sqlx::query(
            r#"
            INSERT INTO attempts (id, run_id, step_id, player_id, idempotency_key,
                                  reward_applied, response_json, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.run_id.to_string())
        .bind(record.step_id.to_string())
        .bind(record.player_id.to_string())
        .bind(&record.idempotency_key)
        .bind(record.reward_applied)
        .bind(record.response_json.as_deref())
        .bind(record.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await
        .map(|_| ())
        .map_err(|e| map_write_err("insert_attempt", "attempt per step", e))
    }

    async fn finalize_attempt_record(
        &mut self,
        id: AttemptId,
        response_json: &str,
    ) -> Result<(), RepoError> {
        let conn = self.conn("finalize_attempt")?;
        let result =
            sqlx::query("UPDATE attempts SET reward_applied = 1, response_json = ? WHERE id = ?")
                .bind(response_json)
                .bind(id.to_string())
                .execute(&mut *conn)
                .await
                .map_err(|e| RepoError::database("finalize_attempt", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("attempt", id));
        }
        Ok(())
    }

    async fn replace_run(&mut self, run: &Run, expected_step: u32) -> Result<(), RepoError> {
        let killed_steps_json = serde_json::to_string(&run.killed_steps)
            .map_err(|e| RepoError::serialization(format!("killed steps: {}", e)))?;

        let conn = self.conn("replace_run")?;
        let result = sqlx::query(
            r#"
            UPDATE runs
            SET state = ?, current_step = ?, killed_steps_json = ?, ended_at = ?, updated_at = ?
            WHERE id = ? AND current_step = ? AND state = 'active'
            "#,
        )
        .bind(run.state.as_str())
        .bind(run.current_step as i64)
        .bind(killed_steps_json)
        .bind(run.ended_at.map(|t| t.to_rfc3339()))
        .bind(run.updated_at.to_rfc3339())
        .bind(run.id.to_string())
        .bind(expected_step as i64)
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::database("replace_run", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::conflict("run advanced concurrently"));
        }
        Ok(())
    }

    async fn insert_listing(&mut self, listing: &Listing) -> Result<(), RepoError> {
        let conn = self.conn("insert_listing")?;
        sqlx::query(
            r#"
            INSERT INTO listings (id, seller_id, buyer_id, item_id, qty, price_per_unit,
                                  status, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(listing.id.to_string())
        .bind(listing.seller_id.to_string())
        .bind(listing.buyer_id.map(|id| id.to_string()))
        .bind(listing.item_id.to_string())
        .bind(listing.qty)
        .bind(listing.price_per_unit)
        .bind(listing.status.as_str())
        .bind(listing.created_at.to_rfc3339())
        .bind(listing.expires_at.map(|t| t.to_rfc3339()))
        .execute(&mut *conn)
        .await
        .map(|_| ())
        .map_err(|e| RepoError::database("insert_listing", e))
    }

    async fn replace_listing(
        &mut self,
        listing: &Listing,
        expected_qty: i64,
    ) -> Result<(), RepoError> {
        let conn = self.conn("replace_listing")?;
        let result = sqlx::query(
            r#"
            UPDATE listings SET buyer_id = ?, qty = ?, status = ?
            WHERE id = ? AND status = 'active' AND qty = ?
            "#,
        )
        .bind(listing.buyer_id.map(|id| id.to_string()))
        .bind(listing.qty)
        .bind(listing.status.as_str())
        .bind(listing.id.to_string())
        .bind(expected_qty)
        .execute(&mut *conn)
        .await
        .map_err(|e| RepoError::database("replace_listing", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::conflict("listing changed concurrently"));
        }
        Ok(())
    }

    async fn insert_trade(&mut self, trade: &Trade) -> Result<(), RepoError> {
        let conn = self.conn("insert_trade")?;
        sqlx::query(
            r#"
            INSERT INTO trades (id, buyer_id, seller_id, listing_id, item_id, qty,
                                total_price, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(trade.id.to_string())
        .bind(trade.buyer_id.to_string())
        .bind(trade.seller_id.to_string())
        .bind(trade.listing_id.to_string())
        .bind(trade.item_id.to_string())
        .bind(trade.qty)
        .bind(trade.total_price)
        .bind(trade.created_at.to_rfc3339())
        .execute(&mut *conn)
        .await
        .map(|_| ())
        .map_err(|e| RepoError::database("insert_trade", e))
    }

    async fn commit(&mut self) -> Result<(), RepoError> {
        match self.tx.take() {
            Some(tx) => tx
                .commit()
                .await
                .map_err(|e| RepoError::database("commit", e)),
            None => Err(RepoError::database("commit", "transaction already finished")),
        }
    }
}
