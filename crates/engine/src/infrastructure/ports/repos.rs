//! Repository and ledger port traits for database access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dungeons_domain::*;

use super::error::RepoError;

// =============================================================================
// Players
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRepo: Send + Sync {
    async fn get(&self, id: PlayerId) -> Result<Option<Player>, RepoError>;
    async fn get_by_email(&self, email: &str) -> Result<Option<Player>, RepoError>;
    /// Fails with `RepoError::Duplicate` when the email is already taken.
    async fn create(&self, player: &Player) -> Result<(), RepoError>;
    async fn update(&self, player: &Player) -> Result<(), RepoError>;
    async fn list(&self, params: PageParams) -> Result<Vec<Player>, RepoError>;
}

// =============================================================================
// Item Catalog and Inventory
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepo: Send + Sync {
    async fn get(&self, id: ItemId) -> Result<Option<ItemDef>, RepoError>;
    async fn get_by_name(&self, name: &str) -> Result<Option<ItemDef>, RepoError>;
    async fn create(&self, item: &ItemDef) -> Result<(), RepoError>;
    async fn list(&self, params: PageParams) -> Result<Vec<ItemDef>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepo: Send + Sync {
    async fn list_for_player(&self, player_id: PlayerId) -> Result<Vec<InventoryEntry>, RepoError>;
    /// Upserts the stack, adding `qty` to any existing count.
    async fn add(
        &self,
        player_id: PlayerId,
        item_id: ItemId,
        qty: i64,
        now: DateTime<Utc>,
    ) -> Result<(), RepoError>;
}

// =============================================================================
// Dungeons and Boss Steps
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DungeonRepo: Send + Sync {
    // CRUD
    async fn get(&self, id: DungeonId) -> Result<Option<Dungeon>, RepoError>;
    async fn create(&self, dungeon: &Dungeon) -> Result<(), RepoError>;
    async fn update(&self, dungeon: &Dungeon) -> Result<(), RepoError>;

    // Queries
    async fn list_published(&self, params: PageParams) -> Result<Vec<Dungeon>, RepoError>;

    // Steps
    async fn get_step(
        &self,
        dungeon_id: DungeonId,
        step_id: StepId,
    ) -> Result<Option<BossStep>, RepoError>;
    /// Steps ordered by their position in the gauntlet, ascending.
    async fn list_steps(&self, dungeon_id: DungeonId) -> Result<Vec<BossStep>, RepoError>;
    /// Fails with `RepoError::Duplicate` when the order slot is taken.
    async fn create_step(&self, step: &BossStep) -> Result<(), RepoError>;
    async fn update_step(&self, step: &BossStep) -> Result<(), RepoError>;
    /// Applies a full reassignment of step orders in one transaction.
    async fn reorder_steps(
        &self,
        dungeon_id: DungeonId,
        orders: Vec<(StepId, u32)>,
        now: DateTime<Utc>,
    ) -> Result<(), RepoError>;
}

// =============================================================================
// Runs and Attempts
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RunRepo: Send + Sync {
    /// Fails with `RepoError::Duplicate` when the player already has an
    /// active run in the same dungeon.
    async fn create(&self, run: &Run) -> Result<(), RepoError>;
    async fn get(&self, id: RunId) -> Result<Option<Run>, RepoError>;
    async fn has_active(
        &self,
        player_id: PlayerId,
        dungeon_id: DungeonId,
    ) -> Result<bool, RepoError>;
    async fn list_by_player(
        &self,
        player_id: PlayerId,
        params: PageParams,
    ) -> Result<Vec<Run>, RepoError>;
    async fn get_attempt_record(
        &self,
        run_id: RunId,
        step_id: StepId,
    ) -> Result<Option<AttemptRecord>, RepoError>;
}

// =============================================================================
// Marketplace Reads
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketRepo: Send + Sync {
    async fn get_listing(&self, id: ListingId) -> Result<Option<Listing>, RepoError>;
    /// Active listings that have not passed their expiry, newest first.
    async fn list_active(
        &self,
        now: DateTime<Utc>,
        params: PageParams,
    ) -> Result<Vec<Listing>, RepoError>;
    async fn list_trades_for_player(
        &self,
        player_id: PlayerId,
        params: PageParams,
    ) -> Result<Vec<Trade>, RepoError>;
}

// =============================================================================
// Settlement Ledger (single-transaction writes)
// =============================================================================

/// Opens write transactions for settlement flows.
///
/// Every mutation of gold, inventory, runs, listings and trades that must
/// land atomically goes through a [`LedgerTx`]. Dropping an uncommitted
/// transaction rolls it back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerPort: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerTx: Send {
    // Players
    async fn get_player(&mut self, id: PlayerId) -> Result<Option<Player>, RepoError>;
    /// Returns the player with the updated balance.
    async fn credit_gold(
        &mut self,
        id: PlayerId,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<Player, RepoError>;
    /// Fails with `RepoError::Conflict` when the balance is short.
    async fn debit_gold(
        &mut self,
        id: PlayerId,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<Player, RepoError>;

    // Inventory
    async fn add_item(
        &mut self,
        player_id: PlayerId,
        item_id: ItemId,
        qty: i64,
        now: DateTime<Utc>,
    ) -> Result<(), RepoError>;
    /// Fails with `RepoError::Conflict` when the stack is short.
    async fn remove_item(
        &mut self,
        player_id: PlayerId,
        item_id: ItemId,
        qty: i64,
        now: DateTime<Utc>,
    ) -> Result<(), RepoError>;

    // Attempts
    /// Fails with `RepoError::Duplicate` when the (run, step) pair is
    /// already recorded.
    async fn insert_attempt_record(&mut self, record: &AttemptRecord) -> Result<(), RepoError>;
    async fn finalize_attempt_record(
        &mut self,
        id: AttemptId,
        response_json: &str,
    ) -> Result<(), RepoError>;

    // Runs
    /// Fails with `RepoError::Conflict` unless the stored run is still at
    /// `expected_step`.
    async fn replace_run(&mut self, run: &Run, expected_step: u32) -> Result<(), RepoError>;

    // Marketplace
    async fn insert_listing(&mut self, listing: &Listing) -> Result<(), RepoError>;
    /// Fails with `RepoError::Conflict` unless the stored listing is still
    /// active with `expected_qty` units.
    async fn replace_listing(
        &mut self,
        listing: &Listing,
        expected_qty: i64,
    ) -> Result<(), RepoError>;
    async fn insert_trade(&mut self, trade: &Trade) -> Result<(), RepoError>;

    async fn commit(&mut self) -> Result<(), RepoError>;
}
