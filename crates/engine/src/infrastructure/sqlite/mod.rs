//! SQLite-backed repositories and the settlement ledger.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::time::Duration;
use uuid::Uuid;

use super::ports::RepoError;

mod dungeon_repo;
mod item_repo;
mod ledger;
mod market_repo;
mod player_repo;
mod run_repo;
pub mod schema;

pub use dungeon_repo::SqliteDungeonRepo;
pub use item_repo::{SqliteInventoryRepo, SqliteItemRepo};
pub use ledger::SqliteLedger;
pub use market_repo::SqliteMarketRepo;
pub use player_repo::SqlitePlayerRepo;
pub use run_repo::SqliteRunRepo;

/// Open (or create) the database file and return a pool.
///
/// WAL keeps readers unblocked while a settlement transaction writes; the
/// busy timeout covers the writer handoff.
pub async fn connect(db_path: &str) -> Result<SqlitePool, RepoError> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| RepoError::database("connect", e))
}

/// Map a write failure, turning unique-constraint hits into `Duplicate`.
pub(crate) fn map_write_err(operation: &str, constraint: &str, e: sqlx::Error) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::duplicate(constraint),
        _ => RepoError::database(operation, e),
    }
}

pub(crate) fn parse_id<T: From<Uuid>>(value: &str, operation: &str) -> Result<T, RepoError> {
    Uuid::parse_str(value)
        .map(T::from)
        .map_err(|e| RepoError::database(operation, format!("bad id {}: {}", value, e)))
}

pub(crate) fn parse_timestamp(
    value: &str,
    operation: &str,
) -> Result<chrono::DateTime<chrono::Utc>, RepoError> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| RepoError::database(operation, format!("bad timestamp {}: {}", value, e)))
}

pub(crate) fn parse_timestamp_opt(
    value: Option<String>,
    operation: &str,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, RepoError> {
    value.map(|v| parse_timestamp(&v, operation)).transpose()
}

pub(crate) fn parse_enum<T>(value: &str, operation: &str) -> Result<T, RepoError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| RepoError::database(operation, e))
}
