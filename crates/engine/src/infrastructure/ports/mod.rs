//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is
//! concrete types. Ports exist for:
//! - Database access (could swap SQLite -> Postgres)
//! - Transactional settlement (the ledger)
//! - Clock (for testing)

mod error;
mod repos;
mod testing;

// =============================================================================
// Repository and Ledger Ports
// =============================================================================
pub use repos::*;

// =============================================================================
// Test-Only Mock Repositories (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{
    MockDungeonRepo, MockInventoryRepo, MockItemRepo, MockLedgerPort, MockLedgerTx,
    MockMarketRepo, MockPlayerRepo, MockRunRepo,
};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::RepoError;
