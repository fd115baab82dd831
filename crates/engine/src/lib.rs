//! Dungeons Engine library.
//!
//! This crate contains all server-side code for the dungeons game backend.
//!
//! ## Structure
//!
//! - `use_cases/` - One module per operation area (runs, market, players, dungeons)
//! - `infrastructure/` - Ports plus the SQLite adapters behind them
//! - `api/` - HTTP entry points
//! - `app` - Application composition
//! - `seed` - Idempotent bootstrap data

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod seed;
pub mod use_cases;

/// Shared builders for unit and integration tests.
#[cfg(test)]
pub mod test_fixtures;

/// E2E tests driving the full App against a temp-file SQLite database.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
