//! Application state and composition.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::infrastructure::auth::AuthTokens;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::ports::{
    ClockPort, DungeonRepo, InventoryRepo, ItemRepo, LedgerPort, MarketRepo, PlayerRepo, RunRepo,
};
use crate::infrastructure::sqlite::{
    SqliteDungeonRepo, SqliteInventoryRepo, SqliteItemRepo, SqliteLedger, SqliteMarketRepo,
    SqlitePlayerRepo, SqliteRunRepo,
};
use crate::use_cases::dungeon::{DungeonAuthoring, DungeonCatalog, DungeonUseCases};
use crate::use_cases::market::{
    BuyListing, CancelListing, CreateListing, MarketQueries, MarketUseCases,
};
use crate::use_cases::player::{Login, PlayerQueries, PlayerUseCases, Register, UpdateProfile};
use crate::use_cases::run::{AttemptStep, RunQueries, RunUseCases, StartRun};

/// Main application state.
///
/// Holds the repositories, the wired use cases and the token service.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
    pub auth: Arc<AuthTokens>,
}

/// Container for the repository ports. Handlers never touch these; they
/// exist for composition (seeding, tests) and the use cases wired below.
pub struct Repositories {
    pub player: Arc<dyn PlayerRepo>,
    pub item: Arc<dyn ItemRepo>,
    pub inventory: Arc<dyn InventoryRepo>,
    pub dungeon: Arc<dyn DungeonRepo>,
    pub run: Arc<dyn RunRepo>,
    pub market: Arc<dyn MarketRepo>,
    pub ledger: Arc<dyn LedgerPort>,
}

/// Container for all use cases, one member per operation area.
pub struct UseCases {
    pub players: PlayerUseCases,
    pub dungeons: DungeonUseCases,
    pub runs: RunUseCases,
    pub market: MarketUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up against the pool.
    pub fn new(pool: SqlitePool, auth: Arc<AuthTokens>) -> Self {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

        let player_repo: Arc<dyn PlayerRepo> = Arc::new(SqlitePlayerRepo::new(pool.clone()));
        let item_repo: Arc<dyn ItemRepo> = Arc::new(SqliteItemRepo::new(pool.clone()));
        let inventory_repo: Arc<dyn InventoryRepo> =
            Arc::new(SqliteInventoryRepo::new(pool.clone()));
        let dungeon_repo: Arc<dyn DungeonRepo> = Arc::new(SqliteDungeonRepo::new(pool.clone()));
        let run_repo: Arc<dyn RunRepo> = Arc::new(SqliteRunRepo::new(pool.clone()));
        let market_repo: Arc<dyn MarketRepo> = Arc::new(SqliteMarketRepo::new(pool.clone()));
        let ledger: Arc<dyn LedgerPort> = Arc::new(SqliteLedger::new(pool));

        let players = PlayerUseCases::new(
            Arc::new(Register::new(
                player_repo.clone(),
                auth.clone(),
                clock.clone(),
            )),
            Arc::new(Login::new(player_repo.clone(), auth.clone(), clock.clone())),
            Arc::new(UpdateProfile::new(player_repo.clone(), clock.clone())),
            Arc::new(PlayerQueries::new(
                player_repo.clone(),
                inventory_repo.clone(),
            )),
        );

        let dungeons = DungeonUseCases::new(
            Arc::new(DungeonAuthoring::new(dungeon_repo.clone(), clock.clone())),
            Arc::new(DungeonCatalog::new(dungeon_repo.clone())),
        );

        let runs = RunUseCases::new(
            Arc::new(StartRun::new(
                dungeon_repo.clone(),
                player_repo.clone(),
                run_repo.clone(),
                clock.clone(),
            )),
            Arc::new(AttemptStep::new(
                run_repo.clone(),
                dungeon_repo.clone(),
                ledger.clone(),
                clock.clone(),
            )),
            Arc::new(RunQueries::new(run_repo.clone())),
        );

        let market = MarketUseCases::new(
            Arc::new(CreateListing::new(
                item_repo.clone(),
                ledger.clone(),
                clock.clone(),
            )),
            Arc::new(BuyListing::new(
                market_repo.clone(),
                ledger.clone(),
                clock.clone(),
            )),
            Arc::new(CancelListing::new(
                market_repo.clone(),
                ledger.clone(),
                clock.clone(),
            )),
            Arc::new(MarketQueries::new(market_repo.clone(), clock.clone())),
        );

        Self {
            repositories: Repositories {
                player: player_repo,
                item: item_repo,
                inventory: inventory_repo,
                dungeon: dungeon_repo,
                run: run_repo,
                market: market_repo,
                ledger,
            },
            use_cases: UseCases {
                players,
                dungeons,
                runs,
                market,
            },
            auth,
        }
    }
}
