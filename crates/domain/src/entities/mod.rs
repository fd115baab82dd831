//! Domain entities.
//!
//! Data-carrying structs for everything the engine persists. Most are simple
//! public-field structs; the few with real transition rules (Run) carry the
//! mutation helpers next to the data they protect.

pub mod attempt;
pub mod dungeon;
pub mod item;
pub mod market;
pub mod player;
pub mod run;

pub use attempt::AttemptRecord;
pub use dungeon::{BossLocation, BossStep, Dungeon, DungeonStatus, RewardItem, Rewards};
pub use item::{InventoryEntry, ItemDef};
pub use market::{Listing, ListingStatus, Trade};
pub use player::{Player, Role};
pub use run::{KilledStep, Run, RunState};
