pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

// Re-export all entities (explicit list in entities/mod.rs)
pub use entities::{
    AttemptRecord, BossLocation, BossStep, Dungeon, DungeonStatus, InventoryEntry, ItemDef,
    KilledStep, Listing, ListingStatus, Player, RewardItem, Rewards, Role, Run, RunState, Trade,
};

pub use error::DomainError;

// Re-export ID types
pub use ids::{
    AttemptId, DungeonId, ItemId, ListingId, PlayerId, RunId, StepId, TradeId,
};

// Re-export value objects
pub use value_objects::{haversine_distance_m, PageParams};
