//! Common builders for unit and e2e tests.
//!
//! Keeps test setup terse: every builder returns a fully valid entity with
//! a fresh id, and tests override only the fields they care about.

use chrono::{DateTime, Utc};
use dungeons_domain::{
    BossLocation, BossStep, Dungeon, DungeonId, DungeonStatus, ItemDef, ItemId, Listing, Player,
    PlayerId, RewardItem, Rewards, Role, Run, StepId,
};

/// Coordinates of the seed dungeon's first boss; tests that need to stand
/// "at" a step reuse these.
pub const TEST_LAT: f64 = 48.8566;
pub const TEST_LON: f64 = 2.3522;

pub fn test_player(role: Role, gold: i64) -> Player {
    let mut player = Player::new(
        "Test Player",
        format!("{}@test.local", PlayerId::new()),
        "test-hash",
        role,
        Utc::now(),
    );
    player.gold = gold;
    player
}

pub fn test_dungeon(created_by: PlayerId, status: DungeonStatus) -> Dungeon {
    let mut dungeon = Dungeon::draft(
        created_by,
        "Crypt of Webs",
        "A spider-infested crypt",
        "Old Town",
        Utc::now(),
    );
    dungeon.status = status;
    dungeon
}

/// A step at the test coordinates with an 80 meter radius.
pub fn test_step(dungeon_id: DungeonId, order: u32) -> BossStep {
    let now = Utc::now();
    BossStep {
        id: StepId::new(),
        dungeon_id,
        order,
        name: format!("Boss {}", order),
        location: BossLocation {
            lat: TEST_LAT,
            lon: TEST_LON,
            radius_meters: 80.0,
        },
        zone_description: "Near the old gate".to_string(),
        difficulty: 3,
        rewards: Rewards {
            gold: 50,
            items: Vec::new(),
        },
        created_at: now,
        updated_at: now,
    }
}

/// Same as [`test_step`] but granting `qty` of `item_id` on top of gold.
pub fn test_step_with_item(dungeon_id: DungeonId, order: u32, item_id: ItemId, qty: i64) -> BossStep {
    let mut step = test_step(dungeon_id, order);
    step.rewards.items.push(RewardItem { item_id, qty });
    step
}

pub fn test_run(player_id: PlayerId, dungeon_id: DungeonId) -> Run {
    Run::start(player_id, dungeon_id, Utc::now())
}

pub fn test_item(name: &str, tradable: bool) -> ItemDef {
    let now = Utc::now();
    ItemDef {
        id: ItemId::new(),
        item_type: "weapon".to_string(),
        rarity: "common".to_string(),
        name: name.to_string(),
        description: "Old but reliable".to_string(),
        stats: serde_json::json!({"attack": 5}),
        tradable,
        base_value: 25,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_listing(seller_id: PlayerId, item_id: ItemId, qty: i64, price_per_unit: i64) -> Listing {
    Listing::open(seller_id, item_id, qty, price_per_unit, None, Utc::now())
}

/// A timestamp comfortably in the past, for expiry scenarios.
pub fn hour_ago() -> DateTime<Utc> {
    Utc::now() - chrono::Duration::hours(1)
}
