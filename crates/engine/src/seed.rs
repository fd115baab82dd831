//! Idempotent bootstrap data.
//!
//! Every row is keyed by a fixed id, so reruns find what an earlier run
//! created and leave it alone. Unlike a reset script this never overwrites
//! live data: a seeded account that has since earned gold keeps it.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use dungeons_domain::{
    BossLocation, BossStep, Dungeon, DungeonId, DungeonStatus, ItemDef, ItemId, Listing,
    ListingId, ListingStatus, Player, PlayerId, RewardItem, Rewards, Role, StepId,
};

use crate::app::App;
use crate::infrastructure::auth::hash_password;
use crate::infrastructure::ports::RepoError;

const SEED_PASSWORD: &str = "Password123!";

// Fixed ids, grouped by kind so a database dump reads cleanly.
const MJ_ID: Uuid = Uuid::from_u128(0xa1);
const PLAYER_ID: Uuid = Uuid::from_u128(0xa2);
const SWORD_ID: Uuid = Uuid::from_u128(0xb1);
const POTION_ID: Uuid = Uuid::from_u128(0xb2);
const DUNGEON_ID: Uuid = Uuid::from_u128(0xc1);
const STEP_1_ID: Uuid = Uuid::from_u128(0xc11);
const STEP_2_ID: Uuid = Uuid::from_u128(0xc12);
const LISTING_ID: Uuid = Uuid::from_u128(0xe1);

/// Ensure the bootstrap accounts, items, dungeon and listing exist.
pub async fn run(app: &App) -> Result<(), RepoError> {
    let now = Utc::now();

    let mj_id = PlayerId::from_uuid(MJ_ID);
    let player_id = PlayerId::from_uuid(PLAYER_ID);
    let sword_id = ItemId::from_uuid(SWORD_ID);
    let potion_id = ItemId::from_uuid(POTION_ID);
    let dungeon_id = DungeonId::from_uuid(DUNGEON_ID);

    let mj_created = ensure_player(
        app,
        Player {
            id: mj_id,
            display_name: "Seed MJ".into(),
            email: "mj@seed.local".into(),
            password_hash: hash_password(SEED_PASSWORD),
            role: Role::Mj,
            gold: 5000,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;
    let player_created = ensure_player(
        app,
        Player {
            id: player_id,
            display_name: "Seed Player".into(),
            email: "player@seed.local".into(),
            password_hash: hash_password(SEED_PASSWORD),
            role: Role::Player,
            gold: 1000,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    ensure_item(
        app,
        ItemDef {
            id: sword_id,
            item_type: "weapon".into(),
            rarity: "common".into(),
            name: "Rusty Sword".into(),
            description: "Old but reliable".into(),
            stats: json!({"attack": 5}),
            tradable: true,
            base_value: 25,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;
    ensure_item(
        app,
        ItemDef {
            id: potion_id,
            item_type: "consumable".into(),
            rarity: "common".into(),
            name: "Minor Potion".into(),
            description: "Restores a bit of health".into(),
            stats: json!({"heal": 20}),
            tradable: true,
            base_value: 15,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    // Starting stacks ride along with account creation; a rerun must not
    // top the stacks back up after play has drawn them down.
    if player_created {
        app.repositories
            .inventory
            .add(player_id, potion_id, 5, now)
            .await?;
    }
    if mj_created {
        app.repositories
            .inventory
            .add(mj_id, sword_id, 3, now)
            .await?;
    }

    if app.repositories.dungeon.get(dungeon_id).await?.is_none() {
        app.repositories
            .dungeon
            .create(&Dungeon {
                id: dungeon_id,
                title: "Seed Dungeon".into(),
                description: "Starter published dungeon".into(),
                area_name: "Paris Center".into(),
                created_by: mj_id,
                status: DungeonStatus::Published,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    ensure_step(
        app,
        BossStep {
            id: StepId::from_uuid(STEP_1_ID),
            dungeon_id,
            order: 1,
            name: "Gatekeeper".into(),
            location: BossLocation {
                lat: 48.8566,
                lon: 2.3522,
                radius_meters: 80.0,
            },
            zone_description: "Near city hall".into(),
            difficulty: 2,
            rewards: Rewards {
                gold: 50,
                items: vec![RewardItem {
                    item_id: potion_id,
                    qty: 1,
                }],
            },
            created_at: now,
            updated_at: now,
        },
    )
    .await?;
    ensure_step(
        app,
        BossStep {
            id: StepId::from_uuid(STEP_2_ID),
            dungeon_id,
            order: 2,
            name: "Catacomb Guardian".into(),
            location: BossLocation {
                lat: 48.8570,
                lon: 2.3530,
                radius_meters: 120.0,
            },
            zone_description: "Second checkpoint".into(),
            difficulty: 4,
            rewards: Rewards {
                gold: 120,
                items: vec![RewardItem {
                    item_id: sword_id,
                    qty: 1,
                }],
            },
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    // The showcase listing is inserted directly rather than through the
    // marketplace use case, so the mj keeps the full starting stack.
    let listing_id = ListingId::from_uuid(LISTING_ID);
    if app.repositories.market.get_listing(listing_id).await?.is_none() {
        let mut tx = app.repositories.ledger.begin().await?;
        tx.insert_listing(&Listing {
            id: listing_id,
            seller_id: mj_id,
            buyer_id: None,
            item_id: sword_id,
            qty: 1,
            price_per_unit: 200,
            status: ListingStatus::Active,
            created_at: now,
            expires_at: None,
        })
        .await?;
        tx.commit().await?;
    }

    tracing::info!("Seed data ensured");
    Ok(())
}

async fn ensure_player(app: &App, player: Player) -> Result<bool, RepoError> {
    if app.repositories.player.get(player.id).await?.is_some() {
        return Ok(false);
    }
    app.repositories.player.create(&player).await?;
    tracing::info!(player_id = %player.id, email = %player.email, "Seeded account");
    Ok(true)
}

async fn ensure_item(app: &App, item: ItemDef) -> Result<(), RepoError> {
    if app.repositories.item.get(item.id).await?.is_none() {
        app.repositories.item.create(&item).await?;
    }
    Ok(())
}

async fn ensure_step(app: &App, step: BossStep) -> Result<(), RepoError> {
    if app
        .repositories
        .dungeon
        .get_step(step.dungeon_id, step.id)
        .await?
        .is_none()
    {
        app.repositories.dungeon.create_step(&step).await?;
    }
    Ok(())
}
