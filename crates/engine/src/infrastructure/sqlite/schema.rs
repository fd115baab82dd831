//! Schema bootstrap.
//!
//! Applied at startup; every statement is idempotent so restarts are safe.
//! Uniqueness rules the settlement flows rely on live here: one active run
//! per (player, dungeon), one attempt row per (run, step), one order slot
//! per step within a dungeon.

use sqlx::SqlitePool;

use crate::infrastructure::ports::RepoError;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS players (
        id TEXT PRIMARY KEY,
        display_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL,
        gold INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id TEXT PRIMARY KEY,
        item_type TEXT NOT NULL,
        rarity TEXT NOT NULL,
        name TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL,
        stats_json TEXT NOT NULL,
        tradable INTEGER NOT NULL,
        base_value INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory (
        player_id TEXT NOT NULL REFERENCES players(id),
        item_id TEXT NOT NULL REFERENCES items(id),
        qty INTEGER NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (player_id, item_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dungeons (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        area_name TEXT NOT NULL,
        created_by TEXT NOT NULL REFERENCES players(id),
        status TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS boss_steps (
        id TEXT PRIMARY KEY,
        dungeon_id TEXT NOT NULL REFERENCES dungeons(id),
        ord INTEGER NOT NULL,
        name TEXT NOT NULL,
        lat REAL NOT NULL,
        lon REAL NOT NULL,
        radius_m REAL NOT NULL,
        zone_description TEXT NOT NULL,
        difficulty INTEGER NOT NULL,
        reward_gold INTEGER NOT NULL,
        reward_items_json TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (dungeon_id, ord)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS runs (
        id TEXT PRIMARY KEY,
        dungeon_id TEXT NOT NULL REFERENCES dungeons(id),
        player_id TEXT NOT NULL REFERENCES players(id),
        state TEXT NOT NULL,
        current_step INTEGER NOT NULL,
        killed_steps_json TEXT NOT NULL,
        started_at TEXT NOT NULL,
        ended_at TEXT,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_runs_one_active
        ON runs (player_id, dungeon_id) WHERE state = 'active'
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attempts (
        id TEXT PRIMARY KEY,
        run_id TEXT NOT NULL REFERENCES runs(id),
        step_id TEXT NOT NULL REFERENCES boss_steps(id),
        player_id TEXT NOT NULL REFERENCES players(id),
        idempotency_key TEXT NOT NULL,
        reward_applied INTEGER NOT NULL,
        response_json TEXT,
        created_at TEXT NOT NULL,
        UNIQUE (run_id, step_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS listings (
        id TEXT PRIMARY KEY,
        seller_id TEXT NOT NULL REFERENCES players(id),
        buyer_id TEXT,
        item_id TEXT NOT NULL REFERENCES items(id),
        qty INTEGER NOT NULL,
        price_per_unit INTEGER NOT NULL,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL,
        expires_at TEXT
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_listings_active
        ON listings (status, created_at)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS trades (
        id TEXT PRIMARY KEY,
        buyer_id TEXT NOT NULL REFERENCES players(id),
        seller_id TEXT NOT NULL REFERENCES players(id),
        listing_id TEXT NOT NULL REFERENCES listings(id),
        item_id TEXT NOT NULL REFERENCES items(id),
        qty INTEGER NOT NULL,
        total_price INTEGER NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
];

pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), RepoError> {
    for stmt in STATEMENTS {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|e| RepoError::database("ensure_schema", e))?;
    }
    Ok(())
}
