//! Item catalog and inventory entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ItemId, PlayerId};

/// Catalog definition of an item.
///
/// Simple data struct: any combination of values is valid. Only tradable
/// items may be listed on the marketplace. `stats` is free-form gameplay
/// data the engine never interprets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDef {
    pub id: ItemId,
    #[serde(rename = "type")]
    pub item_type: String,
    pub rarity: String,
    pub name: String,
    pub description: String,
    pub stats: serde_json::Value,
    pub tradable: bool,
    pub base_value: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One (player, item) stack. Quantity is always positive; a stack that
/// reaches zero is deleted rather than stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub player_id: PlayerId,
    pub item_id: ItemId,
    pub qty: i64,
    pub updated_at: DateTime<Utc>,
}
