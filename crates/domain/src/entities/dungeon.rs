//! Dungeon and boss step entities.
//!
//! A dungeon is an authored container of ordered, geofenced boss steps.
//! Runs may only start on published dungeons; steps are effectively frozen
//! once an active run references them (reordering is an authoring concern).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{DungeonId, ItemId, PlayerId, StepId};

/// Authoring lifecycle of a dungeon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DungeonStatus {
    Draft,
    Published,
    Archived,
}

impl DungeonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DungeonStatus::Draft => "draft",
            DungeonStatus::Published => "published",
            DungeonStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for DungeonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DungeonStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(DungeonStatus::Draft),
            "published" => Ok(DungeonStatus::Published),
            "archived" => Ok(DungeonStatus::Archived),
            other => Err(DomainError::parse(format!(
                "unknown dungeon status: {}",
                other
            ))),
        }
    }
}

/// An authored dungeon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dungeon {
    pub id: DungeonId,
    pub title: String,
    pub description: String,
    pub area_name: String,
    pub created_by: PlayerId,
    pub status: DungeonStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dungeon {
    /// New dungeons always start as drafts.
    pub fn draft(
        created_by: PlayerId,
        title: impl Into<String>,
        description: impl Into<String>,
        area_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DungeonId::new(),
            title: title.into(),
            description: description.into(),
            area_name: area_name.into(),
            created_by,
            status: DungeonStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Geofence anchor of a boss step: ground coordinates plus admission radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossLocation {
    pub lat: f64,
    pub lon: f64,
    pub radius_meters: f64,
}

/// One item grant inside a reward bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardItem {
    pub item_id: ItemId,
    pub qty: i64,
}

/// What a player earns for clearing a boss step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rewards {
    pub gold: i64,
    pub items: Vec<RewardItem>,
}

/// An ordered, geofenced checkpoint inside a dungeon.
///
/// `order` is 1-based and unique within the dungeon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossStep {
    pub id: StepId,
    pub dungeon_id: DungeonId,
    pub order: u32,
    pub name: String,
    pub location: BossLocation,
    pub zone_description: String,
    pub difficulty: u8,
    pub rewards: Rewards,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
