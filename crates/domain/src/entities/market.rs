//! Marketplace entities: listings and trade receipts.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{ItemId, ListingId, PlayerId, TradeId};

/// Lifecycle of a listing. Transitions are one-way out of `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Sold,
    Cancelled,
    Expired,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Sold => "sold",
            ListingStatus::Cancelled => "cancelled",
            ListingStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ListingStatus::Active),
            "sold" => Ok(ListingStatus::Sold),
            "cancelled" => Ok(ListingStatus::Cancelled),
            "expired" => Ok(ListingStatus::Expired),
            other => Err(DomainError::parse(format!(
                "unknown listing status: {}",
                other
            ))),
        }
    }
}

/// A marketplace offer.
///
/// The listed quantity is escrowed out of the seller's inventory when the
/// listing is created and only returns on cancellation. While active,
/// `qty > 0`; partial fills decrement it, a full fill zeroes it and records
/// the buyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub seller_id: PlayerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<PlayerId>,
    pub item_id: ItemId,
    pub qty: i64,
    pub price_per_unit: i64,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Opens a new active listing escrowing `qty` units.
    pub fn open(
        seller_id: PlayerId,
        item_id: ItemId,
        qty: i64,
        price_per_unit: i64,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ListingId::new(),
            seller_id,
            buyer_id: None,
            item_id,
            qty,
            price_per_unit,
            status: ListingStatus::Active,
            created_at: now,
            expires_at,
        }
    }

    /// Whether the listing's expiry timestamp has passed. Expiry is judged
    /// lazily at read and buy time; there is no background sweeper.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires) if expires < now)
    }
}

/// Immutable settlement receipt for one buy event. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: TradeId,
    pub buyer_id: PlayerId,
    pub seller_id: PlayerId,
    pub listing_id: ListingId,
    pub item_id: ItemId,
    pub qty: i64,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}
