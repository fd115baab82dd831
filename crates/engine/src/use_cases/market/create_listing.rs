//! Create listing use case.
//!
//! Escrow model: the listed quantity leaves the seller's inventory the
//! moment the listing opens, in the same transaction that inserts it. The
//! items only come back on cancellation.

use std::sync::Arc;

use chrono::Duration;
use dungeons_domain::{ItemId, Listing, PlayerId};

use crate::infrastructure::ports::{ClockPort, ItemRepo, LedgerPort, RepoError};

use super::error::MarketError;

pub struct CreateListing {
    item_repo: Arc<dyn ItemRepo>,
    ledger: Arc<dyn LedgerPort>,
    clock: Arc<dyn ClockPort>,
}

impl CreateListing {
    pub fn new(
        item_repo: Arc<dyn ItemRepo>,
        ledger: Arc<dyn LedgerPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            item_repo,
            ledger,
            clock,
        }
    }

    pub async fn execute(
        &self,
        seller_id: PlayerId,
        item_id: ItemId,
        qty: i64,
        price_per_unit: i64,
        expires_in_hours: Option<i64>,
    ) -> Result<Listing, MarketError> {
        let item = self
            .item_repo
            .get(item_id)
            .await?
            .ok_or(MarketError::ItemNotFound)?;
        if !item.tradable {
            return Err(MarketError::NotTradable);
        }

        let now = self.clock.now();
        let expires_at = expires_in_hours
            .filter(|hours| *hours > 0)
            .map(|hours| now + Duration::hours(hours));
        let listing = Listing::open(seller_id, item_id, qty, price_per_unit, expires_at, now);

        let mut tx = self.ledger.begin().await?;
        match tx.remove_item(seller_id, item_id, qty, now).await {
            Ok(()) => {}
            Err(RepoError::Conflict(_)) => return Err(MarketError::NotEnoughItems),
            Err(e) => return Err(e.into()),
        }
        tx.insert_listing(&listing).await?;
        tx.commit().await?;

        tracing::info!(
            listing_id = %listing.id,
            seller_id = %seller_id,
            item_id = %item_id,
            qty,
            price_per_unit,
            "Listing created"
        );

        Ok(listing)
    }
}
