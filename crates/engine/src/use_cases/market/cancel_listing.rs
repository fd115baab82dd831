//! Cancel listing use case.
//!
//! Returns the escrowed quantity to the seller and closes the listing,
//! atomically. Only the seller may cancel, and only while active.

use std::sync::Arc;

use dungeons_domain::{Listing, ListingId, ListingStatus, PlayerId};

use crate::infrastructure::ports::{ClockPort, LedgerPort, MarketRepo};

use super::error::MarketError;

pub struct CancelListing {
    market_repo: Arc<dyn MarketRepo>,
    ledger: Arc<dyn LedgerPort>,
    clock: Arc<dyn ClockPort>,
}

impl CancelListing {
    pub fn new(
        market_repo: Arc<dyn MarketRepo>,
        ledger: Arc<dyn LedgerPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            market_repo,
            ledger,
            clock,
        }
    }

    pub async fn execute(
        &self,
        seller_id: PlayerId,
        listing_id: ListingId,
    ) -> Result<Listing, MarketError> {
        let listing = self
            .market_repo
            .get_listing(listing_id)
            .await?
            .ok_or(MarketError::ListingNotFound)?;
        if listing.seller_id != seller_id {
            return Err(MarketError::NotListingOwner);
        }
        if listing.status != ListingStatus::Active {
            return Err(MarketError::ListingNotActive);
        }

        let now = self.clock.now();
        let expected_qty = listing.qty;

        let mut tx = self.ledger.begin().await?;
        if listing.qty > 0 {
            tx.add_item(seller_id, listing.item_id, listing.qty, now)
                .await?;
        }
        let mut updated = listing;
        updated.status = ListingStatus::Cancelled;
        tx.replace_listing(&updated, expected_qty).await?;
        tx.commit().await?;

        tracing::info!(
            listing_id = %listing_id,
            seller_id = %seller_id,
            returned_qty = updated.qty,
            "Listing cancelled"
        );

        Ok(updated)
    }
}
