//! Buy listing use case.
//!
//! Settles a purchase in one transaction: debit the buyer, credit the
//! seller, hand over the items, update the listing and append a trade
//! receipt. The listing replace carries an optimistic quantity guard, so
//! two buyers racing for the same units leave exactly one winner and the
//! loser's transaction rolls back whole.

use std::sync::Arc;

use dungeons_domain::{Listing, ListingId, ListingStatus, PlayerId, Trade, TradeId};

use crate::infrastructure::ports::{ClockPort, LedgerPort, MarketRepo, RepoError};

use super::error::MarketError;

pub struct BuyListing {
    market_repo: Arc<dyn MarketRepo>,
    ledger: Arc<dyn LedgerPort>,
    clock: Arc<dyn ClockPort>,
}

impl BuyListing {
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
        buyer_id: PlayerId,
        listing_id: ListingId,
        qty: i64,
    ) -> Result<Listing, MarketError> {
        let listing = self
            .market_repo
            .get_listing(listing_id)
            .await?
            .ok_or(MarketError::ListingNotFound)?;
        if listing.status != ListingStatus::Active {
            return Err(MarketError::ListingNotActive);
        }
        if listing.seller_id == buyer_id {
            return Err(MarketError::OwnListing);
        }
        if qty > listing.qty {
            return Err(MarketError::NotEnoughQuantity);
        }
        let now = self.clock.now();
        if listing.is_expired(now) {
            return Err(MarketError::ListingExpired);
        }

        let total_price = qty * listing.price_per_unit;
        let expected_qty = listing.qty;

        let mut tx = self.ledger.begin().await?;
        let buyer = tx
            .get_player(buyer_id)
            .await?
            .ok_or_else(|| RepoError::not_found("player", buyer_id))?;
        if buyer.gold < total_price {
            return Err(MarketError::InsufficientFunds);
        }

        tx.debit_gold(buyer_id, total_price, now).await?;
        tx.credit_gold(listing.seller_id, total_price, now).await?;
        tx.add_item(buyer_id, listing.item_id, qty, now).await?;

        let mut updated = listing;
        if qty == updated.qty {
            updated.status = ListingStatus::Sold;
            updated.buyer_id = Some(buyer_id);
            updated.qty = 0;
        } else {
            updated.qty -= qty;
        }
        tx.replace_listing(&updated, expected_qty).await?;

        let trade = Trade {
            id: TradeId::new(),
            buyer_id,
            seller_id: updated.seller_id,
            listing_id: updated.id,
            item_id: updated.item_id,
            qty,
            total_price,
            created_at: now,
        };
        tx.insert_trade(&trade).await?;
        tx.commit().await?;

        tracing::info!(
            listing_id = %listing_id,
            trade_id = %trade.id,
            buyer_id = %buyer_id,
            seller_id = %updated.seller_id,
            qty,
            total_price,
            sold_out = updated.status == ListingStatus::Sold,
            "Listing bought"
        );

        Ok(updated)
    }
}
