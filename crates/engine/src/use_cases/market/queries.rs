use std::sync::Arc;

use dungeons_domain::{Listing, PageParams, PlayerId, Trade};

use crate::infrastructure::ports::{ClockPort, MarketRepo};

use super::error::MarketError;

/// Read side of the marketplace: open listings and trade history.
pub struct MarketQueries {
    market_repo: Arc<dyn MarketRepo>,
    clock: Arc<dyn ClockPort>,
}

impl MarketQueries {
    pub fn new(market_repo: Arc<dyn MarketRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { market_repo, clock }
    }

    /// Active, unexpired listings, newest first.
    pub async fn list_active(&self, params: PageParams) -> Result<Vec<Listing>, MarketError> {
        let now = self.clock.now();
        Ok(self.market_repo.list_active(now, params).await?)
    }

    /// Trades where the player was buyer or seller, newest first.
    pub async fn list_trades(
        &self,
        player_id: PlayerId,
        params: PageParams,
    ) -> Result<Vec<Trade>, MarketError> {
        Ok(self
            .market_repo
            .list_trades_for_player(player_id, params)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockClockPort, MockMarketRepo};
    use crate::test_fixtures::test_listing;
    use chrono::Utc;
    use dungeons_domain::ItemId;

    #[tokio::test]
    async fn when_listing_active_it_is_returned() {
        let mut market_repo = MockMarketRepo::new();
        market_repo
            .expect_list_active()
            .returning(|_, _| Ok(vec![test_listing(PlayerId::new(), ItemId::new(), 1, 25)]));
        let mut clock = MockClockPort::new();
        clock.expect_now().returning(Utc::now);

        let queries = MarketQueries::new(Arc::new(market_repo), Arc::new(clock));
        let listings = queries.list_active(PageParams::default()).await.unwrap();

        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].qty, 1);
    }

    #[tokio::test]
    async fn when_no_trades_list_is_empty() {
        let mut market_repo = MockMarketRepo::new();
        market_repo
            .expect_list_trades_for_player()
            .returning(|_, _| Ok(Vec::new()));
        let clock = MockClockPort::new();

        let queries = MarketQueries::new(Arc::new(market_repo), Arc::new(clock));
        let trades = queries
            .list_trades(PlayerId::new(), PageParams::default())
            .await
            .unwrap();

        assert!(trades.is_empty());
    }
}
