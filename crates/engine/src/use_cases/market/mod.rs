//! Marketplace use cases: listing items for sale, buying, and cancelling.

use std::sync::Arc;

mod buy_listing;
mod cancel_listing;
mod create_listing;
mod error;
mod queries;

pub use buy_listing::BuyListing;
pub use cancel_listing::CancelListing;
pub use create_listing::CreateListing;
pub use error::MarketError;
pub use queries::MarketQueries;

/// Container for marketplace use cases.
pub struct MarketUseCases {
    pub create: Arc<CreateListing>,
    pub buy: Arc<BuyListing>,
    pub cancel: Arc<CancelListing>,
    pub queries: Arc<MarketQueries>,
}

impl MarketUseCases {
    pub fn new(
        create: Arc<CreateListing>,
        buy: Arc<BuyListing>,
        cancel: Arc<CancelListing>,
        queries: Arc<MarketQueries>,
    ) -> Self {
        Self {
            create,
            buy,
            cancel,
            queries,
        }
    }
}
