//! Marketplace operation errors.

use crate::infrastructure::ports::RepoError;

/// Errors that can occur while listing, buying or cancelling.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("listing not found")]
    ListingNotFound,
    #[error("item not found")]
    ItemNotFound,
    #[error("item is not tradable")]
    NotTradable,
    #[error("listing is not active")]
    ListingNotActive,
    #[error("seller cannot buy their own listing")]
    OwnListing,
    #[error("requested quantity exceeds the listing")]
    NotEnoughQuantity,
    #[error("listing has expired")]
    ListingExpired,
    #[error("not enough items in inventory")]
    NotEnoughItems,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("listing belongs to another seller")]
    NotListingOwner,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
