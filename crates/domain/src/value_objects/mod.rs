//! Value objects and pure domain functions.

pub mod geo;
pub mod page;

pub use geo::haversine_distance_m;
pub use page::PageParams;
