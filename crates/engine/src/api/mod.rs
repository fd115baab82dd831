//! HTTP API layer.

pub mod dto;
pub mod error;
pub mod extract;
pub mod http;

pub use error::ApiError;
pub use http::routes;
