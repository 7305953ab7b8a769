//! Data models
//!
//! `movie` holds the canonical records this service returns, `upstream`
//! the provider wire format they are normalized from.

pub mod movie;
pub mod upstream;

pub use movie::{CanonicalMovie, Episode, Pagination};
pub use upstream::{VodListResponse, VodRecord};
