//! Service layer for catalog operations
//!
//! `normalizer` maps provider records to canonical movies without doing any
//! I/O. `aggregator` drives the upstream calls: single-source search,
//! aggregated search, recommendations, detail lookup and category listing.

pub mod aggregator;
pub mod normalizer;

pub use aggregator::{AggregatedSearch, CatalogAggregator, CategoryPage};
pub use normalizer::{normalize, normalize_detail, parse_episodes};
