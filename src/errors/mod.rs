//! Centralized error handling for the catalog relay
//!
//! Two error families exist:
//!
//! - **AppError**: everything a request handler can fail with. The web layer
//!   maps each variant to an HTTP status in `web::responses::handle_error`.
//! - **FetchError**: outbound HTTP failures produced by the fetcher. The relay
//!   turns these into plain-text 500s, the aggregator either recovers them
//!   (fan-out branches) or wraps them into `AppError::Upstream`.
//!
//! # Usage
//!
//! ```rust
//! use catalog_relay::errors::{AppError, AppResult};
//!
//! fn lookup(key: &str) -> AppResult<&str> {
//!     if key.is_empty() {
//!         return Err(AppError::validation("source key is required"));
//!     }
//!     Ok(key)
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for outbound fetch results
pub type FetchResult<T> = Result<T, FetchError>;
