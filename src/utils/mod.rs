//! Utility modules for the catalog relay
//!
//! Outbound HTTP plumbing, URL safety checks and shared-secret hashing used
//! by the relay, the aggregator and the web layer.

pub mod http_client;
pub mod retry;
pub mod secrets;
pub mod url_guard;

// Re-export commonly used types for convenience
pub use http_client::{FetchOptions, RetryingFetcher};
pub use secrets::SharedSecrets;
pub use url_guard::{UrlSafetyGate, decode_proxy_target, repair_scheme_slashes};
