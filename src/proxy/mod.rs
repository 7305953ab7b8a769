//! Proxy relay
//!
//! Streams arbitrary upstream media and playlist URLs back to the browser
//! after the safety gate has vetted them.

pub mod http_stream;

pub use http_stream::{HeaderFilter, ProxyRelay, error_response};
