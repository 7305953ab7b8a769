//! Catalog relay
//!
//! HTTP service that relays media through a URL safety gate and aggregates
//! several video-catalog APIs behind one normalized JSON interface.

pub mod config;
pub mod errors;
pub mod models;
pub mod proxy;
pub mod services;
pub mod sources;
pub mod utils;
pub mod web;
