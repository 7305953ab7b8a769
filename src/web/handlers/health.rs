//! Health check HTTP handler

use axum::{extract::State, response::IntoResponse};
use serde::Serialize;

use crate::web::{AppState, responses::ok};

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub sources: usize,
}

/// Liveness only; upstream catalogs are not probed
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    ok(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        sources: state.aggregator.registry().visible(true).count(),
    })
}
