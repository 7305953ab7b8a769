//! Relay endpoint handler

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Response, StatusCode, Uri},
    response::IntoResponse,
};
use tracing::warn;

use crate::errors::AppError;
use crate::proxy::error_response;
use crate::utils::decode_proxy_target;
use crate::web::{AppState, extractors::RelayAuthParams};

const RELAY_PREFIX: &str = "/proxy/";

/// GET /proxy/{*target}
///
/// The target is read from the raw request path rather than the matched
/// wildcard so that percent-encoded and collapsed `scheme:/` forms both
/// reach `decode_proxy_target` untouched.
pub async fn relay(
    State(state): State<AppState>,
    Query(params): Query<RelayAuthParams>,
    uri: Uri,
) -> Response<Body> {
    if !state.secrets.verify(params.auth.as_deref()) {
        return AppError::unauthorized("Missing or wrong auth digest").into_response();
    }

    let raw_target = uri.path().strip_prefix(RELAY_PREFIX).unwrap_or_default();
    let target = match decode_proxy_target(raw_target) {
        Ok(target) => target,
        Err(e) => {
            warn!("Relay target could not be decoded: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Invalid or disallowed target URL");
        }
    };

    state.relay.relay(&target).await
}
