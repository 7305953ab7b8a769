//! HTTP middleware
//!
//! Request logging, security headers and the panic handler installed on
//! the router.

use std::any::Any;
use std::time::Instant;

use axum::{
    Json,
    extract::Request,
    http::{HeaderValue, Method, StatusCode, Uri, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use super::responses::ApiResponse;

/// Request logging middleware
///
/// Logs all incoming requests with timing information
pub async fn request_logging_middleware(
    method: Method,
    uri: Uri,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    // Generate request ID for tracing
    let request_id = uuid::Uuid::new_v4().to_string();
    // Relay targets may carry credentials, so only the route prefix is logged
    let path = loggable_path(&uri);

    info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        "HTTP request started"
    );

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let duration = start.elapsed();

    if status >= 400 {
        warn!(
            method = %method,
            path = %path,
            status = status,
            request_id = %request_id,
            duration_ms = duration.as_millis(),
            "HTTP request completed with error"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = status,
            request_id = %request_id,
            duration_ms = duration.as_millis(),
            "HTTP request completed"
        );
    }

    response
}

fn loggable_path(uri: &Uri) -> &str {
    let path = uri.path();
    if path.starts_with("/proxy/") {
        "/proxy/*"
    } else {
        path
    }
}

/// Security headers middleware
///
/// Relayed media is embedded by the player page, so no framing or CSP
/// policy is imposed here.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}

/// Panic handler for `CatchPanicLayer`
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        *message
    } else {
        "unknown panic payload"
    };
    error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("Internal server error".to_string())),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_targets_are_not_logged() {
        let uri: Uri = "/proxy/https%3A%2F%2Fuser%3Apw%40cdn.example.com%2Fa".parse().unwrap();
        assert_eq!(loggable_path(&uri), "/proxy/*");
        let uri: Uri = "/api/search?q=harbor".parse().unwrap();
        assert_eq!(loggable_path(&uri), "/api/search");
    }

    #[test]
    fn panic_payload_becomes_json_500() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
