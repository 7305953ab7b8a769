//! Streaming relay for caller-supplied media and playlist URLs.
//!
//! Key behaviors:
//!   - Every target passes the `UrlSafetyGate` before any network activity.
//!   - The upstream status is replayed as-is, error statuses included.
//!   - The body is streamed chunk by chunk, never buffered.
//!   - Configured headers and hop-by-hop headers are stripped from the reply.
//!   - A `Cache-Control` hint is added when the upstream sent none.
//!   - When no upstream response arrives after all retries, the caller gets
//!     a plain-text 500 naming the failure.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Response, StatusCode, header};
use tracing::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::utils::url_guard::redact_credentials;
use crate::utils::{RetryingFetcher, UrlSafetyGate};

/// Connection-scoped headers that must not cross a proxy hop
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Drops upstream headers the caller must not see
#[derive(Debug, Clone)]
pub struct HeaderFilter {
    stripped: Vec<HeaderName>,
}

impl HeaderFilter {
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut stripped: Vec<HeaderName> = HOP_BY_HOP
            .iter()
            .map(|name| HeaderName::from_static(name))
            .collect();

        for name in names {
            match HeaderName::from_bytes(name.as_ref().trim().as_bytes()) {
                Ok(parsed) if !stripped.contains(&parsed) => stripped.push(parsed),
                Ok(_) => {}
                Err(e) => warn!("Ignoring invalid filtered header '{}': {}", name.as_ref(), e),
            }
        }

        Self { stripped }
    }

    pub fn is_stripped(&self, name: &HeaderName) -> bool {
        self.stripped.contains(name)
    }

    /// Copy `upstream` minus the stripped names, keeping repeated values
    pub fn apply(&self, upstream: &HeaderMap) -> HeaderMap {
        let mut forwarded = HeaderMap::with_capacity(upstream.len());
        for (name, value) in upstream {
            if !self.is_stripped(name) {
                forwarded.append(name.clone(), value.clone());
            }
        }
        forwarded
    }
}

/// Fetches a vetted target and streams it back to the caller
#[derive(Debug, Clone)]
pub struct ProxyRelay {
    fetcher: RetryingFetcher,
    gate: UrlSafetyGate,
    filter: HeaderFilter,
    cache_control: Option<HeaderValue>,
}

impl ProxyRelay {
    pub fn new(fetcher: RetryingFetcher, gate: UrlSafetyGate, config: &RelayConfig) -> Self {
        let cache_control =
            HeaderValue::from_str(&format!("public, max-age={}", config.cache_max_age)).ok();
        Self {
            fetcher,
            gate,
            filter: HeaderFilter::new(&config.filtered_headers),
            cache_control,
        }
    }

    /// Relay an already decoded target URL
    pub async fn relay(&self, target: &str) -> Response<Body> {
        let url = match self.gate.check(target) {
            Ok(url) => url,
            Err(e) => {
                warn!("Relay target rejected: {}", e);
                return error_response(StatusCode::BAD_REQUEST, "Invalid or disallowed target URL");
            }
        };
        let display_url = redact_credentials(url.as_str());

        let upstream = match self.fetcher.fetch(url.as_str()).await {
            Ok(response) => response,
            Err(e) => {
                error!("Relay to {} failed: {}", display_url, e);
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("Proxy request failed: {e}"),
                );
            }
        };

        let status = upstream.status();
        if status.is_success() {
            debug!("Upstream {} answered {}", display_url, status);
        } else {
            info!("Relaying error status {} from {}", status, display_url);
        }

        let mut headers = self.filter.apply(upstream.headers());
        if !headers.contains_key(header::CACHE_CONTROL)
            && let Some(value) = &self.cache_control
        {
            headers.insert(header::CACHE_CONTROL, value.clone());
        }

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

/// Simple helper to construct a uniform plain-text error response.
pub fn error_response(status: StatusCode, msg: &str) -> Response<Body> {
    let mut response = Response::new(Body::from(msg.to_string()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
