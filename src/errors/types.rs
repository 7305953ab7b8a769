//! Error type definitions for the catalog relay

use std::time::Duration;

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad or disallowed input: rejected URL, unknown source, invalid category
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Shared-secret check failed
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Upstream catalog call failed with no usable response
    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        #[source]
        source: Option<FetchError>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Outbound HTTP failure
///
/// `Timeout` and `Request` are transport failures and are retryable.
/// `Redirect` is final since every attempt would hit the same `Location`.
/// `Status` and `Decode` only come from the buffered JSON path, where a
/// response was received but cannot be used.
#[derive(Error, Debug)]
pub enum FetchError {
    /// No response head arrived within the configured timeout
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    /// Connection, TLS or protocol failure
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A redirect hop was refused or the hop limit was reached
    #[error("request to {url} was redirected: {source}")]
    Redirect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-success status
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    /// Upstream body could not be read or parsed
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    /// Whether another attempt could plausibly succeed
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Request { .. })
    }
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error for a resource id
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create an upstream error wrapping the fetch failure that caused it
    pub fn upstream<S: Into<String>>(message: S, source: FetchError) -> Self {
        Self::Upstream {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_retryable() {
        let timeout = FetchError::Timeout {
            url: "http://a.test".to_string(),
            timeout: Duration::from_secs(1),
        };
        let status = FetchError::Status {
            url: "http://a.test".to_string(),
            status: 502,
        };
        assert!(timeout.is_transport());
        assert!(!status.is_transport());
    }

    #[test]
    fn upstream_error_keeps_its_cause() {
        let err = AppError::upstream(
            "search failed",
            FetchError::Decode {
                url: "http://a.test".to_string(),
                message: "expected value".to_string(),
            },
        );
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("failed to decode response from http://a.test: expected value")
        );
    }
}
