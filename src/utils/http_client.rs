use std::time::Duration;

use reqwest::{Client, Response, redirect::Policy};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::RelayConfig;
use crate::errors::{AppError, AppResult, FetchError, FetchResult};
use crate::utils::retry::retry;
use crate::utils::url_guard::{UrlSafetyGate, redact_credentials};

/// Redirect hops followed before a request fails
const MAX_REDIRECTS: usize = 10;

/// Timeout, retry and identity settings shared by every outbound request
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub max_retries: u32,
    pub user_agent: String,
}

impl From<&RelayConfig> for FetchOptions {
    fn from(config: &RelayConfig) -> Self {
        Self {
            timeout: config.timeout,
            max_retries: config.max_retries,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Outbound GET client with per-attempt timeouts and bounded retries
///
/// One instance is built at startup and cloned into every consumer; the
/// underlying `reqwest::Client` pools connections across clones.
#[derive(Debug, Clone)]
pub struct RetryingFetcher {
    client: Client,
    options: FetchOptions,
}

impl RetryingFetcher {
    pub fn new(options: FetchOptions) -> AppResult<Self> {
        Self::build(options, Policy::limited(MAX_REDIRECTS))
    }

    /// Fetcher whose redirect hops must each pass `gate`
    ///
    /// A `Location` the gate rejects fails the request instead of being
    /// followed, so a permitted host cannot bounce the fetch to a blocked one.
    pub fn with_redirect_gate(options: FetchOptions, gate: UrlSafetyGate) -> AppResult<Self> {
        Self::build(options, gated_redirects(gate))
    }

    fn build(options: FetchOptions, redirects: Policy) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .connect_timeout(options.timeout)
            .redirect(redirects)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, options })
    }

    /// GET `url` and hand back the response with its body unread
    ///
    /// Only the wait for the response head is bounded by the timeout. Any
    /// HTTP status counts as success; connection failures and timeouts are
    /// retried up to `max_retries` times.
    pub async fn fetch(&self, url: &str) -> FetchResult<Response> {
        retry(
            self.options.max_retries,
            |attempt| {
                debug!(
                    "Fetching {} (attempt {})",
                    redact_credentials(url),
                    attempt
                );
                self.send_once(url)
            },
            FetchError::is_transport,
        )
        .await
    }

    /// GET `url` and decode a JSON body, in a single attempt
    ///
    /// The timeout covers the whole exchange including the body. A non-2xx
    /// status or an unparsable body is an error.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        debug!("Fetching JSON from {}", redact_credentials(url));

        let exchange = async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|source| self.transport_error(url, source))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let body = response
                .bytes()
                .await
                .map_err(|source| self.transport_error(url, source))?;

            serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
        };

        tokio::time::timeout(self.options.timeout, exchange)
            .await
            .map_err(|_| self.timeout_error(url))?
    }

    async fn send_once(&self, url: &str) -> FetchResult<Response> {
        match tokio::time::timeout(self.options.timeout, self.client.get(url).send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(source)) => Err(self.transport_error(url, source)),
            Err(_) => Err(self.timeout_error(url)),
        }
    }

    fn transport_error(&self, url: &str, source: reqwest::Error) -> FetchError {
        if source.is_timeout() {
            return self.timeout_error(url);
        }
        if source.is_redirect() {
            return FetchError::Redirect {
                url: redact_credentials(url),
                source,
            };
        }
        FetchError::Request {
            url: redact_credentials(url),
            source,
        }
    }

    fn timeout_error(&self, url: &str) -> FetchError {
        FetchError::Timeout {
            url: redact_credentials(url),
            timeout: self.options.timeout,
        }
    }
}

fn gated_redirects(gate: UrlSafetyGate) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        if gate.is_allowed(attempt.url().as_str()) {
            return attempt.follow();
        }
        let location = redact_credentials(attempt.url().as_str());
        warn!("Refusing redirect to disallowed target {}", location);
        attempt.error(format!("redirect to disallowed target {location}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_relay_config() {
        let config = RelayConfig {
            timeout: Duration::from_millis(750),
            max_retries: 4,
            ..RelayConfig::default()
        };
        let options = FetchOptions::from(&config);
        assert_eq!(options.timeout, Duration::from_millis(750));
        assert_eq!(options.max_retries, 4);
        assert_eq!(options.user_agent, config.user_agent);
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = RetryingFetcher::new(FetchOptions {
            timeout: Duration::from_millis(500),
            max_retries: 1,
            user_agent: "test-agent".to_string(),
        })
        .unwrap();

        let err = fetcher.fetch(&format!("http://{addr}/")).await.unwrap_err();
        assert!(err.is_transport());

        let err = fetcher
            .fetch_json::<serde_json::Value>(&format!("http://{addr}/"))
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
