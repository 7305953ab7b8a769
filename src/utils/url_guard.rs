//! Outbound URL safety checks for the relay
//!
//! The gate is a string/parse check only and never touches the network. Its
//! private-range filter is a hostname *prefix* match, not a CIDR test: the
//! default `172.` prefix blocks every `172.x` address including public ones,
//! while `169.254.` link-local and IPv6 private ranges other than the
//! literal `::1` pass unless an operator adds them to the configured lists.

use std::borrow::Cow;

use url::Url;

use crate::config::RelayConfig;
use crate::errors::{AppError, AppResult};

const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Decides whether the relay may fetch a caller-supplied URL
#[derive(Debug, Clone)]
pub struct UrlSafetyGate {
    blocked_hosts: Vec<String>,
    blocked_prefixes: Vec<String>,
}

impl UrlSafetyGate {
    pub fn new<H, P>(blocked_hosts: H, blocked_prefixes: P) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let normalize = |value: &str| value.trim().trim_matches(['[', ']']).to_ascii_lowercase();
        Self {
            blocked_hosts: blocked_hosts
                .into_iter()
                .map(|h| normalize(h.as_ref()))
                .filter(|h| !h.is_empty())
                .collect(),
            blocked_prefixes: blocked_prefixes
                .into_iter()
                .map(|p| normalize(p.as_ref()))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(&config.blocked_hosts, &config.blocked_ip_prefixes)
    }

    /// Parse `raw_url` and return it if the relay may fetch it
    pub fn check(&self, raw_url: &str) -> AppResult<Url> {
        let url = Url::parse(raw_url.trim())
            .map_err(|e| AppError::validation(format!("Invalid target URL: {e}")))?;

        if !ALLOWED_SCHEMES.contains(&url.scheme()) {
            return Err(AppError::validation(format!(
                "Unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .map(|h| h.trim_matches(['[', ']']).to_ascii_lowercase())
            .ok_or_else(|| AppError::validation("Target URL has no host"))?;

        if self.blocked_hosts.iter().any(|blocked| *blocked == host) {
            return Err(AppError::validation(format!("Target host is not allowed: {host}")));
        }
        if self
            .blocked_prefixes
            .iter()
            .any(|prefix| host.starts_with(prefix.as_str()))
        {
            return Err(AppError::validation(format!("Target host is not allowed: {host}")));
        }

        Ok(url)
    }

    pub fn is_allowed(&self, raw_url: &str) -> bool {
        self.check(raw_url).is_ok()
    }
}

/// Restore `scheme://` when an intermediate proxy collapsed it to `scheme:/`
///
/// Inputs that already carry a double slash, or no http(s) scheme at all,
/// are returned untouched, so applying this twice is the same as once.
pub fn repair_scheme_slashes(input: &str) -> Cow<'_, str> {
    for scheme in ["https:", "http:"] {
        let Some(head) = input.get(..scheme.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(scheme) {
            continue;
        }
        let rest = &input[scheme.len()..];
        if rest.starts_with('/') && !rest.starts_with("//") {
            return Cow::Owned(format!("{head}/{rest}"));
        }
        return Cow::Borrowed(input);
    }
    Cow::Borrowed(input)
}

/// Recover the relay target from the raw path tail after `/proxy/`
///
/// The tail may arrive percent-encoded (`https%3A%2F%2Fhost%2Fa`) or, when a
/// front proxy decoded and collapsed it, as `https:/host/a`. Both forms are
/// repaired before and after decoding.
pub fn decode_proxy_target(raw_tail: &str) -> AppResult<String> {
    if raw_tail.trim().is_empty() {
        return Err(AppError::validation("Missing target URL"));
    }

    let repaired = repair_scheme_slashes(raw_tail);
    let decoded = urlencoding::decode(&repaired)
        .map_err(|e| AppError::validation(format!("Target URL is not valid UTF-8: {e}")))?;

    Ok(repair_scheme_slashes(&decoded).into_owned())
}

/// Mask userinfo before a target URL goes into a log line
pub fn redact_credentials(raw_url: &str) -> String {
    match Url::parse(raw_url) {
        Ok(mut parsed) if !parsed.username().is_empty() || parsed.password().is_some() => {
            let _ = parsed.set_username("****");
            let _ = parsed.set_password(Some("****"));
            parsed.to_string()
        }
        _ => raw_url.to_string(),
    }
}
