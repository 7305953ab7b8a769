use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::errors::{AppError, AppResult};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

/// Prefix for structured environment overrides (`CATALOG_RELAY_RELAY__MAX_RETRIES=3`)
pub const ENV_PREFIX: &str = "CATALOG_RELAY_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Upstream catalog registry; replaces the built-in table when present
    #[serde(default = "crate::sources::builtin_sources")]
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding index.html, player.html and the rest of the UI
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// `*` allows any origin, anything else is matched exactly
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

/// Outbound fetch and relay behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Applied to every outbound request, per attempt
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,
    /// Additional attempts after the first failed one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Hostnames rejected by exact match
    #[serde(default = "default_blocked_hosts")]
    pub blocked_hosts: Vec<String>,
    /// Hostnames rejected by string prefix
    #[serde(default = "default_blocked_ip_prefixes")]
    pub blocked_ip_prefixes: Vec<String>,
    /// Upstream response headers never forwarded to the caller
    #[serde(default = "default_filtered_headers")]
    pub filtered_headers: Vec<String>,
    /// max-age used when the upstream sends no Cache-Control
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age: u64,
}

/// Shared secrets injected into pages as SHA-256 hashes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    pub password: Option<String>,
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Source used when a request names none
    #[serde(default = "default_source_key")]
    pub default_source: String,
    #[serde(default = "default_search_result_cap")]
    pub search_result_cap: usize,
    #[serde(default = "default_recommendation_cap")]
    pub recommendation_cap: usize,
    /// How many sources recommendations draw from
    #[serde(default = "default_recommendation_sources")]
    pub recommendation_sources: usize,
    /// Listing pages fetched per source for recommendations
    #[serde(default = "default_recommendation_pages")]
    pub recommendation_pages: u32,
}

/// One upstream catalog API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub key: String,
    pub name: String,
    /// Query endpoint, e.g. `https://host/api.php/provide/vod`
    pub api: String,
    #[serde(default)]
    pub adult: bool,
    /// Alternate endpoint for detail lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

// Web defaults
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STATIC_DIR)
}

fn default_cors_origin() -> String {
    DEFAULT_CORS_ORIGIN.to_string()
}

// Relay defaults
fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_blocked_hosts() -> Vec<String> {
    DEFAULT_BLOCKED_HOSTS.iter().map(|s| s.to_string()).collect()
}

fn default_blocked_ip_prefixes() -> Vec<String> {
    DEFAULT_BLOCKED_IP_PREFIXES.iter().map(|s| s.to_string()).collect()
}

fn default_filtered_headers() -> Vec<String> {
    DEFAULT_FILTERED_HEADERS.iter().map(|s| s.to_string()).collect()
}

fn default_cache_max_age() -> u64 {
    DEFAULT_CACHE_MAX_AGE
}

// Catalog defaults
fn default_source_key() -> String {
    DEFAULT_SOURCE_KEY.to_string()
}

fn default_search_result_cap() -> usize {
    DEFAULT_SEARCH_RESULT_CAP
}

fn default_recommendation_cap() -> usize {
    DEFAULT_RECOMMENDATION_CAP
}

fn default_recommendation_sources() -> usize {
    DEFAULT_RECOMMENDATION_SOURCES
}

fn default_recommendation_pages() -> u32 {
    DEFAULT_RECOMMENDATION_PAGES
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            cors_origin: default_cors_origin(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
            blocked_hosts: default_blocked_hosts(),
            blocked_ip_prefixes: default_blocked_ip_prefixes(),
            filtered_headers: default_filtered_headers(),
            cache_max_age: default_cache_max_age(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_source: default_source_key(),
            search_result_cap: default_search_result_cap(),
            recommendation_cap: default_recommendation_cap(),
            recommendation_sources: default_recommendation_sources(),
            recommendation_pages: default_recommendation_pages(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig::default(),
            relay: RelayConfig::default(),
            auth: AuthConfig::default(),
            catalog: CatalogConfig::default(),
            sources: crate::sources::builtin_sources(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then the TOML file (if it exists), then
    /// `CATALOG_RELAY_*` variables, then the flat legacy variables.
    pub fn load(config_file: &Path) -> AppResult<Self> {
        let mut config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| AppError::configuration(e.to_string()))?;

        if config_file.exists() {
            info!("Configuration loaded from: {}", config_file.display());
        } else {
            info!(
                "No configuration file at {}, using defaults and environment",
                config_file.display()
            );
        }

        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the flat environment names deployments of this service use
    /// (`PORT`, `TIMEOUT`, `PASSWORD`, ...). `lookup` abstracts the
    /// environment so tests don't touch process state.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT") {
            self.web.port = parse_env("PORT", &port)?;
        }
        if let Some(origin) = get("CORS_ORIGIN") {
            self.web.cors_origin = origin;
        }
        if let Some(timeout_ms) = get("TIMEOUT") {
            self.relay.timeout = Duration::from_millis(parse_env("TIMEOUT", &timeout_ms)?);
        }
        if let Some(retries) = get("MAX_RETRIES") {
            self.relay.max_retries = parse_env("MAX_RETRIES", &retries)?;
        }
        if let Some(user_agent) = get("USER_AGENT") {
            self.relay.user_agent = user_agent;
        }
        if let Some(hosts) = get("BLOCKED_HOSTS") {
            self.relay.blocked_hosts = split_list(&hosts);
        }
        if let Some(prefixes) = get("BLOCKED_IP_PREFIXES") {
            self.relay.blocked_ip_prefixes = split_list(&prefixes);
        }
        if let Some(headers) = get("FILTERED_HEADERS") {
            self.relay.filtered_headers = split_list(&headers);
        }
        if let Some(max_age) = get("CACHE_MAX_AGE") {
            self.relay.cache_max_age = parse_env("CACHE_MAX_AGE", &max_age)?;
        }
        if let Some(password) = get("PASSWORD") {
            self.auth.password = Some(password);
        }
        if let Some(admin_password) = get("ADMINPASSWORD") {
            self.auth.admin_password = Some(admin_password);
        }
        Ok(())
    }

    /// Reject configurations the registry or server cannot work with
    pub fn validate(&self) -> AppResult<()> {
        if self.sources.is_empty() {
            return Err(AppError::configuration("at least one source is required"));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.key.trim().is_empty() {
                return Err(AppError::configuration("source key must not be empty"));
            }
            if !seen.insert(source.key.as_str()) {
                return Err(AppError::configuration(format!(
                    "duplicate source key '{}'",
                    source.key
                )));
            }
            for endpoint in std::iter::once(&source.api).chain(source.detail.iter()) {
                let parsed = url::Url::parse(endpoint).map_err(|e| {
                    AppError::configuration(format!(
                        "source '{}' has an invalid endpoint '{}': {}",
                        source.key, endpoint, e
                    ))
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(AppError::configuration(format!(
                        "source '{}' endpoint must be http or https",
                        source.key
                    )));
                }
            }
        }

        if !seen.contains(self.catalog.default_source.as_str()) {
            return Err(AppError::configuration(format!(
                "default source '{}' is not in the registry",
                self.catalog.default_source
            )));
        }
        if self.catalog.search_result_cap == 0 || self.catalog.recommendation_cap == 0 {
            return Err(AppError::configuration("result caps must be greater than zero"));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::configuration(format!("invalid {name} '{value}': {e}")))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.relay.timeout, Duration::from_millis(5000));
        assert_eq!(config.relay.filtered_headers.len(), 5);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[relay]
timeout = "2s"
max_retries = 0

[catalog]
default_source = "local"

[[sources]]
key = "local"
name = "Local"
api = "http://catalog.test/api.php/provide/vod"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.relay.timeout, Duration::from_secs(2));
        assert_eq!(config.relay.max_retries, 0);
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].key, "local");
    }

    #[test]
    fn legacy_env_names_apply() {
        let vars = env(&[
            ("PORT", "9000"),
            ("TIMEOUT", "1500"),
            ("MAX_RETRIES", "4"),
            ("BLOCKED_HOSTS", "a.test, b.test,"),
            ("PASSWORD", "secret"),
            ("USER_AGENT", ""),
        ]);
        let mut config = Config::default();
        config
            .apply_env_overrides(|name| vars.get(name).cloned())
            .unwrap();

        assert_eq!(config.web.port, 9000);
        assert_eq!(config.relay.timeout, Duration::from_millis(1500));
        assert_eq!(config.relay.max_retries, 4);
        assert_eq!(config.relay.blocked_hosts, vec!["a.test", "b.test"]);
        assert_eq!(config.auth.password.as_deref(), Some("secret"));
        assert_eq!(config.relay.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn bad_env_value_is_a_configuration_error() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(|name| (name == "PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn validate_rejects_duplicate_keys_and_unknown_default() {
        let mut config = Config::default();
        let first = config.sources[0].clone();
        config.sources.push(first);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.catalog.default_source = "missing".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_http_endpoint() {
        let mut config = Config::default();
        config.sources[0].api = "ftp://catalog.test/vod".to_string();
        assert!(config.validate().is_err());
    }
}
