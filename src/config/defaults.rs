/// Configuration default values
///
/// All default values for configuration options live here so they can be
/// changed in one place.
use std::time::Duration;

// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STATIC_DIR: &str = "./public";
pub const DEFAULT_CORS_ORIGIN: &str = "*";

// Relay defaults
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_CACHE_MAX_AGE: u64 = 7200;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";
pub const DEFAULT_BLOCKED_HOSTS: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0", "::1"];
// Prefix match, not CIDR: "172." also blocks public 172.x ranges.
pub const DEFAULT_BLOCKED_IP_PREFIXES: &[&str] = &["192.168.", "10.", "172."];
pub const DEFAULT_FILTERED_HEADERS: &[&str] = &[
    "content-security-policy",
    "cookie",
    "set-cookie",
    "x-frame-options",
    "access-control-allow-origin",
];

// Catalog defaults
pub const DEFAULT_SOURCE_KEY: &str = "primary";
pub const DEFAULT_SEARCH_RESULT_CAP: usize = 1000;
pub const DEFAULT_RECOMMENDATION_CAP: usize = 100;
pub const DEFAULT_RECOMMENDATION_SOURCES: usize = 5;
pub const DEFAULT_RECOMMENDATION_PAGES: u32 = 2;
