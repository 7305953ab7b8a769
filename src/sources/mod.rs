//! Upstream catalog registry
//!
//! The registry is built once at startup from `Config::sources` and shared
//! read-only behind an `Arc`. Nothing mutates it afterwards.

use serde::Serialize;
use url::Url;

use crate::config::SourceConfig;
use crate::errors::{AppError, AppResult};

pub mod categories;

pub use categories::{CATEGORIES, Category, find_category};

/// Built-in registry used when the configuration names no sources
const BUILTIN_SOURCES: &[(&str, &str, &str, bool, Option<&str>)] = &[
    (
        "primary",
        "Primary Catalog",
        "https://catalog-primary.example/api.php/provide/vod",
        false,
        None,
    ),
    (
        "mirror",
        "Mirror Catalog",
        "https://catalog-mirror.example/api.php/provide/vod",
        false,
        None,
    ),
    (
        "archive",
        "Archive Catalog",
        "https://catalog-archive.example/api.php/provide/vod",
        false,
        Some("https://detail.catalog-archive.example/api.php/provide/vod"),
    ),
    (
        "classic",
        "Classic Films",
        "https://classic-films.example/api.php/provide/vod",
        false,
        None,
    ),
    (
        "anime",
        "Anime Library",
        "https://anime-library.example/api.php/provide/vod",
        false,
        None,
    ),
    (
        "series",
        "Series Hub",
        "https://series-hub.example/api.php/provide/vod",
        false,
        None,
    ),
    (
        "after-dark",
        "After Dark",
        "https://after-dark.example/api.php/provide/vod",
        true,
        None,
    ),
];

/// Default value for `Config::sources`
pub fn builtin_sources() -> Vec<SourceConfig> {
    BUILTIN_SOURCES
        .iter()
        .map(|(key, name, api, adult, detail)| SourceConfig {
            key: key.to_string(),
            name: name.to_string(),
            api: api.to_string(),
            adult: *adult,
            detail: detail.map(str::to_string),
        })
        .collect()
}

/// One upstream catalog API, with endpoints already parsed
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntry {
    pub key: String,
    pub display_name: String,
    pub query_endpoint: Url,
    pub is_adult: bool,
    pub detail_base: Option<Url>,
}

impl SourceEntry {
    /// Endpoint for detail lookups, falling back to the query endpoint
    pub fn detail_endpoint(&self) -> &Url {
        self.detail_base.as_ref().unwrap_or(&self.query_endpoint)
    }
}

impl TryFrom<&SourceConfig> for SourceEntry {
    type Error = AppError;

    fn try_from(config: &SourceConfig) -> AppResult<Self> {
        let parse = |value: &str| {
            Url::parse(value).map_err(|e| {
                AppError::configuration(format!(
                    "source '{}' has an invalid endpoint '{}': {}",
                    config.key, value, e
                ))
            })
        };

        Ok(Self {
            key: config.key.clone(),
            display_name: config.name.clone(),
            query_endpoint: parse(&config.api)?,
            is_adult: config.adult,
            detail_base: config.detail.as_deref().map(parse).transpose()?,
        })
    }
}

/// Public listing of a source for `/api/sources`
#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub key: String,
    pub name: String,
    pub adult: bool,
}

impl From<&SourceEntry> for SourceSummary {
    fn from(entry: &SourceEntry) -> Self {
        Self {
            key: entry.key.clone(),
            name: entry.display_name.clone(),
            adult: entry.is_adult,
        }
    }
}

/// Immutable, ordered table of upstream sources
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    entries: Vec<SourceEntry>,
}

impl SourceRegistry {
    pub fn from_config(sources: &[SourceConfig]) -> AppResult<Self> {
        let entries = sources
            .iter()
            .map(SourceEntry::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&SourceEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// Look up a source, turning an unknown key into a validation error
    pub fn require(&self, key: &str) -> AppResult<&SourceEntry> {
        self.get(key)
            .ok_or_else(|| AppError::validation(format!("Unknown source: {key}")))
    }

    /// Sources in registry order, adult ones only when asked for
    pub fn visible(&self, include_adult: bool) -> impl Iterator<Item = &SourceEntry> {
        self.entries
            .iter()
            .filter(move |entry| include_adult || !entry.is_adult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SourceRegistry {
        SourceRegistry::from_config(&builtin_sources()).unwrap()
    }

    #[test]
    fn builtin_table_parses() {
        let registry = registry();
        assert_eq!(registry.visible(true).count(), BUILTIN_SOURCES.len());
        assert!(registry.get("primary").is_some());
    }

    #[test]
    fn visible_hides_adult_sources_by_default() {
        let registry = registry();
        assert!(registry.visible(false).all(|entry| !entry.is_adult));
        assert!(registry.visible(false).count() < registry.visible(true).count());
    }

    #[test]
    fn require_rejects_unknown_keys() {
        let err = registry().require("bogus").unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn detail_endpoint_prefers_detail_base() {
        let registry = registry();
        let archive = registry.get("archive").unwrap();
        assert_eq!(
            archive.detail_endpoint().host_str(),
            Some("detail.catalog-archive.example")
        );
        let primary = registry.get("primary").unwrap();
        assert_eq!(primary.detail_endpoint(), &primary.query_endpoint);
    }
}
