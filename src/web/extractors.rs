//! Query-string parameters for the catalog and relay endpoints

use serde::{Deserialize, Deserializer};

use crate::errors::{AppError, AppResult};

/// `?includeAdult=` flag shared by listing endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdultFilterParams {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub include_adult: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub include_adult: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub aggregated: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceParams {
    #[serde(default)]
    pub source: Option<String>,
}

/// `?page=` is kept raw so a malformed value becomes a JSON validation error
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryParams {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl CategoryParams {
    /// Requested page, 1 when absent or blank
    pub fn page(&self) -> AppResult<u32> {
        match self.page.as_deref().map(str::trim) {
            None | Some("") => Ok(1),
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::validation(format!("Invalid page number: {raw}"))),
        }
    }
}

/// `?auth=` digest accepted by the relay when a password is configured
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayAuthParams {
    #[serde(default)]
    pub auth: Option<String>,
}

/// Accepts `true`/`1`/`yes`/`on` in any case; anything else is false
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.is_some_and(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        )
    }))
}
