use serde::{Deserialize, Serialize};

/// Normalized catalog item, independent of the upstream that produced it
///
/// Ids are only unique within one source: two sources may return the same
/// title under different ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalMovie {
    pub id: String,
    pub title: String,
    pub poster_url: String,
    pub year: String,
    pub area: String,
    pub genre_label: String,
    pub remarks_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directors: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<String>,
    pub source_key: String,
    pub source_display_name: String,
    pub is_adult: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<Vec<Episode>>,
}

impl CanonicalMovie {
    /// Key used to collapse duplicates across sources
    pub fn dedup_key(&self) -> (&str, &str) {
        (self.title.as_str(), self.year.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// 1-based position in the emitted list
    pub index: u32,
    pub title: String,
    pub playback_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}
