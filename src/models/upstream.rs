//! Provider wire format
//!
//! Catalog APIs of this family answer `?ac=videolist` queries with a JSON
//! envelope around a `list` of `vod_*` records. Providers disagree on
//! whether ids and counters are numbers or strings, so every scalar is read
//! leniently and missing fields default to absent.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VodListResponse {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub code: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub pagecount: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub list: Vec<VodRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VodRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_pic: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_year: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_area: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub type_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_remarks: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_content: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_director: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_actor: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vod_play_url: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<VodRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<VodRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_scalar_types_are_accepted() {
        let body = r#"{
            "code": 1,
            "page": "2",
            "pagecount": 14,
            "total": "275",
            "list": [
                {"vod_id": 42, "vod_name": "Night Train", "vod_year": 2021},
                {"vod_id": "abc", "vod_name": "Harbor", "vod_year": null}
            ]
        }"#;
        let parsed: VodListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.page, Some(2));
        assert_eq!(parsed.pagecount, Some(14));
        assert_eq!(parsed.total, Some(275));
        assert_eq!(parsed.list[0].vod_id.as_deref(), Some("42"));
        assert_eq!(parsed.list[0].vod_year.as_deref(), Some("2021"));
        assert_eq!(parsed.list[1].vod_year, None);
    }

    #[test]
    fn missing_or_null_list_is_empty() {
        let parsed: VodListResponse = serde_json::from_str(r#"{"code": 0}"#).unwrap();
        assert!(parsed.list.is_empty());
        let parsed: VodListResponse = serde_json::from_str(r#"{"list": null}"#).unwrap();
        assert!(parsed.list.is_empty());
        assert_eq!(parsed.pagecount, None);
    }
}
