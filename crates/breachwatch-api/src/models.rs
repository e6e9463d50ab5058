// Wire types for the breach-monitoring backend.
//
// These mirror the JSON the backend emits and nothing more. Normalization
// (tag decoding, login-type parsing, secret handling) happens in
// `breachwatch-core`'s conversion layer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ── Search ───────────────────────────────────────────────────────────

/// Query parameters for `GET /api/search`.
///
/// `filters` is an ordered list of key/value pairs rather than a map so a
/// key may repeat (two `status` facets, for instance).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    pub q: String,
    pub page: u32,
    pub per_page: u32,
    pub filters: Vec<(String, String)>,
    pub excluded_ip_ranges: Vec<String>,
}

impl SearchParams {
    /// Query-string key carrying one excluded IP range per pair.
    pub const EXCLUDE_KEY: &'static str = "exclude_ip";

    /// Flatten into the ordered pairs sent on the wire:
    /// `q`, `page`, `per_page`, the filters, then one `exclude_ip` per range.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(3 + self.filters.len() + self.excluded_ip_ranges.len());
        pairs.push(("q".to_owned(), self.q.clone()));
        pairs.push(("page".to_owned(), self.page.to_string()));
        pairs.push(("per_page".to_owned(), self.per_page.to_string()));
        pairs.extend(self.filters.iter().cloned());
        pairs.extend(
            self.excluded_ip_ranges
                .iter()
                .map(|range| (Self::EXCLUDE_KEY.to_owned(), range.clone())),
        );
        pairs
    }
}

/// Body of a successful `GET /api/search`.
///
/// `results` is mandatory: a body without it is malformed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    pub results: Vec<BreachRecord>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub pages: Option<u64>,
    #[serde(default)]
    pub current_page: Option<u32>,
}

/// One compromised asset as the backend reports it.
///
/// `tags` is kept as raw JSON: depending on the backend's vintage it is an
/// array of strings, an object, or either of those encoded as a string.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BreachRecord {
    pub id: i64,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub tags: serde_json::Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default)]
    pub is_accessible: bool,
    #[serde(default)]
    pub has_login_form: bool,
    #[serde(default)]
    pub login_form_type: Option<String>,
    #[serde(default)]
    pub web_application: Option<String>,
    #[serde(default)]
    pub is_parked: bool,
    #[serde(default)]
    pub is_breached: bool,
    #[serde(default)]
    pub created_at: String,
}

// ── Statistics ───────────────────────────────────────────────────────

/// Body of `GET /api/statistics`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StatisticsResponse {
    pub total_records: u64,
    #[serde(default)]
    pub accessible_domains: u64,
    #[serde(default)]
    pub unique_domains: u64,
    #[serde(default)]
    pub login_forms: u64,
    #[serde(default)]
    pub resolved_cases: u64,
    #[serde(default)]
    pub is_parked: Option<u64>,
    #[serde(default)]
    pub previously_breached: Option<u64>,
    /// Count per login form type (`basic`, `captcha`, `otp`, `other`).
    #[serde(default)]
    pub login_form_types: HashMap<String, u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn query_pairs_keep_order_and_duplicates() {
        let params = SearchParams {
            q: "portal".into(),
            page: 2,
            per_page: 25,
            filters: vec![
                ("status".into(), "breached".into()),
                ("status".into(), "accessible".into()),
            ],
            excluded_ip_ranges: vec!["10.0.0.0/8".into(), "127.0.0.0/8".into()],
        };

        let pairs = params.to_query_pairs();
        let pairs: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("q", "portal"),
                ("page", "2"),
                ("per_page", "25"),
                ("status", "breached"),
                ("status", "accessible"),
                ("exclude_ip", "10.0.0.0/8"),
                ("exclude_ip", "127.0.0.0/8"),
            ]
        );
    }

    #[test]
    fn record_accepts_sparse_payload() {
        let record: BreachRecord = serde_json::from_value(json!({
            "id": 7,
            "domain": "example.net",
            "tags": ["critical"]
        }))
        .unwrap();

        assert_eq!(record.id, 7);
        assert_eq!(record.domain, "example.net");
        assert!(record.ip_address.is_none());
        assert!(!record.is_breached);
        assert_eq!(record.tags, json!(["critical"]));
    }

    #[test]
    fn search_response_requires_results() {
        let err = serde_json::from_value::<SearchResponse>(json!({ "total": 3 }));
        assert!(err.is_err());
    }
}
