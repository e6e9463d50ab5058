// ── API-to-domain conversions ──
//
// Bridges raw `breachwatch_api` wire records into canonical
// `breachwatch_core::model` types. Tag normalization happens here and only
// here: the evaluator and renderers only ever see a `TagSet`.

use secrecy::SecretString;
use serde_json::Value;
use tracing::warn;

use breachwatch_api::BreachRecord;

use crate::model::{ResultRecord, Tag, TagSet};

// ── Helpers ────────────────────────────────────────────────────────

/// Drop blank optional strings so they count as absent.
fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

/// Render a JSON scalar as tag text. Structured values are rejected.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn tags_from_value(value: &Value, allow_encoded: bool) -> Option<TagSet> {
    match value {
        Value::Null => Some(TagSet::default()),
        Value::Array(items) => items
            .iter()
            .map(|item| scalar_text(item).map(Tag::Label))
            .filter(|tag| !matches!(tag, Some(Tag::Label(text)) if text.is_empty()))
            .collect::<Option<Vec<_>>>()
            .map(TagSet::new),
        Value::Object(map) => map
            .iter()
            .map(|(key, v)| match v {
                Value::Null => Some(Tag::label(key.as_str())),
                other => scalar_text(other).map(|text| Tag::pair(key.as_str(), text)),
            })
            .collect::<Option<Vec<_>>>()
            .map(TagSet::new),
        Value::String(raw) if allow_encoded => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Some(TagSet::default());
            }
            match serde_json::from_str::<Value>(raw).ok()? {
                inner @ (Value::Array(_) | Value::Object(_)) => tags_from_value(&inner, false),
                _ => None,
            }
        }
        Value::String(_) | Value::Number(_) | Value::Bool(_) => None,
    }
}

/// Normalize any accepted wire form of `tags` into a `TagSet`.
///
/// Accepts an array of strings, an object, either of those JSON-encoded
/// in a string, or null. Anything else yields an empty set and a warning;
/// the record itself is kept.
pub fn normalize_tags(record_id: i64, raw: &Value) -> TagSet {
    tags_from_value(raw, true).unwrap_or_else(|| {
        warn!(record_id, tags = %raw, "unparseable tags; treating as empty");
        TagSet::default()
    })
}

// ── Record conversion ──────────────────────────────────────────────

impl From<BreachRecord> for ResultRecord {
    fn from(raw: BreachRecord) -> Self {
        let tags = normalize_tags(raw.id, &raw.tags);
        Self {
            id: raw.id,
            uri: raw.uri,
            username: non_blank(raw.username),
            password: raw.password.map(SecretString::from),
            domain: raw.domain,
            ip_address: non_blank(raw.ip_address),
            port: raw.port,
            path: non_blank(raw.path),
            tags,
            title: non_blank(raw.title),
            is_resolved: raw.is_resolved,
            is_accessible: raw.is_accessible,
            has_login_form: raw.has_login_form,
            login_form_type: non_blank(raw.login_form_type),
            web_application: non_blank(raw.web_application),
            is_parked: raw.is_parked,
            is_breached: raw.is_breached,
            created_at: raw.created_at,
        }
    }
}

/// Convert a page of wire records.
pub fn records_from_wire(raw: Vec<BreachRecord>) -> Vec<ResultRecord> {
    raw.into_iter().map(ResultRecord::from).collect()
}
