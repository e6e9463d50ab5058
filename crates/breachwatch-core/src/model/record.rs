// ── Result records ──
//
// Canonical, read-only view of one compromised asset. Built once at
// ingestion (see `convert`), after which the core never mutates it.

use std::fmt;

use secrecy::SecretString;
use serde::{Serialize, Serializer};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ── LoginFormType ───────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LoginFormType {
    Basic,
    Captcha,
    Otp,
    Other,
}

impl LoginFormType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic Auth",
            Self::Captcha => "CAPTCHA",
            Self::Otp => "OTP/2FA",
            Self::Other => "Other Auth",
        }
    }
}

// ── Tags ────────────────────────────────────────────────────────────

/// One normalized tag: either a bare label or a key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Label(String),
    Pair { key: String, value: String },
}

impl Tag {
    pub fn pair(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Pair {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self::Label(text.into())
    }

    /// Whether a `tag` filter value selects this tag.
    ///
    /// `key:value` selects the matching pair, or a label spelled exactly
    /// like that. A bare value selects an equal label.
    pub fn matches_token(&self, token: &str) -> bool {
        match self {
            Self::Label(text) => text == token,
            Self::Pair { key, value } => token
                .split_once(':')
                .is_some_and(|(k, v)| k == key && v == value),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(text) => f.write_str(text),
            Self::Pair { key, value } => write!(f, "{key}:{value}"),
        }
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A record's tags in canonical form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    pub fn new(tags: Vec<Tag>) -> Self {
        Self(tags)
    }

    pub fn matches_token(&self, token: &str) -> bool {
        self.0.iter().any(|t| t.matches_token(token))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Chip text per tag, in order.
    pub fn chips(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── ResultRecord ────────────────────────────────────────────────────

/// One compromised asset.
///
/// `password` is held as a secret: never displayed, searched, or
/// serialized.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultRecord {
    pub id: i64,
    pub uri: String,
    pub username: Option<String>,
    #[serde(skip)]
    pub password: Option<SecretString>,
    pub domain: String,
    pub ip_address: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub tags: TagSet,
    pub title: Option<String>,
    pub is_resolved: bool,
    pub is_accessible: bool,
    pub has_login_form: bool,
    /// Raw login type as reported (`basic`, `captcha`, `otp`, `other`).
    pub login_form_type: Option<String>,
    pub web_application: Option<String>,
    pub is_parked: bool,
    pub is_breached: bool,
    pub created_at: String,
}

impl ResultRecord {
    /// Parsed login type, when the raw value is one of the known kinds.
    pub fn login_form_kind(&self) -> Option<LoginFormType> {
        self.login_form_type.as_deref()?.parse().ok()
    }

    /// Lowercased concatenation of every searchable field.
    ///
    /// Fields are separated by `\u{1f}` so a query never matches across a
    /// field boundary. Absent optionals contribute nothing.
    pub fn searchable_text(&self) -> String {
        const SEP: char = '\u{1f}';

        let mut text = String::with_capacity(256);
        let mut push = |field: &str| {
            text.push_str(field);
            text.push(SEP);
        };

        push(&self.id.to_string());
        push(&self.uri);
        push(&self.domain);
        push(&self.created_at);
        for field in [
            &self.username,
            &self.ip_address,
            &self.path,
            &self.title,
            &self.login_form_type,
            &self.web_application,
        ]
        .into_iter()
        .flatten()
        {
            push(field);
        }
        if let Some(port) = self.port {
            push(&port.to_string());
        }
        for tag in &self.tags {
            push(&tag.to_string());
        }
        for flag in [
            self.is_resolved,
            self.is_accessible,
            self.has_login_form,
            self.is_parked,
            self.is_breached,
        ] {
            push(if flag { "true" } else { "false" });
        }

        text.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn tag_token_matching() {
        let pair = Tag::pair("type", "ecommerce");
        assert!(pair.matches_token("type:ecommerce"));
        assert!(!pair.matches_token("type"));
        assert!(!pair.matches_token("ecommerce"));

        let label = Tag::label("critical");
        assert!(label.matches_token("critical"));
        assert!(!label.matches_token("critical:yes"));

        assert!(Tag::label("a:b").matches_token("a:b"));
    }

    #[test]
    fn tags_serialize_as_chip_text() {
        let tags = TagSet::new(vec![Tag::pair("env", "prod"), Tag::label("urgent")]);
        assert_eq!(
            serde_json::to_value(&tags).ok(),
            Some(serde_json::json!(["env:prod", "urgent"]))
        );
    }

    #[test]
    fn searchable_text_skips_password_and_absent_fields() {
        let record = ResultRecord {
            id: 42,
            uri: "https://Portal.Example.com/login".into(),
            password: Some(SecretString::from("hunter2".to_owned())),
            domain: "portal.example.com".into(),
            ..ResultRecord::default()
        };
        let text = record.searchable_text();

        assert!(text.contains("portal.example.com/login"));
        assert!(text.contains("42"));
        assert!(!text.contains("hunter2"));
        assert!(!text.contains("null"));
        assert!(!text.contains("none"));
    }

    #[test]
    fn password_is_not_serialized() {
        let record = ResultRecord {
            password: Some(SecretString::from("hunter2".to_owned())),
            ..ResultRecord::default()
        };
        let json = serde_json::to_string(&record).unwrap_or_default();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn login_form_kind_parses_known_values() {
        let record = ResultRecord {
            login_form_type: Some("OTP".into()),
            ..ResultRecord::default()
        };
        assert_eq!(record.login_form_kind(), Some(LoginFormType::Otp));
        assert_eq!(LoginFormType::Otp.label(), "OTP/2FA");
    }
}
