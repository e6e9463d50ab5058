// ── Filter tokens ──
//
// A token is one (kind, value) facet the user has picked. Tokens live only
// for the lifetime of a search session; the set keeps insertion order,
// which is also chip display order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::FacetError;

// ── FilterKind ──────────────────────────────────────────────────────

/// Closed set of facet kinds.
///
/// Declaration order is the order kinds are grouped in on the wire.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FilterKind {
    Domain,
    Ip,
    Port,
    Path,
    Application,
    LoginType,
    Status,
    Tag,
}

impl FilterKind {
    /// Case-insensitive snake_case name, surrounding whitespace ignored.
    pub fn parse_name(raw: &str) -> Result<Self, FacetError> {
        let name = raw.trim();
        Self::from_str(name).map_err(|_| FacetError::UnknownKind(name.to_owned()))
    }

    /// Human label for chips and pickers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Domain => "Domain",
            Self::Ip => "IP",
            Self::Port => "Port",
            Self::Path => "Path",
            Self::Application => "Application",
            Self::LoginType => "Login Type",
            Self::Status => "Status",
            Self::Tag => "Tag",
        }
    }

    /// Known values for this kind, if it has a fixed vocabulary.
    pub fn options(self) -> &'static [FacetOption] {
        match self {
            Self::Status => STATUS_OPTIONS,
            Self::LoginType => LOGIN_TYPE_OPTIONS,
            Self::Application => APPLICATION_OPTIONS,
            Self::Domain | Self::Ip | Self::Port | Self::Path | Self::Tag => &[],
        }
    }
}

// ── Facet vocabularies ──────────────────────────────────────────────

/// A pickable facet value and its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn opt(value: &'static str, label: &'static str) -> FacetOption {
    FacetOption { value, label }
}

pub const STATUS_OPTIONS: &[FacetOption] = &[
    opt("unresolved", "Unresolved"),
    opt("accessible", "Accessible"),
    opt("login_form", "Has Login Form"),
    opt("parked", "Parked Domain"),
    opt("breached", "Previously Breached"),
];

pub const LOGIN_TYPE_OPTIONS: &[FacetOption] = &[
    opt("basic", "Basic Auth"),
    opt("captcha", "CAPTCHA"),
    opt("otp", "OTP/2FA"),
    opt("other", "Other"),
];

pub const APPLICATION_OPTIONS: &[FacetOption] = &[
    opt("wordpress", "WordPress"),
    opt("citrix", "Citrix"),
    opt("exchange", "Exchange"),
    opt("sharepoint", "SharePoint"),
    opt("cisco", "Cisco"),
    opt("custom", "Custom"),
];

// ── TokenId ─────────────────────────────────────────────────────────

/// Session-unique token identifier. Never reused within a `TokenSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(u64);

impl TokenId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "filter_{}", self.0)
    }
}

// ── FilterToken ─────────────────────────────────────────────────────

/// One active facet.
///
/// `value` is not validated against `kind`'s vocabulary: tag values are
/// freeform and unknown status values are tolerated by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterToken {
    pub id: TokenId,
    pub kind: FilterKind,
    pub value: String,
}

impl FilterToken {
    /// Chip text, e.g. `status: breached`.
    pub fn chip_label(&self) -> String {
        format!("{}: {}", self.kind, self.value)
    }
}

/// Split typed `kind:value` text on the first colon, so composite tag
/// values like `tag:env:prod` keep their own colon.
pub fn parse_facet(text: &str) -> Result<(FilterKind, String), FacetError> {
    let (kind, value) = text
        .split_once(':')
        .ok_or_else(|| FacetError::MissingSeparator(text.trim().to_owned()))?;
    let kind = FilterKind::parse_name(kind)?;
    let value = value.trim();
    if value.is_empty() {
        return Err(FacetError::EmptyValue(kind));
    }
    Ok((kind, value.to_owned()))
}

// ── TokenSet ────────────────────────────────────────────────────────

/// Ordered set of active tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenSet {
    tokens: Vec<FilterToken>,
    next_id: u64,
}

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token with a fresh id and return a copy of it.
    pub fn add(&mut self, kind: FilterKind, value: impl Into<String>) -> FilterToken {
        self.next_id += 1;
        let token = FilterToken {
            id: TokenId(self.next_id),
            kind,
            value: value.into(),
        };
        self.tokens.push(token.clone());
        token
    }

    /// Remove by id. Returns `None` when no token has that id.
    pub fn remove(&mut self, id: TokenId) -> Option<FilterToken> {
        let pos = self.tokens.iter().position(|t| t.id == id)?;
        Some(self.tokens.remove(pos))
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    pub fn get(&self, id: TokenId) -> Option<&FilterToken> {
        self.tokens.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterToken> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[FilterToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens of one kind, in insertion order.
    pub fn by_kind(&self, kind: FilterKind) -> impl Iterator<Item = &FilterToken> {
        self.tokens.iter().filter(move |t| t.kind == kind)
    }
}

impl<'a> IntoIterator for &'a TokenSet {
    type Item = &'a FilterToken;
    type IntoIter = std::slice::Iter<'a, FilterToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
