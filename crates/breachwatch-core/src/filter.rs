// ── Local predicate evaluator ──
//
// Decides whether a record survives (query, tokens, exclusions) without
// asking the backend. Only the fallback path uses it. Pure and
// deterministic: same inputs, same answer.

use strum::{Display, EnumString};

use crate::model::{ExclusionRangeSet, FilterKind, FilterToken, ResultRecord};

// ── Status facet ────────────────────────────────────────────────────

/// Recognized `status` token values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum StatusFacet {
    Unresolved,
    Accessible,
    LoginForm,
    Parked,
    Breached,
}

impl StatusFacet {
    pub fn matches(self, record: &ResultRecord) -> bool {
        match self {
            Self::Unresolved => !record.is_resolved,
            Self::Accessible => record.is_accessible,
            Self::LoginForm => record.has_login_form,
            Self::Parked => record.is_parked,
            Self::Breached => record.is_breached,
        }
    }
}

// ── Per-kind dispatch ───────────────────────────────────────────────

/// Predicate for one token kind: `(record, token value) -> keep?`.
pub type TokenPredicate = fn(&ResultRecord, &str) -> bool;

fn status_matches(record: &ResultRecord, value: &str) -> bool {
    // Unknown status values are permissive.
    value
        .parse::<StatusFacet>()
        .map_or(true, |facet| facet.matches(record))
}

fn application_matches(record: &ResultRecord, value: &str) -> bool {
    record
        .web_application
        .as_deref()
        .is_some_and(|app| app.eq_ignore_ascii_case(value))
}

fn login_type_matches(record: &ResultRecord, value: &str) -> bool {
    record.login_form_type.as_deref() == Some(value)
}

fn tag_matches(record: &ResultRecord, value: &str) -> bool {
    record.tags.matches_token(value)
}

/// Kinds the local evaluator understands. `domain`, `ip`, `port` and
/// `path` are absent: locally they only narrow through the free-text
/// query, so tokens of those kinds pass every record.
const PREDICATES: &[(FilterKind, TokenPredicate)] = &[
    (FilterKind::Status, status_matches),
    (FilterKind::Application, application_matches),
    (FilterKind::LoginType, login_type_matches),
    (FilterKind::Tag, tag_matches),
];

pub fn predicate_for(kind: FilterKind) -> Option<TokenPredicate> {
    PREDICATES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, pred)| *pred)
}

// ── Stages ──────────────────────────────────────────────────────────

/// Stage 1: case-insensitive substring over every searchable field.
/// Only the empty query matches everything; whitespace is matched as typed.
pub fn matches_query(record: &ResultRecord, query: &str) -> bool {
    query.is_empty() || record.searchable_text().contains(&query.to_lowercase())
}

/// Stage 2: whether the record's address lies in an excluded range.
pub fn is_excluded(record: &ResultRecord, exclusions: &ExclusionRangeSet) -> bool {
    exclusions.excludes(record.ip_address.as_deref())
}

/// Stage 3, one term: a single token against a record.
pub fn token_matches(record: &ResultRecord, token: &FilterToken) -> bool {
    predicate_for(token.kind).is_none_or(|pred| pred(record, &token.value))
}

/// Full evaluation: query AND NOT excluded AND every token.
pub fn matches(
    record: &ResultRecord,
    query: &str,
    tokens: &[FilterToken],
    exclusions: &ExclusionRangeSet,
) -> bool {
    matches_query(record, query)
        && !is_excluded(record, exclusions)
        && tokens.iter().all(|t| token_matches(record, t))
}

/// Filter a record set, preserving order.
pub fn filter_records(
    records: &[ResultRecord],
    query: &str,
    tokens: &[FilterToken],
    exclusions: &ExclusionRangeSet,
) -> Vec<ResultRecord> {
    records
        .iter()
        .filter(|r| matches(r, query, tokens, exclusions))
        .cloned()
        .collect()
}
