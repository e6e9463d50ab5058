// ── Search criteria and wire encoding ──
//
// A `SearchCriteria` is the frozen input of one fetch attempt. It is
// captured when a mutation triggers a search, so the request and (on
// failure) the local fallback both see exactly what the user had at that
// moment.

use strum::IntoEnumIterator;

use breachwatch_api::SearchParams;

use crate::filter;
use crate::model::{ExclusionRangeSet, FilterKind, FilterToken, ResultRecord};

/// Everything that identifies one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub query: String,
    pub tokens: Vec<FilterToken>,
    pub exclusions: ExclusionRangeSet,
    /// 1-based page number.
    pub page: u32,
}

impl SearchCriteria {
    /// Encode for `GET /api/search`.
    pub fn to_params(&self, per_page: u32) -> SearchParams {
        SearchParams {
            q: self.query.clone(),
            page: self.page.max(1),
            per_page,
            filters: encode_tokens(&self.tokens),
            excluded_ip_ranges: self.exclusions.as_strings(),
        }
    }

    /// Run the local evaluator over `records` with these criteria.
    pub fn apply_locally(&self, records: &[ResultRecord]) -> Vec<ResultRecord> {
        filter::filter_records(records, &self.query, &self.tokens, &self.exclusions)
    }
}

/// Query-string key and value for one token.
///
/// Composite tag values (`key:value`) travel as `tag_<key>=<value>`; every
/// other token uses its kind name as the key.
pub fn token_param(token: &FilterToken) -> (String, String) {
    if token.kind == FilterKind::Tag {
        if let Some((key, value)) = token.value.split_once(':') {
            if !key.is_empty() {
                return (format!("tag_{key}"), value.to_owned());
            }
        }
    }
    (token.kind.to_string(), token.value.clone())
}

/// Tokens grouped by kind in `FilterKind` declaration order, insertion
/// order within a kind. Duplicate keys are kept as repeated pairs.
pub fn encode_tokens(tokens: &[FilterToken]) -> Vec<(String, String)> {
    FilterKind::iter()
        .flat_map(|kind| tokens.iter().filter(move |t| t.kind == kind))
        .map(token_param)
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::TokenSet;

    fn pairs(params: &SearchParams) -> Vec<(String, String)> {
        params.to_query_pairs()
    }

    fn p(k: &str, v: &str) -> (String, String) {
        (k.to_owned(), v.to_owned())
    }

    #[test]
    fn groups_by_kind_and_keeps_duplicates() {
        let mut tokens = TokenSet::new();
        tokens.add(FilterKind::Tag, "type:ecommerce");
        tokens.add(FilterKind::Status, "breached");
        tokens.add(FilterKind::Domain, "example.com");
        tokens.add(FilterKind::Status, "accessible");
        tokens.add(FilterKind::Tag, "critical");

        let criteria = SearchCriteria {
            query: "login".into(),
            tokens: tokens.as_slice().to_vec(),
            exclusions: ExclusionRangeSet::parse_all(["10.0.0.0/8"]).unwrap_or_default(),
            page: 0,
        };

        assert_eq!(
            pairs(&criteria.to_params(50)),
            vec![
                p("q", "login"),
                p("page", "1"),
                p("per_page", "50"),
                p("domain", "example.com"),
                p("status", "breached"),
                p("status", "accessible"),
                p("tag_type", "ecommerce"),
                p("tag", "critical"),
                p("exclude_ip", "10.0.0.0/8"),
            ]
        );
    }

    #[test]
    fn tag_with_empty_key_is_sent_whole() {
        let mut tokens = TokenSet::new();
        let token = tokens.add(FilterKind::Tag, ":orphan");
        assert_eq!(token_param(&token), p("tag", ":orphan"));
    }

    #[test]
    fn identical_inputs_encode_identically() {
        let mut first = TokenSet::new();
        first.add(FilterKind::LoginType, "otp");
        let mut second = TokenSet::new();
        second.add(FilterKind::Status, "parked");
        second.clear();
        second.add(FilterKind::LoginType, "otp");

        let a = SearchCriteria {
            tokens: first.as_slice().to_vec(),
            page: 1,
            ..SearchCriteria::default()
        };
        let b = SearchCriteria {
            tokens: second.as_slice().to_vec(),
            page: 1,
            ..SearchCriteria::default()
        };

        // Token ids differ, the request does not.
        assert_ne!(a, b);
        assert_eq!(a.to_params(25), b.to_params(25));
    }
}
