// ── Domain model ──
//
// Canonical in-memory types for the search engine. Wire shapes from
// breachwatch-api are converted into these once, at ingestion.

pub mod exclusion;
pub mod metrics;
pub mod record;
pub mod token;

// ── Re-exports ──────────────────────────────────────────────────────

pub use exclusion::{DEFAULT_EXCLUDED_RANGES, ExclusionRange, ExclusionRangeSet};
pub use metrics::{LoginFormDistribution, SecurityMetrics};
pub use record::{LoginFormType, ResultRecord, Tag, TagSet};
pub use token::{
    APPLICATION_OPTIONS, FacetOption, FilterKind, FilterToken, LOGIN_TYPE_OPTIONS, STATUS_OPTIONS,
    TokenId, TokenSet, parse_facet,
};
