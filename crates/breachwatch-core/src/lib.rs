//! Faceted search engine between `breachwatch-api` and the CLI / TUI.
//!
//! - **[`SearchSession`]** owns the query, facet tokens, IP exclusions and
//!   paging. Mutations are debounced into backend requests; responses are
//!   applied only if they belong to the most recently fired request.
//!   Consumers observe it through [`SearchSession::subscribe`].
//! - **[`filter`]** is the local predicate evaluator. When a request fails,
//!   the session runs it over the bundled [`mock`] dataset and marks the
//!   results as fallback data.
//! - **[`model`]** holds the canonical types: [`FilterToken`],
//!   [`ExclusionRangeSet`], [`ResultRecord`] with its normalized [`TagSet`],
//!   and [`SecurityMetrics`].
//! - **[`load_metrics`]** fetches dashboard statistics with the same
//!   fallback policy.

pub mod backend;
pub mod config;
pub mod convert;
pub mod debounce;
pub mod display;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod mock;
pub mod model;
pub mod query;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────

pub use backend::{SearchBackend, SearchPage};
pub use config::{SearchConfig, TlsVerification};
pub use debounce::Debouncer;
pub use display::{StatusIndicator, Tone};
pub use error::{CoreError, FacetError, RangeError};
pub use metrics::{MetricsReport, load_metrics};
pub use mock::fallback_records;
pub use query::SearchCriteria;
pub use session::{ResultSource, SearchSession, SearchSnapshot, SearchStatus};

pub use model::{
    DEFAULT_EXCLUDED_RANGES, ExclusionRange, ExclusionRangeSet, FacetOption, FilterKind,
    FilterToken, LoginFormDistribution, LoginFormType, ResultRecord, SecurityMetrics, Tag, TagSet,
    TokenId, TokenSet, parse_facet,
};

pub use breachwatch_api::{BreachClient, SearchParams};
