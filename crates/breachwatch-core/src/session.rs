// ── Search session ──
//
// Owns query text, tokens, exclusions and paging, and is the only thing
// allowed to mutate them. Every mutation publishes a snapshot and arms the
// debouncer; when it fires, one request goes out. Responses are applied
// only if they belong to the most recently fired request. A failed request
// falls back to the local evaluator over the bundled dataset.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::Serialize;
use strum::Display;
use tokio::sync::watch;
use tracing::{debug, warn};

use breachwatch_api::SearchParams;

use crate::backend::SearchBackend;
use crate::config::SearchConfig;
use crate::debounce::Debouncer;
use crate::error::{CoreError, RangeError};
use crate::mock;
use crate::model::{
    ExclusionRange, ExclusionRangeSet, FilterKind, FilterToken, ResultRecord, TokenId, TokenSet,
};
use crate::query::SearchCriteria;

// ── Public state ────────────────────────────────────────────────────

/// Lifecycle of the displayed results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SearchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    ErrorWithFallback,
}

/// Where the displayed results came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResultSource {
    #[default]
    None,
    Backend,
    Fallback,
}

/// Immutable view of the session, published on every change.
#[derive(Debug, Clone, Default)]
pub struct SearchSnapshot {
    pub query: String,
    pub tokens: Vec<FilterToken>,
    pub exclusions: Vec<String>,
    pub page: u32,
    pub per_page: u32,
    pub status: SearchStatus,
    pub results: Arc<Vec<ResultRecord>>,
    pub total: Option<u64>,
    pub pages: Option<u64>,
    pub source: ResultSource,
    /// Why the last fetch failed, while fallback results are shown.
    pub error: Option<String>,
    /// Sequence number of the request whose results are displayed.
    pub request_seq: u64,
}

impl SearchSnapshot {
    /// True while the visible rows are local fallback data, including a
    /// loading period that follows a failure.
    pub fn using_fallback(&self) -> bool {
        self.source == ResultSource::Fallback
    }

    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Loading
    }
}

// ── Internal state ──────────────────────────────────────────────────

#[derive(Debug)]
struct State {
    query: String,
    tokens: TokenSet,
    exclusions: ExclusionRangeSet,
    page: u32,
    /// Bumped on every trigger; a debounced fire carrying an older value
    /// was superseded and does nothing.
    trigger_gen: u64,
    /// Bumped on every request actually sent.
    fired_seq: u64,
    in_flight: Option<(u64, SearchParams)>,
    status: SearchStatus,
    results: Arc<Vec<ResultRecord>>,
    total: Option<u64>,
    pages: Option<u64>,
    source: ResultSource,
    error: Option<String>,
    applied_seq: u64,
}

impl State {
    fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            query: self.query.clone(),
            tokens: self.tokens.as_slice().to_vec(),
            exclusions: self.exclusions.clone(),
            page: self.page,
        }
    }

    fn snapshot(&self, per_page: u32) -> SearchSnapshot {
        SearchSnapshot {
            query: self.query.clone(),
            tokens: self.tokens.as_slice().to_vec(),
            exclusions: self.exclusions.as_strings(),
            page: self.page,
            per_page,
            status: self.status,
            results: Arc::clone(&self.results),
            total: self.total,
            pages: self.pages,
            source: self.source,
            error: self.error.clone(),
            request_seq: self.applied_seq,
        }
    }
}

struct Inner<B> {
    backend: B,
    per_page: u32,
    fallback: Arc<Vec<ResultRecord>>,
    debouncer: Debouncer,
    state: Mutex<State>,
    snapshot: watch::Sender<SearchSnapshot>,
}

impl<B: SearchBackend> Inner<B> {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &State) {
        self.snapshot.send_replace(state.snapshot(self.per_page));
    }

    /// Run one fetch attempt for the trigger numbered `generation`.
    async fn fire(&self, generation: u64, criteria: SearchCriteria) {
        let params = criteria.to_params(self.per_page);

        let seq = {
            let mut state = self.lock();
            if state.trigger_gen != generation {
                debug!(generation, "search superseded before firing");
                return;
            }
            if let Some((seq, in_flight)) = &state.in_flight {
                if *in_flight == params {
                    debug!(seq, "identical search already in flight");
                    return;
                }
            }
            state.fired_seq += 1;
            let seq = state.fired_seq;
            state.in_flight = Some((seq, params.clone()));
            state.status = SearchStatus::Loading;
            self.publish(&state);
            seq
        };

        debug!(seq, q = %params.q, page = params.page, "search fired");
        let outcome = self.backend.search(&params).await;

        let mut state = self.lock();
        if state.in_flight.as_ref().is_some_and(|(s, _)| *s == seq) {
            state.in_flight = None;
        }
        if seq != state.fired_seq {
            debug!(seq, latest = state.fired_seq, "discarding stale search response");
            return;
        }

        match outcome {
            Ok(page) => {
                let count = page.records.len();
                state.results = Arc::new(page.records);
                state.total = page.total.or_else(|| u64::try_from(count).ok());
                state.pages = page.pages;
                state.status = SearchStatus::Success;
                state.source = ResultSource::Backend;
                state.error = None;
                debug!(seq, count, "search results applied");
            }
            Err(e) => {
                warn!(seq, error = %e, "search failed; using fallback data");
                let local = criteria.apply_locally(&self.fallback);
                state.total = u64::try_from(local.len()).ok();
                state.pages = Some(1);
                state.results = Arc::new(local);
                state.status = SearchStatus::ErrorWithFallback;
                state.source = ResultSource::Fallback;
                state.error = Some(e.to_string());
            }
        }
        state.applied_seq = seq;
        self.publish(&state);
    }
}

// ── SearchSession ───────────────────────────────────────────────────

/// Debounced, fallback-aware search over one backend.
///
/// Cheaply cloneable; clones share state. Mutating methods arm a tokio
/// timer, so they must be called from within a runtime.
pub struct SearchSession<B: SearchBackend> {
    inner: Arc<Inner<B>>,
}

impl<B: SearchBackend> Clone for SearchSession<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: SearchBackend> SearchSession<B> {
    /// New idle session using the bundled fallback dataset.
    pub fn new(backend: B, config: &SearchConfig) -> Result<Self, CoreError> {
        Self::with_fallback(backend, config, mock::fallback_records())
    }

    /// New idle session with an explicit fallback dataset.
    pub fn with_fallback(
        backend: B,
        config: &SearchConfig,
        fallback: Vec<ResultRecord>,
    ) -> Result<Self, CoreError> {
        let exclusions = ExclusionRangeSet::parse_all(&config.excluded_ranges)?;
        let per_page = config.per_page.max(1);
        let state = State {
            query: String::new(),
            tokens: TokenSet::new(),
            exclusions,
            page: 1,
            trigger_gen: 0,
            fired_seq: 0,
            in_flight: None,
            status: SearchStatus::Idle,
            results: Arc::new(Vec::new()),
            total: None,
            pages: None,
            source: ResultSource::None,
            error: None,
            applied_seq: 0,
        };
        let (snapshot, _) = watch::channel(state.snapshot(per_page));

        Ok(Self {
            inner: Arc::new(Inner {
                backend,
                per_page,
                fallback: Arc::new(fallback),
                debouncer: Debouncer::new(config.debounce),
                state: Mutex::new(state),
                snapshot,
            }),
        })
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// The dataset the fallback path filters.
    pub fn fallback_records(&self) -> &[ResultRecord] {
        &self.inner.fallback
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> SearchSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Receiver that wakes on every published change.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.inner.snapshot.subscribe()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Replace the free-text query. Unchanged text is not a mutation.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        let mut state = self.inner.lock();
        if state.query == query {
            return;
        }
        state.query = query;
        state.page = 1;
        self.trigger(&mut state);
    }

    /// Add a facet and return it (with its fresh id).
    pub fn add_token(&self, kind: FilterKind, value: impl Into<String>) -> FilterToken {
        let mut state = self.inner.lock();
        let token = state.tokens.add(kind, value);
        state.page = 1;
        self.trigger(&mut state);
        token
    }

    /// Remove a facet. Unknown ids are ignored and trigger nothing.
    pub fn remove_token(&self, id: TokenId) -> Option<FilterToken> {
        let mut state = self.inner.lock();
        let removed = state.tokens.remove(id)?;
        state.page = 1;
        self.trigger(&mut state);
        Some(removed)
    }

    /// Drop every facet.
    pub fn clear_tokens(&self) {
        let mut state = self.inner.lock();
        if state.tokens.is_empty() {
            return;
        }
        state.tokens.clear();
        state.page = 1;
        self.trigger(&mut state);
    }

    /// Validate and add an exclusion range. Rejected input changes
    /// nothing and triggers nothing.
    pub fn add_exclusion(&self, range: &str) -> Result<ExclusionRange, RangeError> {
        let mut state = self.inner.lock();
        let added = match state.exclusions.add(range) {
            Ok(added) => added.clone(),
            Err(e) => {
                debug!(input = range, error = %e, "exclusion range rejected");
                return Err(e);
            }
        };
        state.page = 1;
        self.trigger(&mut state);
        Ok(added)
    }

    pub fn remove_exclusion(&self, range: &str) -> Option<ExclusionRange> {
        let mut state = self.inner.lock();
        let removed = state.exclusions.remove(range)?;
        state.page = 1;
        self.trigger(&mut state);
        Some(removed)
    }

    /// Replace every exclusion at once; all-or-nothing.
    pub fn set_exclusions<I, S>(&self, ranges: I) -> Result<(), RangeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exclusions = ExclusionRangeSet::parse_all(ranges).inspect_err(|e| {
            debug!(error = %e, "exclusion set rejected");
        })?;
        let mut state = self.inner.lock();
        if state.exclusions == exclusions {
            return Ok(());
        }
        state.exclusions = exclusions;
        state.page = 1;
        self.trigger(&mut state);
        Ok(())
    }

    /// Jump to a 1-based page (0 is treated as 1).
    pub fn set_page(&self, page: u32) {
        let page = page.max(1);
        let mut state = self.inner.lock();
        if state.page == page {
            return;
        }
        state.page = page;
        self.trigger(&mut state);
    }

    /// Re-run the current search after the debounce window.
    pub fn refresh(&self) {
        let mut state = self.inner.lock();
        self.trigger(&mut state);
    }

    /// Disarm any waiting debounce timer.
    pub fn cancel_pending(&self) {
        self.inner.debouncer.cancel();
    }

    /// Fire the current search immediately and wait for it to settle.
    pub async fn search_now(&self) -> SearchSnapshot {
        self.inner.debouncer.cancel();
        let (generation, criteria) = {
            let mut state = self.inner.lock();
            state.trigger_gen += 1;
            (state.trigger_gen, state.criteria())
        };
        self.inner.fire(generation, criteria).await;
        self.snapshot()
    }

    // ── Internals ────────────────────────────────────────────────────

    fn trigger(&self, state: &mut State) {
        state.trigger_gen += 1;
        let generation = state.trigger_gen;
        let criteria = state.criteria();
        self.inner.publish(state);

        let weak: Weak<Inner<B>> = Arc::downgrade(&self.inner);
        self.inner.debouncer.schedule(async move {
            if let Some(inner) = weak.upgrade() {
                inner.fire(generation, criteria).await;
            }
        });
    }
}
