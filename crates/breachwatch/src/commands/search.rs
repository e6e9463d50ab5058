//! Search command handler.
//!
//! Three modes share one rendering path:
//! - default: run through a `SearchSession`, which falls back to the
//!   bundled dataset when the backend fails
//! - `--strict`: call the backend directly and surface its error
//! - `--offline`: evaluate the bundled dataset locally

use tabled::Tabled;

use breachwatch_core::{
    BreachClient, ExclusionRangeSet, FilterKind, ResultRecord, ResultSource, SearchBackend,
    SearchConfig, SearchCriteria, SearchSession, StatusIndicator, TokenSet, display,
    fallback_records,
};

use crate::cli::{GlobalOpts, OutputFormat, SearchArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<&ResultRecord> for ResultRow {
    fn from(r: &ResultRecord) -> Self {
        let status = StatusIndicator::for_record(r)
            .into_iter()
            .filter(|s| !matches!(s, StatusIndicator::Title(_)))
            .map(|s| s.label())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: r.id,
            target: display::locator(r),
            ip: r.ip_address.clone().unwrap_or_default(),
            title: r.title.clone().unwrap_or_default(),
            status,
            tags: r.tags.chips().join(", "),
        }
    }
}

// ── Outcome ─────────────────────────────────────────────────────────

/// What a search produced, independent of how it ran.
#[derive(Debug)]
struct Outcome {
    records: Vec<ResultRecord>,
    total: Option<u64>,
    pages: Option<u64>,
    source: ResultSource,
    error: Option<String>,
}

// ── Criteria ────────────────────────────────────────────────────────

fn push_tokens(tokens: &mut TokenSet, kind: FilterKind, values: &[String]) {
    for value in values {
        let value = value.trim();
        if !value.is_empty() {
            tokens.add(kind, value);
        }
    }
}

/// Translate flags into the criteria the engine understands.
fn build_criteria(args: &SearchArgs, config: &SearchConfig) -> Result<SearchCriteria, CliError> {
    let mut tokens = TokenSet::new();
    push_tokens(&mut tokens, FilterKind::Status, &args.status);
    push_tokens(&mut tokens, FilterKind::Application, &args.application);
    push_tokens(&mut tokens, FilterKind::LoginType, &args.login_type);
    push_tokens(&mut tokens, FilterKind::Tag, &args.tag);
    for facet in &args.filter {
        tokens.add(facet.kind, facet.value.clone());
    }

    let mut exclusions = if args.no_default_exclusions {
        ExclusionRangeSet::new()
    } else {
        ExclusionRangeSet::parse_all(&config.excluded_ranges)?
    };
    for raw in &args.exclude {
        exclusions.add(raw)?;
    }

    Ok(SearchCriteria {
        query: args.query.join(" ").trim().to_owned(),
        tokens: tokens.iter().cloned().collect(),
        exclusions,
        page: args.page.max(1),
    })
}

// ── Modes ───────────────────────────────────────────────────────────

fn run_offline(criteria: &SearchCriteria) -> Outcome {
    let records = criteria.apply_locally(&fallback_records());
    Outcome {
        total: Some(util::count(records.len())),
        pages: Some(1),
        records,
        source: ResultSource::Fallback,
        error: None,
    }
}

async fn run_strict(
    client: BreachClient,
    criteria: &SearchCriteria,
    per_page: u32,
    global: &GlobalOpts,
) -> Result<Outcome, CliError> {
    let params = criteria.to_params(per_page);
    let page =
        util::with_spinner("Searching…", global, SearchBackend::search(&client, &params)).await?;
    Ok(Outcome {
        records: page.records,
        total: page.total,
        pages: page.pages,
        source: ResultSource::Backend,
        error: None,
    })
}

async fn run_session(
    client: BreachClient,
    config: &SearchConfig,
    criteria: &SearchCriteria,
    global: &GlobalOpts,
) -> Result<Outcome, CliError> {
    let session = SearchSession::new(client, config)?;
    session.set_exclusions(criteria.exclusions.as_strings())?;
    session.set_query(criteria.query.clone());
    for token in &criteria.tokens {
        session.add_token(token.kind, token.value.clone());
    }
    session.set_page(criteria.page);

    let snap = util::with_spinner("Searching…", global, session.search_now()).await;
    Ok(Outcome {
        records: snap.results.as_ref().clone(),
        total: snap.total,
        pages: snap.pages,
        source: snap.source,
        error: snap.error,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: SearchArgs,
    mut config: SearchConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(per_page) = args.per_page {
        if per_page == 0 {
            return Err(CliError::Validation {
                field: "per-page".into(),
                reason: "must be at least 1".into(),
            });
        }
        config.per_page = per_page;
    }

    let criteria = build_criteria(&args, &config)?;
    tracing::debug!(
        query = %criteria.query,
        tokens = criteria.tokens.len(),
        exclusions = criteria.exclusions.len(),
        page = criteria.page,
        "search criteria"
    );

    let outcome = if args.offline {
        run_offline(&criteria)
    } else {
        let client = config.build_client()?;
        if args.strict {
            run_strict(client, &criteria, config.per_page, global).await?
        } else {
            run_session(client, &config, &criteria, global).await?
        }
    };

    report(&outcome, &criteria, args.offline, global);
    Ok(())
}

fn report(outcome: &Outcome, criteria: &SearchCriteria, offline: bool, global: &GlobalOpts) {
    if outcome.source == ResultSource::Fallback {
        if offline {
            output::print_note("Offline: showing bundled sample data.", global.quiet);
        } else {
            let reason = outcome.error.as_deref().unwrap_or("unknown error");
            output::print_warning(
                &format!("backend unavailable ({reason}); showing bundled sample data"),
                global.color(),
            );
        }
    }

    let format = global.output();
    let out = output::render_list(
        format,
        &outcome.records,
        |r| ResultRow::from(r),
        |r| r.id.to_string(),
    );
    output::print_output(&out, global.quiet);

    if format == OutputFormat::Table {
        output::print_note(&footer(outcome, criteria), global.quiet);
    }
}

fn footer(outcome: &Outcome, criteria: &SearchCriteria) -> String {
    let shown = outcome.records.len();
    let noun = if shown == 1 { "result" } else { "results" };
    let mut line = format!("{shown} {noun}");
    if let Some(total) = outcome.total {
        line.push_str(&format!(" of {total}"));
    }
    if let Some(pages) = outcome.pages {
        line.push_str(&format!(" · page {}/{pages}", criteria.page));
    }
    if !criteria.exclusions.is_empty() {
        line.push_str(&format!(
            " · excluding {}",
            criteria.exclusions.as_strings().join(", ")
        ));
    }
    line
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Command};

    fn args(argv: &[&str]) -> SearchArgs {
        let mut full = vec!["breachwatch", "search"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Search(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    fn config() -> SearchConfig {
        SearchConfig::new("http://localhost:5000".parse().unwrap())
    }

    #[test]
    fn criteria_collects_tokens_in_flag_order() {
        let criteria = build_criteria(
            &args(&["--status", "breached", "-t", "env:prod", "-f", "domain:example.com"]),
            &config(),
        )
        .unwrap();
        let kinds: Vec<FilterKind> = criteria.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![FilterKind::Status, FilterKind::Tag, FilterKind::Domain]
        );
    }

    #[test]
    fn default_exclusions_can_be_dropped() {
        let with = build_criteria(&args(&[]), &config()).unwrap();
        assert_eq!(with.exclusions.len(), 4);

        let without = build_criteria(
            &args(&["--no-default-exclusions", "-x", "203.0.113.0/24"]),
            &config(),
        )
        .unwrap();
        assert_eq!(without.exclusions.as_strings(), vec!["203.0.113.0/24"]);
    }

    #[test]
    fn duplicate_exclusion_is_rejected() {
        let narrower = build_criteria(&args(&["-x", "10.1.0.0/16"]), &config());
        assert!(narrower.is_ok());

        let err = build_criteria(&args(&["-x", "10.0.0.0/8"]), &config()).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }

    #[test]
    fn offline_mode_filters_sample_data() {
        let criteria = build_criteria(
            &args(&["--no-default-exclusions", "--login-type", "captcha"]),
            &config(),
        )
        .unwrap();
        let outcome = run_offline(&criteria);
        let domains: Vec<&str> = outcome.records.iter().map(|r| r.domain.as_str()).collect();
        assert_eq!(domains, vec!["test.example.org"]);
        assert_eq!(outcome.source, ResultSource::Fallback);
        assert_eq!(outcome.total, Some(1));
    }

    #[test]
    fn footer_summarizes_paging() {
        let criteria = build_criteria(&args(&["--no-default-exclusions"]), &config()).unwrap();
        let outcome = Outcome {
            records: fallback_records(),
            total: Some(120),
            pages: Some(3),
            source: ResultSource::Backend,
            error: None,
        };
        assert_eq!(footer(&outcome, &criteria), "6 results of 120 · page 1/3");
    }
}
