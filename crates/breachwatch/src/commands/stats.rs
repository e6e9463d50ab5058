//! Statistics command handler.

use std::fmt::Write;

use breachwatch_core::{
    MetricsReport, ResultSource, SearchBackend, SearchConfig, SecurityMetrics, fallback_records,
    load_metrics,
};

use crate::cli::{GlobalOpts, StatsArgs};
use crate::error::CliError;
use crate::output;

use super::util;

fn source_label(source: ResultSource) -> &'static str {
    match source {
        ResultSource::Backend => "backend",
        ResultSource::Fallback => "sample data",
        ResultSource::None => "-",
    }
}

fn detail(report: &MetricsReport) -> String {
    let m = &report.metrics;
    let mut out = String::new();
    let _ = writeln!(out, "Source:               {}", source_label(report.source));
    let _ = writeln!(out, "Total records:        {}", m.total);
    let _ = writeln!(out, "Unique domains:       {}", m.unique_domains);
    let _ = writeln!(out, "Resolved:             {}", m.resolved);
    let _ = writeln!(out, "Unresolved:           {}", m.unresolved);
    let _ = writeln!(out, "Accessible:           {}", m.accessible);
    let _ = writeln!(out, "Inaccessible:         {}", m.inaccessible);
    let _ = writeln!(out, "Login forms:          {}", m.login_forms);
    let _ = writeln!(out, "Parked:               {}", m.parked);
    let _ = writeln!(out, "Previously breached:  {}", m.previously_breached);
    let _ = writeln!(out);
    let _ = writeln!(out, "Login form types:");
    for (kind, n) in m.login_form_distribution.entries() {
        let _ = writeln!(out, "  {:<12} {n}", kind.label());
    }
    out.trim_end().to_owned()
}

pub async fn handle(
    args: &StatsArgs,
    config: &SearchConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let report = if args.offline {
        MetricsReport {
            metrics: SecurityMetrics::from_records(&fallback_records()),
            source: ResultSource::Fallback,
            error: None,
        }
    } else {
        let client = config.build_client()?;
        if args.strict {
            let metrics = util::with_spinner(
                "Loading statistics…",
                global,
                SearchBackend::statistics(&client),
            )
            .await?;
            MetricsReport {
                metrics,
                source: ResultSource::Backend,
                error: None,
            }
        } else {
            let fallback = fallback_records();
            util::with_spinner(
                "Loading statistics…",
                global,
                load_metrics(&client, &fallback),
            )
            .await
        }
    };

    if let Some(ref reason) = report.error {
        output::print_warning(
            &format!("backend unavailable ({reason}); metrics derived from bundled sample data"),
            global.color(),
        );
    }

    let out = output::render_single(global.output(), &report, detail, |r| {
        r.metrics.total.to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
