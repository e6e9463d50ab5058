//! Clap derive structures for the `breachwatch` CLI.
//!
//! Defines the command tree, global flags, and shared value parsers.

use clap::{Args, Parser, Subcommand, ValueEnum};

use breachwatch_core::{FacetError, FilterKind};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// breachwatch -- search breach-monitoring data from the command line
#[derive(Debug, Parser)]
#[command(
    name = "breachwatch",
    version,
    about = "Search and summarize breach-monitoring data from the command line",
    long_about = "Query a breach-monitoring backend with free text and facet filters.\n\n\
        When the backend is unreachable, results are computed locally from a\n\
        bundled sample dataset and clearly marked as fallback data.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "BREACHWATCH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend base URL (overrides profile)
    #[arg(long, short = 'u', env = "BREACHWATCH_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format [default: table, or `defaults.output` from config]
    #[arg(long, short = 'o', env = "BREACHWATCH_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "BREACHWATCH_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "BREACHWATCH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    /// Resolved output format. `main` fills `output` from config first.
    pub fn output(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Table)
    }

    pub fn color(&self) -> ColorMode {
        self.color.unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search breach records by text and facets
    #[command(alias = "s", alias = "find")]
    Search(SearchArgs),

    /// Show security metrics
    #[command(alias = "st")]
    Stats(StatsArgs),

    /// List facet kinds and their known values
    #[command(alias = "f")]
    Facets(FacetsArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SEARCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-text query (words are joined with spaces)
    pub query: Vec<String>,

    /// Status facet (unresolved, accessible, login_form, parked, breached)
    #[arg(long)]
    pub status: Vec<String>,

    /// Web application facet (e.g. wordpress, citrix)
    #[arg(long, short = 'a')]
    pub application: Vec<String>,

    /// Login form type facet (basic, captcha, otp, other)
    #[arg(long, short = 'l')]
    pub login_type: Vec<String>,

    /// Tag facet: a bare label or key:value
    #[arg(long, short = 't')]
    pub tag: Vec<String>,

    /// Arbitrary facet as KIND:VALUE (e.g. domain:example.com)
    #[arg(long, short = 'f', value_parser = parse_facet)]
    pub filter: Vec<FacetArg>,

    /// Additional IP range to hide (CIDR or single IPv4 address)
    #[arg(long, short = 'x')]
    pub exclude: Vec<String>,

    /// Do not apply the configured default exclusion ranges
    #[arg(long)]
    pub no_default_exclusions: bool,

    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Results per page (overrides config)
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Skip the backend and filter the bundled sample data
    #[arg(long, conflicts_with = "strict")]
    pub offline: bool,

    /// Fail instead of falling back to sample data
    #[arg(long)]
    pub strict: bool,
}

/// One `--filter KIND:VALUE` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetArg {
    pub kind: FilterKind,
    pub value: String,
}

fn parse_facet(raw: &str) -> Result<FacetArg, FacetError> {
    let (kind, value) = breachwatch_core::parse_facet(raw)?;
    Ok(FacetArg { kind, value })
}

fn parse_kind(raw: &str) -> Result<FilterKind, FacetError> {
    FilterKind::parse_name(raw)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STATS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Derive metrics from the bundled sample data
    #[arg(long, conflicts_with = "strict")]
    pub offline: bool,

    /// Fail instead of falling back to sample data
    #[arg(long)]
    pub strict: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FACETS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FacetsArgs {
    /// Only show this kind
    #[arg(value_parser = parse_kind)]
    pub kind: Option<FilterKind>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or extend the config file with guided setup
    Init,

    /// Display the current configuration
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
