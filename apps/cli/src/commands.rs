//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use jobcrawl_artifacts::{ExportOptions, FileWriter, RunSummary};
use jobcrawl_core::{
    Categorizer, Decision, KeywordReporter, Orchestrator, ProgressReporter, QueryOutcome,
    RelevanceFilter, RunReport, Termination,
};
use jobcrawl_crawler::{HttpFetcher, IndeedExtractor};
use jobcrawl_shared::{
    AppConfig, CrawlConfig, JobCrawlError, init_config, load_config, load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// JobCrawl — a curated, categorized job feed from broad searches.
#[derive(Parser)]
#[command(
    name = "jobcrawl",
    version,
    about = "Crawl job-search results, keep the relevant postings, and export them.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.jobcrawl/jobcrawl.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the configured search queries and export kept postings.
    Crawl(CrawlArgs),

    /// Evaluate a single posting offline against the relevance rules.
    Check {
        /// Posting title.
        #[arg(long)]
        title: String,

        /// Company name.
        #[arg(long, default_value = "")]
        company: String,

        /// Posting description or snippet.
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `jobcrawl crawl`; each one overrides its config value.
#[derive(Args, Debug, Default)]
pub(crate) struct CrawlArgs {
    /// Search query (repeatable). Replaces the configured queries.
    #[arg(short, long = "query")]
    pub queries: Vec<String>,

    /// Location filter passed to the search.
    #[arg(short, long)]
    pub location: Option<String>,

    /// Jobs to keep per query.
    #[arg(short = 'n', long)]
    pub results_per_query: Option<usize>,

    /// Do not require a topic term.
    #[arg(long)]
    pub no_require_topic: bool,

    /// Do not require a category term.
    #[arg(long)]
    pub no_require_category: bool,

    /// Keep card snippets instead of opening each job's detail page.
    #[arg(long)]
    pub no_details: bool,

    /// Output directory for exported files.
    #[arg(short, long)]
    pub out: Option<String>,

    /// Queries crawled at the same time.
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Whole-run time limit in seconds (0 disables it).
    #[arg(long)]
    pub run_timeout: Option<u64>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "jobcrawl=info",
        1 => "jobcrawl=debug",
        _ => "jobcrawl=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Crawl(args) => cmd_crawl(config_path, &args).await,
        Command::Check {
            title,
            company,
            description,
        } => cmd_check(config_path, &title, &company, &description),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Fold `crawl` flags into the loaded config and re-validate.
fn apply_overrides(config: &mut AppConfig, args: &CrawlArgs) -> Result<()> {
    if !args.queries.is_empty() {
        config.search.queries = args.queries.clone();
    }
    if let Some(location) = &args.location {
        config.search.location = location.clone();
    }
    if let Some(n) = args.results_per_query {
        config.search.results_per_query = n;
    }
    if args.no_require_topic {
        config.relevance.require_topic_term = false;
    }
    if args.no_require_category {
        config.relevance.require_category_term = false;
    }
    if args.no_details {
        config.browser.fetch_full_description = false;
    }
    if let Some(out) = &args.out {
        config.output.dir = out.clone();
    }
    if let Some(n) = args.concurrency {
        config.crawl.query_concurrency = n;
    }
    if let Some(secs) = args.run_timeout {
        config.crawl.run_timeout_secs = secs;
    }

    if config.search.queries.is_empty() {
        return Err(JobCrawlError::validation(
            "no search queries configured; pass --query or edit the config file",
        )
        .into());
    }
    config.validate()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_crawl(config_path: Option<&Path>, args: &CrawlArgs) -> Result<()> {
    let mut config = resolve_config(config_path)?;
    apply_overrides(&mut config, args)?;

    info!(
        queries = config.search.queries.len(),
        location = %config.search.location,
        results_per_query = config.search.results_per_query,
        "starting crawl"
    );

    let fetcher = Arc::new(HttpFetcher::new(&config.browser.user_agent)?);
    let progress = Arc::new(CliProgress::new()?);
    let orchestrator = Orchestrator::new(
        CrawlConfig::from(&config),
        fetcher,
        Arc::new(IndeedExtractor::new()),
    )?
    .with_progress(progress.clone());

    let writer = FileWriter::new(ExportOptions::from(&config.output));
    let result = orchestrator.run(&writer, shutdown_signal()).await;
    progress.finish();

    print_report(&result?);
    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed the run simply
/// has no interrupt.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn print_report(report: &RunReport) {
    let headline = match report.termination {
        Termination::Completed => "Crawl complete.",
        Termination::Interrupted => "Crawl interrupted; partial results saved.",
        Termination::TimedOut => "Run time limit reached; partial results saved.",
    };

    println!();
    println!("  {headline}");
    println!("  Run:      {}", report.run_id);
    println!("  Kept:     {}", report.accepted.len());
    println!("  Rejected: {}", report.rejected.len());
    println!("  Time:     {:.1}s", report.elapsed.as_secs_f64());
    for path in &report.exported {
        println!("  Saved:    {}", path.display());
    }
    println!();

    if !report.accepted.is_empty() {
        println!("{}", RunSummary::from_jobs(&report.accepted));
        println!();
    }
}

fn cmd_check(
    config_path: Option<&Path>,
    title: &str,
    company: &str,
    description: &str,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let filter = RelevanceFilter::new(&config.relevance);

    println!();
    match filter.evaluate(company, title, description) {
        Decision::Accept => {
            let rules = &config.categories.rules;
            let categorizer = Categorizer::new(rules, &config.categories.priority);
            let keywords = KeywordReporter::new(rules);
            println!("  Decision: keep");
            println!("  Category: {}", categorizer.classify(title, description));
            println!("  Keywords: {}", keywords.summarize(title, description));
        }
        Decision::Reject(reason) => {
            println!("  Decision: reject");
            println!("  Reason:   {reason}");
        }
    }
    println!();
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { spinner })
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn query_started(&self, index: usize, query: &str, total: usize) {
        self.spinner
            .set_message(format!("[{}/{total}] {query}", index + 1));
    }

    fn page_loaded(&self, query: &str, page: usize, cards: usize) {
        self.spinner
            .set_message(format!("{query}: page {page} ({cards} cards)"));
    }

    fn job_kept(&self, query: &str, kept: usize, target: usize) {
        self.spinner
            .set_message(format!("{query}: kept {kept}/{target}"));
    }

    fn query_finished(&self, outcome: &QueryOutcome) {
        self.spinner.println(format!(
            "  {}: {} kept, {} rejected, {} duplicates ({})",
            outcome.query, outcome.accepted, outcome.rejected, outcome.duplicates, outcome.stop
        ));
    }
}
