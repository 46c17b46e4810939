//! Application configuration for JobCrawl.
//!
//! User config lives at `~/.jobcrawl/jobcrawl.toml`.
//! CLI flags override config file values, which override defaults.
//! [`AppConfig::default`] is the complete fallback configuration: search
//! phrases, relevance terms, the company blacklist and the category rules.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{JobCrawlError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "jobcrawl.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".jobcrawl";

/// Companies whose postings are always rejected (case-insensitive substring).
pub const DEFAULT_BLACKLIST: &[&str] = &[
    "amazon", "walmart", "fedex", "ups", "target", "costco",
    "home depot", "kroger", "walgreens", "cvs", "best buy",
    "apple", "google", "microsoft", "meta", "netflix", "tesla",
    "nike", "adidas", "starbucks", "mcdonalds", "coca-cola",
    "pepsi", "johnson & johnson", "procter & gamble", "unilever",
    "ebay", "alibaba", "jd.com", "rakuten", "wayfair", "chewy",
    "etsy", "wish", "temu", "shein", "samsung", "sony", "lg",
    "deloitte", "accenture", "pwc", "kpmg", "ernst & young",
    "capgemini", "infosys", "tcs", "wipro", "cognizant",
];

/// Category labels in evaluation order. Rules whose label is not listed here
/// are never evaluated; curation happens by editing this list.
pub const DEFAULT_CATEGORY_PRIORITY: &[&str] = &[
    "Amazon-Specific",
    "Leadership Roles",
    "Marketplace General",
    "Related Roles",
];

// ---------------------------------------------------------------------------
// Config structs (matching jobcrawl.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// What to search for.
    #[serde(default)]
    pub search: SearchConfig,

    /// Accept/reject rules.
    #[serde(default)]
    pub relevance: RelevanceConfig,

    /// Category rules and their priority order.
    #[serde(default)]
    pub categories: CategoriesConfig,

    /// Politeness delays.
    #[serde(default)]
    pub delays: DelaysConfig,

    /// Page loading behaviour.
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Export settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Run-level policies.
    #[serde(default)]
    pub crawl: CrawlPoliciesConfig,
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Broad search phrases, crawled in order.
    #[serde(default = "default_queries")]
    pub queries: Vec<String>,

    /// Location filter passed to the site ("" searches everywhere).
    #[serde(default)]
    pub location: String,

    /// Number of accepted jobs to collect per query before moving on.
    #[serde(default = "default_results_per_query")]
    pub results_per_query: usize,

    /// Origin of the job-search site.
    #[serde(default = "default_site_origin")]
    pub site_origin: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            queries: default_queries(),
            location: String::new(),
            results_per_query: default_results_per_query(),
            site_origin: default_site_origin(),
        }
    }
}

fn default_queries() -> Vec<String> {
    vec!["Amazon marketplace".into(), "Amazon ecommerce".into()]
}
fn default_results_per_query() -> usize {
    50
}
fn default_site_origin() -> String {
    "https://www.indeed.com".into()
}

/// `[relevance]` section.
///
/// When a `require_*` switch is off its term list is never consulted.
/// When it is on and the list is empty, no posting can pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceConfig {
    /// Require at least one topic term in title + description.
    #[serde(default = "default_true")]
    pub require_topic_term: bool,

    /// Require at least one category term in title + description.
    #[serde(default = "default_true")]
    pub require_category_term: bool,

    #[serde(default = "default_topic_terms")]
    pub topic_terms: Vec<String>,

    #[serde(default = "default_category_terms")]
    pub category_terms: Vec<String>,

    /// Company-name substrings that reject a posting outright.
    #[serde(default = "default_blacklist")]
    pub blacklist: Vec<String>,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            require_topic_term: true,
            require_category_term: true,
            topic_terms: default_topic_terms(),
            category_terms: default_category_terms(),
            blacklist: default_blacklist(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_topic_terms() -> Vec<String> {
    vec!["amazon".into()]
}
fn default_category_terms() -> Vec<String> {
    vec!["marketplace".into(), "ecommerce".into(), "seller".into()]
}
fn default_blacklist() -> Vec<String> {
    DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect()
}

/// A labelled set of keyword triggers used to classify accepted postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    /// Matched against the title only.
    #[serde(default)]
    pub title_keywords: Vec<String>,
    /// Matched against title + description.
    #[serde(default)]
    pub description_keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(label: &str, title_keywords: &[&str], description_keywords: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            title_keywords: title_keywords.iter().map(|s| s.to_string()).collect(),
            description_keywords: description_keywords.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// `[categories]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesConfig {
    /// Labels in evaluation order.
    #[serde(default = "default_priority")]
    pub priority: Vec<String>,

    /// `[[categories.rules]]` entries.
    #[serde(default = "default_rules")]
    pub rules: Vec<CategoryRule>,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            priority: default_priority(),
            rules: default_rules(),
        }
    }
}

fn default_priority() -> Vec<String> {
    DEFAULT_CATEGORY_PRIORITY.iter().map(|s| s.to_string()).collect()
}

fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "Amazon-Specific",
            &["amazon", "fba", "seller central", "vendor central"],
            &["amazon seller central", "amazon fba", "amazon ppc", "amazon advertising"],
        ),
        CategoryRule::new(
            "Leadership Roles",
            &["director", "head of", "vp", "lead", "manager"],
            &[],
        ),
        CategoryRule::new(
            "Marketplace General",
            &["marketplace", "ecommerce", "e-commerce"],
            &["marketplace", "online marketplace", "multichannel"],
        ),
        CategoryRule::new(
            "Related Roles",
            &["analyst", "specialist", "coordinator", "associate"],
            &["listing", "catalog", "seller", "ppc"],
        ),
    ]
}

/// Longest politeness pause, in seconds, a delay range may ask for.
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// A `[min, max]` range of seconds for a randomized pause.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange(pub f64, pub f64);

impl DelayRange {
    pub fn min(&self) -> f64 {
        self.0
    }

    pub fn max(&self) -> f64 {
        self.1
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.0.is_finite() && self.1.is_finite()) || self.0 < 0.0 || self.0 > self.1 {
            return Err(JobCrawlError::config(format!(
                "delays.{name} must be [min, max] with 0 <= min <= max, got [{}, {}]",
                self.0, self.1
            )));
        }
        if self.1 > MAX_DELAY_SECS {
            return Err(JobCrawlError::config(format!(
                "delays.{name} max must be at most {MAX_DELAY_SECS} seconds, got {}",
                self.1
            )));
        }
        Ok(())
    }
}

/// `[delays]` section (seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelaysConfig {
    /// Between search queries, and before following a "next page" link.
    #[serde(default = "default_between_queries")]
    pub between_queries: DelayRange,

    /// After a results page has loaded.
    #[serde(default = "default_between_pages")]
    pub between_pages: DelayRange,

    /// Before opening a job detail page.
    #[serde(default = "default_open_detail")]
    pub open_detail: DelayRange,
}

impl Default for DelaysConfig {
    fn default() -> Self {
        Self {
            between_queries: default_between_queries(),
            between_pages: default_between_pages(),
            open_detail: default_open_detail(),
        }
    }
}

fn default_between_queries() -> DelayRange {
    DelayRange(2.0, 5.0)
}
fn default_between_pages() -> DelayRange {
    DelayRange(1.5, 3.5)
}
fn default_open_detail() -> DelayRange {
    DelayRange(1.0, 2.5)
}

/// `[browser]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Attempts per page load before the query is abandoned.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-load timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Results-page backoff base; attempt `n` waits `n * base`.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Detail-page backoff base.
    #[serde(default = "default_detail_retry_base_delay_ms")]
    pub detail_retry_base_delay_ms: u64,

    /// Open each posting to read its full description.
    #[serde(default = "default_true")]
    pub fetch_full_description: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            detail_retry_base_delay_ms: default_detail_retry_base_delay_ms(),
            fetch_full_description: true,
            user_agent: default_user_agent(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_retry_base_delay_ms() -> u64 {
    3_000
}
fn default_detail_retry_base_delay_ms() -> u64 {
    2_000
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36"
        .into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory export files are written to.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Prefix for export file names.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Include the description column in exports.
    #[serde(default = "default_true")]
    pub save_full_description: bool,

    /// Also export rejected postings for inspection.
    #[serde(default = "default_true")]
    pub save_rejected: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            file_prefix: default_file_prefix(),
            save_full_description: true,
            save_rejected: true,
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_file_prefix() -> String {
    "indeed_jobs".into()
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlPoliciesConfig {
    /// Queries crawled at the same time. 1 keeps a single session.
    ///
    /// Parallel queries share the one fetcher the run was built with, so a
    /// fetcher used here must tolerate concurrent loads. The pooled HTTP
    /// client does; a single-tab browser session would not.
    #[serde(default = "default_query_concurrency")]
    pub query_concurrency: usize,

    /// Upper bound on the whole run in seconds (0 disables it).
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
}

impl Default for CrawlPoliciesConfig {
    fn default() -> Self {
        Self {
            query_concurrency: default_query_concurrency(),
            run_timeout_secs: default_run_timeout_secs(),
        }
    }
}

fn default_query_concurrency() -> usize {
    1
}
fn default_run_timeout_secs() -> u64 {
    600
}

impl AppConfig {
    /// Reject values the crawler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.search.results_per_query == 0 {
            return Err(JobCrawlError::config(
                "search.results_per_query must be at least 1",
            ));
        }
        if self.browser.max_retries == 0 {
            return Err(JobCrawlError::config("browser.max_retries must be at least 1"));
        }
        if self.crawl.query_concurrency == 0 {
            return Err(JobCrawlError::config(
                "crawl.query_concurrency must be at least 1",
            ));
        }
        self.delays.between_queries.validate("between_queries")?;
        self.delays.between_pages.validate("between_pages")?;
        self.delays.open_detail.validate("open_detail")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Crawl config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub queries: Vec<String>,
    pub location: String,
    pub site_origin: String,
    /// Accepted jobs per query before the query stops.
    pub target_per_query: usize,
    pub max_retries: u32,
    pub page_timeout: Duration,
    pub retry_base_delay: Duration,
    pub detail_retry_base_delay: Duration,
    pub fetch_details: bool,
    pub query_concurrency: usize,
    pub run_timeout: Option<Duration>,
    pub relevance: RelevanceConfig,
    pub categories: CategoriesConfig,
    pub delays: DelaysConfig,
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            queries: config.search.queries.clone(),
            location: config.search.location.clone(),
            site_origin: config.search.site_origin.clone(),
            target_per_query: config.search.results_per_query,
            max_retries: config.browser.max_retries,
            page_timeout: Duration::from_secs(config.browser.timeout_secs),
            retry_base_delay: Duration::from_millis(config.browser.retry_base_delay_ms),
            detail_retry_base_delay: Duration::from_millis(
                config.browser.detail_retry_base_delay_ms,
            ),
            fetch_details: config.browser.fetch_full_description,
            query_concurrency: config.crawl.query_concurrency.max(1),
            run_timeout: match config.crawl.run_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            relevance: config.relevance.clone(),
            categories: config.categories.clone(),
            delays: config.delays.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.jobcrawl/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| JobCrawlError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.jobcrawl/jobcrawl.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| JobCrawlError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        JobCrawlError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| JobCrawlError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| JobCrawlError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| JobCrawlError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
