//! Crawl orchestration and relevance decisions for JobCrawl.
//!
//! This crate ties together page fetching, card extraction, deduplication,
//! filtering and categorization into a crawl run ([`Orchestrator::run`]).

pub mod categorize;
pub mod dedup;
pub mod keywords;
pub mod orchestrator;
pub mod progress;
pub mod relevance;
pub mod results;
pub mod writer;

pub use categorize::{Categorizer, UNCATEGORIZED};
pub use dedup::Deduplicator;
pub use keywords::{BROAD_SEARCH, KeywordReporter, MAX_KEYWORDS};
pub use orchestrator::{Orchestrator, RunReport, Termination};
pub use progress::{ProgressReporter, SilentProgress};
pub use relevance::{Decision, RejectReason, RelevanceFilter};
pub use results::{Collected, QueryOutcome, ResultSink, StopReason};
pub use writer::JobWriter;
