//! Progress callbacks for front ends.

use crate::results::QueryOutcome;

/// Progress callback for reporting crawl status.
pub trait ProgressReporter: Send + Sync {
    /// Called when a query begins.
    fn query_started(&self, index: usize, query: &str, total: usize);
    /// Called after each results page is loaded.
    fn page_loaded(&self, query: &str, page: usize, cards: usize);
    /// Called when a job is accepted.
    fn job_kept(&self, query: &str, kept: usize, target: usize);
    /// Called when a query stops.
    fn query_finished(&self, outcome: &QueryOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn query_started(&self, _index: usize, _query: &str, _total: usize) {}
    fn page_loaded(&self, _query: &str, _page: usize, _cards: usize) {}
    fn job_kept(&self, _query: &str, _kept: usize, _target: usize) {}
    fn query_finished(&self, _outcome: &QueryOutcome) {}
}
