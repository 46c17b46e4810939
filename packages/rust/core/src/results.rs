//! Per-query outcomes and the run-wide accepted/rejected accumulators.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use jobcrawl_shared::Job;

/// Why a query stopped paginating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The accepted count reached the per-query target.
    TargetReached,
    /// A results page could not be loaded within the retry budget.
    FetchFailed(String),
    /// A results page held no cards.
    NoCards,
    /// The last page had no next-page link.
    NoNextPage,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetReached => f.write_str("target reached"),
            Self::FetchFailed(err) => write!(f, "fetch failed: {err}"),
            Self::NoCards => f.write_str("no cards on page"),
            Self::NoNextPage => f.write_str("no next page"),
        }
    }
}

/// Counters for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    /// Position of the query in the run.
    pub index: usize,
    pub query: String,
    pub accepted: usize,
    pub rejected: usize,
    /// Cards whose job had already been seen this run.
    pub duplicates: usize,
    /// Cards without a usable link.
    pub unparseable: usize,
    /// Results pages loaded.
    pub pages: usize,
    pub stop: StopReason,
}

impl QueryOutcome {
    pub(crate) fn new(index: usize, query: &str) -> Self {
        Self {
            index,
            query: query.to_string(),
            accepted: 0,
            rejected: 0,
            duplicates: 0,
            unparseable: 0,
            pages: 0,
            stop: StopReason::NoCards,
        }
    }
}

/// Everything a run collected, in query order.
#[derive(Debug, Default)]
pub struct Collected {
    pub accepted: Vec<Job>,
    pub rejected: Vec<Job>,
    pub queries: Vec<QueryOutcome>,
}

#[derive(Default)]
struct Inner {
    accepted: Vec<(usize, Job)>,
    rejected: Vec<(usize, Job)>,
    queries: Vec<QueryOutcome>,
}

/// Append-only sink shared by all query tasks.
///
/// Jobs are tagged with their query's index so that [`ResultSink::drain`]
/// returns them in query order even when queries ran concurrently.
#[derive(Default)]
pub struct ResultSink {
    inner: Mutex<Inner>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&self, query_index: usize, job: Job) {
        self.lock().accepted.push((query_index, job));
    }

    pub fn reject(&self, query_index: usize, job: Job) {
        self.lock().rejected.push((query_index, job));
    }

    pub fn record(&self, outcome: QueryOutcome) {
        self.lock().queries.push(outcome);
    }

    pub fn accepted_count(&self) -> usize {
        self.lock().accepted.len()
    }

    /// Take everything collected so far, leaving the sink empty.
    pub fn drain(&self) -> Collected {
        let inner = std::mem::take(&mut *self.lock());

        let mut accepted = inner.accepted;
        let mut rejected = inner.rejected;
        let mut queries = inner.queries;
        // stable: order within a query is preserved
        accepted.sort_by_key(|(index, _)| *index);
        rejected.sort_by_key(|(index, _)| *index);
        queries.sort_by_key(|q| q.index);

        Collected {
            accepted: accepted.into_iter().map(|(_, job)| job).collect(),
            rejected: rejected.into_iter().map(|(_, job)| job).collect(),
            queries,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobcrawl_shared::ParsedCard;

    fn job(title: &str, query: &str) -> Job {
        let card = ParsedCard {
            title: title.into(),
            ..ParsedCard::default()
        };
        Job::from_card(card, format!("https://www.indeed.com/viewjob?jk={title}"), query)
    }

    #[test]
    fn drain_orders_by_query_then_arrival() {
        let sink = ResultSink::new();
        sink.accept(1, job("b1", "second"));
        sink.accept(0, job("a1", "first"));
        sink.accept(1, job("b2", "second"));
        sink.accept(0, job("a2", "first"));
        sink.reject(1, job("r", "second"));

        let collected = sink.drain();
        let titles: Vec<_> = collected.accepted.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, ["a1", "a2", "b1", "b2"]);
        assert_eq!(collected.rejected.len(), 1);
        assert_eq!(sink.accepted_count(), 0);
    }

    #[test]
    fn stop_reason_display() {
        assert_eq!(StopReason::NoNextPage.to_string(), "no next page");
        assert_eq!(
            StopReason::FetchFailed("HTTP 503".into()).to_string(),
            "fetch failed: HTTP 503"
        );
    }
}
