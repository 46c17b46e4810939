//! The crawl control loop.
//!
//! For each query: load results pages with retry, extract cards, and push
//! every card through dedup, the blacklist pre-check, the optional detail
//! fetch, the full relevance decision and finally categorization. A query
//! stops when its target is met, a page cannot be loaded, a page is empty,
//! or there is no next page.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use jobcrawl_crawler::{
    CardExtractor, DETAIL_SELECTOR, DelayStrategy, FetchError, PAGE_STEP, PageFetcher, Pause,
    RESULTS_WAIT_SELECTOR, RandomDelay, RetryPolicy, SearchSite,
};
use jobcrawl_shared::{CrawlConfig, Job, ParsedCard, Result, RunId};

use crate::categorize::Categorizer;
use crate::dedup::Deduplicator;
use crate::keywords::KeywordReporter;
use crate::progress::{ProgressReporter, SilentProgress};
use crate::relevance::{Decision, RelevanceFilter};
use crate::results::{QueryOutcome, ResultSink, StopReason};
use crate::writer::JobWriter;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Every query ran to its own stop condition.
    Completed,
    /// The shutdown signal fired first.
    Interrupted,
    /// The whole-run time limit elapsed.
    TimedOut,
}

/// Result of [`Orchestrator::run`].
#[derive(Debug)]
pub struct RunReport {
    pub run_id: RunId,
    pub termination: Termination,
    pub accepted: Vec<Job>,
    pub rejected: Vec<Job>,
    /// Outcomes of the queries that finished, in query order.
    pub queries: Vec<QueryOutcome>,
    /// Files written by the writer.
    pub exported: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Drives a crawl run.
///
/// Cloning is cheap; clones share the seen-set and the result sink, which is
/// how concurrent query tasks cooperate.
#[derive(Clone)]
pub struct Orchestrator {
    config: Arc<CrawlConfig>,
    site: SearchSite,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn CardExtractor>,
    delay: Arc<dyn DelayStrategy>,
    progress: Arc<dyn ProgressReporter>,
    relevance: Arc<RelevanceFilter>,
    categorizer: Arc<Categorizer>,
    keywords: Arc<KeywordReporter>,
    dedup: Arc<Deduplicator>,
    results: Arc<ResultSink>,
}

impl Orchestrator {
    /// Create an orchestrator with randomized politeness delays and no
    /// progress reporting.
    pub fn new(
        config: CrawlConfig,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn CardExtractor>,
    ) -> Result<Self> {
        let site = SearchSite::new(&config.site_origin)?;

        Ok(Self {
            delay: Arc::new(RandomDelay::new(&config.delays)),
            progress: Arc::new(SilentProgress),
            relevance: Arc::new(RelevanceFilter::new(&config.relevance)),
            categorizer: Arc::new(Categorizer::new(
                &config.categories.rules,
                &config.categories.priority,
            )),
            keywords: Arc::new(KeywordReporter::new(&config.categories.rules)),
            dedup: Arc::new(Deduplicator::new(site.clone())),
            results: Arc::new(ResultSink::new()),
            config: Arc::new(config),
            site,
            fetcher,
            extractor,
        })
    }

    pub fn with_delay(mut self, delay: Arc<dyn DelayStrategy>) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Crawl every configured query, then hand the results to `writer` and
    /// close the fetcher.
    ///
    /// The flush and the close happen exactly once on every path, including
    /// `shutdown` resolving and the run time limit. Writer and close failures
    /// are returned only after both have been attempted.
    #[instrument(skip_all, fields(queries = self.config.queries.len()))]
    pub async fn run<S>(self, writer: &dyn JobWriter, shutdown: S) -> Result<RunReport>
    where
        S: Future<Output = ()>,
    {
        let run_id = RunId::new();
        let started = Instant::now();
        let run_timeout = self.config.run_timeout;

        info!(
            %run_id,
            target_per_query = self.config.target_per_query,
            concurrency = self.config.query_concurrency,
            extractor = self.extractor.name(),
            "starting crawl"
        );

        let deadline = async move {
            match run_timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };

        let termination = tokio::select! {
            () = self.crawl_all() => Termination::Completed,
            () = shutdown => {
                warn!("crawl interrupted, saving partial results");
                Termination::Interrupted
            }
            () = deadline => {
                warn!(limit = ?run_timeout, "run time limit reached, saving partial results");
                Termination::TimedOut
            }
        };

        let closed = self.fetcher.close().await;
        if let Err(e) = &closed {
            error!(error = %e, "failed to close fetch session");
        }

        let collected = self.results.drain();
        let written = writer.write(&collected.accepted, &collected.rejected);

        let exported = match written {
            Ok(paths) => paths,
            Err(e) => {
                error!(error = %e, "failed to export results");
                return Err(e);
            }
        };
        closed?;

        let report = RunReport {
            run_id,
            termination,
            accepted: collected.accepted,
            rejected: collected.rejected,
            queries: collected.queries,
            exported,
            elapsed: started.elapsed(),
        };

        info!(
            run_id = %report.run_id,
            termination = ?report.termination,
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            elapsed_ms = report.elapsed.as_millis(),
            "crawl finished"
        );

        Ok(report)
    }

    async fn crawl_all(&self) {
        let queries = self.config.queries.clone();
        let total = queries.len();
        let sequential = self.config.query_concurrency <= 1;

        let semaphore = Arc::new(Semaphore::new(self.config.query_concurrency.max(1)));
        let mut tasks = JoinSet::new();

        // Every query runs in its own task so a panic stays inside it and the
        // run still reaches the flush.
        for (index, query) in queries.into_iter().enumerate() {
            let this = self.clone();
            let sem = semaphore.clone();
            tasks.spawn(async move {
                // The semaphore is never closed, so acquire cannot fail.
                let Ok(_permit) = sem.acquire_owned().await else {
                    return;
                };
                this.crawl_one(index, &query, total).await;
            });

            if sequential {
                join_queries(&mut tasks).await;
            }
        }

        join_queries(&mut tasks).await;
    }

    async fn crawl_one(&self, index: usize, query: &str, total: usize) {
        self.progress.query_started(index, query, total);
        let outcome = self
            .run_query(index, query, self.config.target_per_query)
            .await;
        self.progress.query_finished(&outcome);
        self.results.record(outcome);
        self.delay.pause(Pause::BetweenQueries).await;
    }

    /// Paginate one query until a stop condition holds.
    #[instrument(skip_all, fields(query = %query, index))]
    pub async fn run_query(&self, index: usize, query: &str, target: usize) -> QueryOutcome {
        let policy = RetryPolicy::new(self.config.max_retries, self.config.retry_base_delay);
        let mut outcome = QueryOutcome::new(index, query);
        let mut start = 0;

        info!(target_per_query = target, "starting query");

        outcome.stop = loop {
            if outcome.accepted >= target {
                break StopReason::TargetReached;
            }

            let url = self.site.search_url(query, &self.config.location, start);
            let markup = match self.load_page(&url, &policy).await {
                Ok(markup) => markup,
                Err(e) => {
                    error!(%url, error = %e, "giving up on query");
                    break StopReason::FetchFailed(e.to_string());
                }
            };
            outcome.pages += 1;
            self.delay.pause(Pause::BetweenPages).await;

            let cards = self.extractor.extract_cards(&markup);
            if cards.is_empty() {
                info!(page = outcome.pages, "no cards on page");
                break StopReason::NoCards;
            }
            let has_next = self.extractor.has_next_page(&markup);
            self.progress.page_loaded(query, outcome.pages, cards.len());
            debug!(page = outcome.pages, cards = cards.len(), has_next, "page loaded");

            for card in cards {
                if outcome.accepted >= target {
                    break;
                }
                self.process_card(card, index, query, target, &mut outcome)
                    .await;
            }

            if outcome.accepted >= target {
                break StopReason::TargetReached;
            }
            if !has_next {
                break StopReason::NoNextPage;
            }

            start += PAGE_STEP;
            self.delay.pause(Pause::BetweenQueries).await;
        };

        info!(
            accepted = outcome.accepted,
            rejected = outcome.rejected,
            duplicates = outcome.duplicates,
            pages = outcome.pages,
            stop = %outcome.stop,
            "query finished"
        );
        outcome
    }

    async fn process_card(
        &self,
        card: ParsedCard,
        index: usize,
        query: &str,
        target: usize,
        outcome: &mut QueryOutcome,
    ) {
        let Some(canonical) = self.dedup.canonicalize(&card.raw_url) else {
            debug!(title = %card.title, "card has no link, skipping");
            outcome.unparseable += 1;
            return;
        };
        if !self.dedup.is_new(&canonical) {
            debug!(url = %canonical, "duplicate job");
            outcome.duplicates += 1;
            return;
        }

        let mut job = Job::from_card(card, canonical, query);

        if let Some(reason) = self.relevance.cheap_reject(&job.company) {
            debug!(title = %job.title, company = %job.company, %reason, "rejected");
            outcome.rejected += 1;
            self.results.reject(index, job);
            return;
        }

        if self.config.fetch_details && job.url.starts_with("http") {
            if let Some(description) = self.load_description(&job.url).await {
                job.description = description;
            }
        }

        match self
            .relevance
            .evaluate(&job.company, &job.title, &job.description)
        {
            Decision::Reject(reason) => {
                debug!(title = %job.title, company = %job.company, %reason, "rejected");
                outcome.rejected += 1;
                self.results.reject(index, job);
            }
            Decision::Accept => {
                let category = self.categorizer.classify(&job.title, &job.description);
                job.category = Some(category.to_string());
                job.keyword = Some(self.keywords.summarize(&job.title, &job.description));
                outcome.accepted += 1;

                info!(
                    kept = outcome.accepted,
                    target_per_query = target,
                    title = %job.title,
                    company = %job.company,
                    category,
                    "kept"
                );
                self.progress.job_kept(query, outcome.accepted, target);
                self.results.accept(index, job);
            }
        }
    }

    async fn load_page(
        &self,
        url: &str,
        policy: &RetryPolicy,
    ) -> std::result::Result<String, FetchError> {
        let fetcher = self.fetcher.as_ref();
        let timeout = self.config.page_timeout;
        policy
            .run(self.delay.as_ref(), url, move || {
                fetcher.load(url, RESULTS_WAIT_SELECTOR, timeout)
            })
            .await
    }

    /// Best-effort full description; `None` keeps the card snippet.
    async fn load_description(&self, url: &str) -> Option<String> {
        self.delay.pause(Pause::OpenDetail).await;

        let policy = RetryPolicy::new(
            self.config.max_retries,
            self.config.detail_retry_base_delay,
        );
        let fetcher = self.fetcher.as_ref();
        let timeout = self.config.page_timeout;

        let loaded = policy
            .run(self.delay.as_ref(), url, move || {
                fetcher.load_detail(url, DETAIL_SELECTOR, timeout)
            })
            .await;

        match loaded {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                debug!(url, "empty description, keeping snippet");
                None
            }
            Err(e) => {
                warn!(url, error = %e, "could not load description, keeping snippet");
                None
            }
        }
    }
}

async fn join_queries(tasks: &mut JoinSet<()>) {
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "query task failed");
        }
    }
}
