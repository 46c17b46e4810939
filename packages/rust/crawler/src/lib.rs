//! Page fetching and results-page extraction for JobCrawl.
//!
//! This crate provides:
//! - [`fetch`] — the [`PageFetcher`] trait and the reqwest-backed [`HttpFetcher`]
//! - [`adapters`] — the [`CardExtractor`] trait and [`IndeedExtractor`]
//! - [`retry`] — bounded retry with linear backoff
//! - [`delay`] — politeness pauses ([`RandomDelay`], [`NoDelay`])
//! - [`site`] — search and detail URL construction

pub mod adapters;
pub mod delay;
pub mod fetch;
pub mod retry;
pub mod site;

pub use adapters::{CardExtractor, IndeedExtractor};
pub use delay::{DelayStrategy, NoDelay, Pause, RandomDelay};
pub use fetch::{FetchError, HttpFetcher, PageFetcher, element_text, selector_present};
pub use retry::RetryPolicy;
pub use site::{
    DETAIL_SELECTOR, NEXT_PAGE_SELECTOR, PAGE_STEP, RESULTS_WAIT_SELECTOR, SearchSite,
};
