//! Shared types, error model, and configuration for JobCrawl.
//!
//! This crate is the foundation depended on by all other JobCrawl crates.
//! It provides:
//! - [`JobCrawlError`] — the unified error type
//! - Domain types ([`ParsedCard`], [`Job`], [`RunId`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BrowserConfig, CategoriesConfig, CategoryRule, CrawlConfig, CrawlPoliciesConfig,
    DEFAULT_BLACKLIST, DEFAULT_CATEGORY_PRIORITY, DelayRange, DelaysConfig, MAX_DELAY_SECS,
    OutputConfig,
    RelevanceConfig, SearchConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{JobCrawlError, Result};
pub use types::{Job, NOT_AVAILABLE, ParsedCard, RunId, SearchQuery, or_not_available};
