//! JobCrawl CLI: crawl a job-search site for curated, categorized postings.
//!
//! Runs the configured search queries, filters out irrelevant or
//! blacklisted results and exports the kept postings as CSV and JSON.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
