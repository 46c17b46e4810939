//! CSV and JSON export of crawl results, plus the post-run summary.
//!
//! [`FileWriter`] is the [`JobWriter`] used by the CLI. Each run writes
//! timestamped files into the output directory:
//!
//! ```text
//! {prefix}_{timestamp}.csv
//! {prefix}_{timestamp}.json
//! rejected_{prefix}_{timestamp}.csv
//! ```

pub mod summary;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use jobcrawl_core::JobWriter;
use jobcrawl_shared::{Job, JobCrawlError, OutputConfig, Result};

pub use summary::RunSummary;

/// Byte-order mark written at the start of every CSV file so spreadsheet
/// tools detect UTF-8.
pub const UTF8_BOM: &str = "\u{feff}";

/// Timestamp embedded in export file names.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

const COLUMNS: &[&str] = &[
    "category",
    "keyword",
    "search_query",
    "title",
    "company",
    "location",
    "salary",
    "posted_date",
    "url",
    "description",
];

/// Where and how to export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub dir: PathBuf,
    pub file_prefix: String,
    /// Include the `description` column.
    pub include_description: bool,
    /// Write the rejected-jobs audit file.
    pub save_rejected: bool,
}

impl From<&OutputConfig> for ExportOptions {
    fn from(config: &OutputConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            file_prefix: config.file_prefix.clone(),
            include_description: config.save_full_description,
            save_rejected: config.save_rejected,
        }
    }
}

/// One exported record; field order is column order.
#[derive(Serialize)]
struct ExportRow<'a> {
    category: &'a str,
    keyword: &'a str,
    search_query: &'a str,
    title: &'a str,
    company: &'a str,
    location: &'a str,
    salary: &'a str,
    posted_date: &'a str,
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> ExportRow<'a> {
    fn new(job: &'a Job, include_description: bool) -> Self {
        Self {
            category: job.category.as_deref().unwrap_or(""),
            keyword: job.keyword.as_deref().unwrap_or(""),
            search_query: &job.search_query,
            title: &job.title,
            company: &job.company,
            location: &job.location,
            salary: &job.salary,
            posted_date: &job.posted_date,
            url: &job.url,
            description: include_description.then_some(job.description.as_str()),
        }
    }

    fn cells(&self) -> Vec<&'a str> {
        let mut cells = vec![
            self.category,
            self.keyword,
            self.search_query,
            self.title,
            self.company,
            self.location,
            self.salary,
            self.posted_date,
            self.url,
        ];
        cells.extend(self.description);
        cells
    }
}

/// Writes accepted jobs as CSV + JSON and rejected jobs as CSV.
pub struct FileWriter {
    options: ExportOptions,
}

impl FileWriter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Export using `timestamp` in the file names.
    ///
    /// Accepted jobs without a usable title are left out. When none remain,
    /// no accepted files are written.
    pub fn write_at(
        &self,
        accepted: &[Job],
        rejected: &[Job],
        timestamp: &str,
    ) -> Result<Vec<PathBuf>> {
        let dir = &self.options.dir;
        std::fs::create_dir_all(dir).map_err(|e| JobCrawlError::io(dir, e))?;

        let prefix = &self.options.file_prefix;
        let mut written = Vec::new();

        let valid: Vec<&Job> = accepted.iter().filter(|j| j.has_title()).collect();
        if valid.is_empty() {
            warn!(
                accepted = accepted.len(),
                "no valid jobs to export; try --no-require-topic or --no-require-category"
            );
        } else {
            let rows: Vec<ExportRow<'_>> = valid
                .iter()
                .map(|j| ExportRow::new(j, self.options.include_description))
                .collect();

            let csv_path = dir.join(format!("{prefix}_{timestamp}.csv"));
            self.write_csv(&csv_path, &rows)?;
            written.push(csv_path);

            let json_path = dir.join(format!("{prefix}_{timestamp}.json"));
            write_json(&json_path, &rows)?;
            written.push(json_path);

            info!(jobs = rows.len(), dir = %dir.display(), "exported accepted jobs");
        }

        if self.options.save_rejected && !rejected.is_empty() {
            let rows: Vec<ExportRow<'_>> = rejected
                .iter()
                .map(|j| ExportRow::new(j, self.options.include_description))
                .collect();
            let path = dir.join(format!("rejected_{prefix}_{timestamp}.csv"));
            self.write_csv(&path, &rows)?;
            info!(jobs = rows.len(), path = %path.display(), "exported rejected jobs");
            written.push(path);
        }

        Ok(written)
    }

    fn write_csv(&self, path: &Path, rows: &[ExportRow<'_>]) -> Result<()> {
        let file = File::create(path).map_err(|e| JobCrawlError::io(path, e))?;
        let mut out = BufWriter::new(file);
        out.write_all(UTF8_BOM.as_bytes())
            .map_err(|e| JobCrawlError::io(path, e))?;

        let header_len = if self.options.include_description {
            COLUMNS.len()
        } else {
            COLUMNS.len() - 1
        };

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(out);
        let csv_err = |e: csv::Error| {
            JobCrawlError::Export(format!("CSV write to {} failed: {e}", path.display()))
        };
        writer.write_record(&COLUMNS[..header_len]).map_err(csv_err)?;
        for row in rows {
            writer.write_record(row.cells()).map_err(csv_err)?;
        }
        writer.flush().map_err(|e| JobCrawlError::io(path, e))?;

        debug!(path = %path.display(), rows = rows.len(), "wrote CSV file");
        Ok(())
    }
}

impl JobWriter for FileWriter {
    fn write(&self, accepted: &[Job], rejected: &[Job]) -> Result<Vec<PathBuf>> {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.write_at(accepted, rejected, &timestamp)
    }
}

/// Write a JSON file (pretty-printed).
fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| JobCrawlError::Export(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json).map_err(|e| JobCrawlError::io(path, e))?;
    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
