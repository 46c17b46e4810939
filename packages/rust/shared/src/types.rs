//! Core domain types for crawled job postings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel for a card field the results page did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// A free-text search phrase, crawled in the order supplied.
pub type SearchQuery = String;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one crawl run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ParsedCard
// ---------------------------------------------------------------------------

/// A single search-result entry as parsed from a results page.
///
/// Missing fields are represented by [`NOT_AVAILABLE`] (or an empty string
/// for title, URL and snippet) rather than failing the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCard {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    /// Detail link exactly as found on the card; may be relative or empty.
    pub raw_url: String,
    pub snippet: String,
    pub posted_date: String,
}

impl Default for ParsedCard {
    fn default() -> Self {
        Self {
            title: String::new(),
            company: NOT_AVAILABLE.into(),
            location: NOT_AVAILABLE.into(),
            salary: NOT_AVAILABLE.into(),
            raw_url: String::new(),
            snippet: String::new(),
            posted_date: NOT_AVAILABLE.into(),
        }
    }
}

/// Return `value`, or the [`NOT_AVAILABLE`] sentinel when it is blank.
pub fn or_not_available(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => NOT_AVAILABLE.into(),
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// A deduplicated posting, filled in as it moves through the pipeline.
///
/// Serialized field names are the export column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Matched-keyword summary (informational only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    pub search_query: SearchQuery,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub posted_date: String,
    /// Canonical detail URL (the dedup key).
    pub url: String,
    /// Full description, or the card snippet when no detail text was fetched.
    pub description: String,
    #[serde(skip)]
    pub raw_url: String,
}

impl Job {
    /// Create a job from a card that passed deduplication.
    pub fn from_card(card: ParsedCard, canonical_url: String, query: &str) -> Self {
        Self {
            category: None,
            keyword: None,
            search_query: query.to_string(),
            title: card.title,
            company: card.company,
            location: card.location,
            salary: card.salary,
            posted_date: card.posted_date,
            url: canonical_url,
            description: card.snippet,
            raw_url: card.raw_url,
        }
    }

    /// Whether the job has a usable title (not blank and not the sentinel).
    pub fn has_title(&self) -> bool {
        let title = self.title.trim();
        !title.is_empty() && title != NOT_AVAILABLE
    }

    /// Whether the results page listed any salary information.
    pub fn has_salary(&self) -> bool {
        let salary = self.salary.trim();
        !salary.is_empty() && salary != NOT_AVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> ParsedCard {
        ParsedCard {
            title: "Marketplace Lead".into(),
            company: "Acme".into(),
            raw_url: "/rc/clk?jk=abc123&from=serp".into(),
            snippet: "Own our seller channel".into(),
            ..ParsedCard::default()
        }
    }

    #[test]
    fn default_card_uses_sentinels() {
        let card = ParsedCard::default();
        assert_eq!(card.company, NOT_AVAILABLE);
        assert_eq!(card.location, NOT_AVAILABLE);
        assert_eq!(card.salary, NOT_AVAILABLE);
        assert_eq!(card.posted_date, NOT_AVAILABLE);
        assert!(card.title.is_empty());
        assert!(card.raw_url.is_empty());
    }

    #[test]
    fn job_starts_with_snippet_as_description() {
        let job = Job::from_card(
            card(),
            "https://www.indeed.com/viewjob?jk=abc123".into(),
            "Amazon marketplace",
        );
        assert_eq!(job.description, "Own our seller channel");
        assert_eq!(job.search_query, "Amazon marketplace");
        assert_eq!(job.raw_url, "/rc/clk?jk=abc123&from=serp");
        assert!(job.category.is_none());
        assert!(job.keyword.is_none());
    }

    #[test]
    fn title_and_salary_checks() {
        let mut job = Job::from_card(card(), "u".into(), "q");
        assert!(job.has_title());
        assert!(!job.has_salary());

        job.title = NOT_AVAILABLE.into();
        job.salary = "$60,000 a year".into();
        assert!(!job.has_title());
        assert!(job.has_salary());
    }

    #[test]
    fn or_not_available_handles_blank() {
        assert_eq!(or_not_available(None), NOT_AVAILABLE);
        assert_eq!(or_not_available(Some("   ".into())), NOT_AVAILABLE);
        assert_eq!(or_not_available(Some("Remote".into())), "Remote");
    }

    #[test]
    fn job_serializes_without_raw_url() {
        let job = Job::from_card(card(), "https://www.indeed.com/viewjob?jk=abc123".into(), "q");
        let json = serde_json::to_string(&job).expect("serialize");
        assert!(!json.contains("raw_url"));
        assert!(!json.contains("category"));
        assert!(json.contains("\"url\":\"https://www.indeed.com/viewjob?jk=abc123\""));
    }

    #[test]
    fn run_id_display_is_uuid() {
        let id = RunId::new();
        assert_eq!(id.to_string().len(), 36);
    }
}
