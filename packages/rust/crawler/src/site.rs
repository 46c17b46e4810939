//! URLs and selectors of the job-search site.

use url::Url;

use jobcrawl_shared::{JobCrawlError, Result};

/// Results shown per page; the `start` offset advances by this much.
pub const PAGE_STEP: usize = 10;

/// Present once a results page has rendered its job list.
pub const RESULTS_WAIT_SELECTOR: &str = "#mosaic-provider-jobcards, .jobsearch-ResultsList";

/// Full description on a job detail page.
pub const DETAIL_SELECTOR: &str = "#jobDescriptionText";

/// The "next page" affordance on a results page.
pub const NEXT_PAGE_SELECTOR: &str = r#"[data-testid="pagination-page-next"]"#;

/// Builds search and detail URLs relative to the site's origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSite {
    origin: Url,
}

impl SearchSite {
    pub fn new(origin: &str) -> Result<Self> {
        let origin = Url::parse(origin)
            .map_err(|e| JobCrawlError::config(format!("invalid site origin '{origin}': {e}")))?;
        if origin.cannot_be_a_base() {
            return Err(JobCrawlError::config(format!(
                "site origin '{origin}' cannot be used as a base URL"
            )));
        }
        Ok(Self { origin })
    }

    /// Results page for `query`, newest first, starting at result `start`.
    pub fn search_url(&self, query: &str, location: &str, start: usize) -> String {
        let mut url = self.origin.clone();
        url.set_path("/jobs");
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", query)
                .append_pair("l", location)
                .append_pair("sort", "date");
            if start > 0 {
                pairs.append_pair("start", &start.to_string());
            }
        }
        url.to_string()
    }

    /// Detail-view URL for a job key, without any tracking parameters.
    pub fn detail_url(&self, job_key: &str) -> String {
        let mut url = self.origin.clone();
        url.set_path("/viewjob");
        url.query_pairs_mut().append_pair("jk", job_key);
        url.to_string()
    }

    /// Resolve a card link against the origin. Absolute links pass through
    /// untouched; blank links resolve to nothing.
    pub fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        if href.starts_with("http") {
            return Some(href.to_string());
        }
        self.origin.join(href).ok().map(|u| u.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SearchSite {
        SearchSite::new("https://www.indeed.com").unwrap()
    }

    #[test]
    fn first_page_has_no_start() {
        assert_eq!(
            site().search_url("Amazon marketplace", "", 0),
            "https://www.indeed.com/jobs?q=Amazon+marketplace&l=&sort=date"
        );
    }

    #[test]
    fn later_pages_carry_start_offset() {
        assert_eq!(
            site().search_url("ecommerce", "New York, NY", 20),
            "https://www.indeed.com/jobs?q=ecommerce&l=New+York%2C+NY&sort=date&start=20"
        );
    }

    #[test]
    fn detail_url_uses_key_only() {
        assert_eq!(
            site().detail_url("0a1b2c"),
            "https://www.indeed.com/viewjob?jk=0a1b2c"
        );
    }

    #[test]
    fn resolve_relative_and_absolute() {
        let site = site();
        assert_eq!(
            site.resolve("/rc/clk?jk=ff&from=serp").as_deref(),
            Some("https://www.indeed.com/rc/clk?jk=ff&from=serp")
        );
        assert_eq!(
            site.resolve("https://example.com/job/1").as_deref(),
            Some("https://example.com/job/1")
        );
        assert_eq!(site.resolve("   "), None);
    }

    #[test]
    fn origin_with_port_for_mock_servers() {
        let site = SearchSite::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(site.detail_url("1"), "http://127.0.0.1:8080/viewjob?jk=1");
    }

    #[test]
    fn invalid_origin_is_a_config_error() {
        let err = SearchSite::new("not a url").unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }
}
