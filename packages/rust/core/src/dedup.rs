//! Canonical job URLs and the run-wide seen-set.

use std::collections::HashSet;
use std::sync::{LazyLock, Mutex, MutexGuard};

use regex::Regex;

use jobcrawl_crawler::SearchSite;

static JOB_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"jk=([a-f0-9]+)").unwrap_or_else(|e| panic!("job key pattern is invalid: {e}"))
});

/// Tracks which canonical job URLs this run has already handled.
///
/// Shared by every query task; the membership test and the insert happen
/// under one lock.
pub struct Deduplicator {
    site: SearchSite,
    seen: Mutex<HashSet<String>>,
}

impl Deduplicator {
    pub fn new(site: SearchSite) -> Self {
        Self {
            site,
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Stable identifier for a card link.
    ///
    /// Links carrying a `jk=<hex>` job key collapse to the plain detail-view
    /// URL for that key, so tracking parameters never defeat dedup. Other
    /// links are resolved against the origin and kept as they are. A blank
    /// link has no identifier.
    pub fn canonicalize(&self, raw_url: &str) -> Option<String> {
        let raw_url = raw_url.trim();
        if raw_url.is_empty() {
            return None;
        }
        match JOB_KEY.captures(raw_url).and_then(|c| c.get(1)) {
            Some(key) => Some(self.site.detail_url(key.as_str())),
            None => self.site.resolve(raw_url),
        }
    }

    /// `true` the first time `canonical_url` is offered, recording it;
    /// `false` on every later call.
    pub fn is_new(&self, canonical_url: &str) -> bool {
        let mut seen = self.lock();
        if seen.contains(canonical_url) {
            false
        } else {
            seen.insert(canonical_url.to_string())
        }
    }

    pub fn seen_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dedup() -> Deduplicator {
        Deduplicator::new(SearchSite::new("https://www.indeed.com").unwrap())
    }

    #[test]
    fn job_key_collapses_tracking_parameters() {
        let d = dedup();
        let a = d.canonicalize("/rc/clk?jk=9f8e7d&from=serp&vjs=3").unwrap();
        let b = d
            .canonicalize("https://www.indeed.com/pagead/clk?ad=xyz&jk=9f8e7d")
            .unwrap();
        assert_eq!(a, "https://www.indeed.com/viewjob?jk=9f8e7d");
        assert_eq!(a, b);
    }

    #[test]
    fn links_without_key_are_resolved_unchanged() {
        let d = dedup();
        assert_eq!(
            d.canonicalize("/company/acme/jobs/123").as_deref(),
            Some("https://www.indeed.com/company/acme/jobs/123")
        );
        assert_eq!(
            d.canonicalize("https://jobs.example.com/42").as_deref(),
            Some("https://jobs.example.com/42")
        );
        // uppercase hex is not a job key
        assert_eq!(
            d.canonicalize("https://x.test/a?jk=ZZ").as_deref(),
            Some("https://x.test/a?jk=ZZ")
        );
    }

    #[test]
    fn blank_link_has_no_identifier() {
        assert_eq!(dedup().canonicalize(""), None);
        assert_eq!(dedup().canonicalize("  "), None);
    }

    #[test]
    fn is_new_true_exactly_once() {
        let d = dedup();
        let url = d.canonicalize("/viewjob?jk=abc123").unwrap();
        assert!(d.is_new(&url));
        assert!(!d.is_new(&url));
        let again = d.canonicalize("/rc/clk?jk=abc123&from=vj").unwrap();
        assert!(!d.is_new(&again));
        assert_eq!(d.seen_count(), 1);
    }

    #[test]
    fn concurrent_offers_admit_one() {
        let d = std::sync::Arc::new(dedup());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let d = d.clone();
                std::thread::spawn(move || d.is_new("https://www.indeed.com/viewjob?jk=1"))
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|new| *new)
            .count();
        assert_eq!(admitted, 1);
    }
}
