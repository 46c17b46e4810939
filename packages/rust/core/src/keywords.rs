//! Matched-keyword summaries for accepted postings.
//!
//! Purely informational: the summary never affects accept/reject.

use jobcrawl_shared::CategoryRule;

use crate::relevance::combined_text;

/// At most this many keywords appear in a summary.
pub const MAX_KEYWORDS: usize = 5;

/// Summary used when nothing matched.
pub const BROAD_SEARCH: &str = "broad search";

/// Reports which category keywords occur in a posting.
#[derive(Debug, Clone)]
pub struct KeywordReporter {
    /// Every rule's keywords in rule-set order, title keywords first,
    /// exact duplicates removed.
    pool: Vec<String>,
}

impl KeywordReporter {
    pub fn new(rules: &[CategoryRule]) -> Self {
        let mut pool: Vec<String> = Vec::new();
        for rule in rules {
            for keyword in rule.title_keywords.iter().chain(&rule.description_keywords) {
                if !keyword.trim().is_empty() && !pool.contains(keyword) {
                    pool.push(keyword.clone());
                }
            }
        }
        Self { pool }
    }

    /// Up to [`MAX_KEYWORDS`] matching keywords in pool order, joined with
    /// `", "`, or [`BROAD_SEARCH`].
    pub fn summarize(&self, title: &str, description: &str) -> String {
        let text = combined_text(title, description);
        let matched: Vec<&str> = self
            .pool
            .iter()
            .filter(|k| text.contains(&k.to_lowercase()))
            .take(MAX_KEYWORDS)
            .map(String::as_str)
            .collect();

        if matched.is_empty() {
            BROAD_SEARCH.to_string()
        } else {
            matched.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupes_preserving_first_seen_order() {
        let rules = vec![CategoryRule::new("A", &["seller", "seller"], &["ops"])];
        let reporter = KeywordReporter::new(&rules);
        assert_eq!(reporter.summarize("seller ops seller", ""), "seller, ops");
    }

    #[test]
    fn spans_all_rules_and_caps_at_five() {
        let rules = vec![
            CategoryRule::new("A", &["a1", "a2"], &["a3"]),
            CategoryRule::new("B", &["b1"], &["b2", "b3"]),
        ];
        let reporter = KeywordReporter::new(&rules);
        assert_eq!(
            reporter.summarize("a1 a2 a3", "b1 b2 b3"),
            "a1, a2, a3, b1, b2"
        );
    }

    #[test]
    fn match_is_case_insensitive_but_keeps_spelling() {
        let rules = vec![CategoryRule::new("A", &["FBA"], &[])];
        let reporter = KeywordReporter::new(&rules);
        assert_eq!(reporter.summarize("Amazon fba lead", ""), "FBA");
    }

    #[test]
    fn no_match_is_broad_search() {
        let rules = vec![CategoryRule::new("A", &["lead"], &[])];
        assert_eq!(KeywordReporter::new(&rules).summarize("Chef", "kitchen"), BROAD_SEARCH);
        assert_eq!(KeywordReporter::new(&[]).summarize("anything", ""), BROAD_SEARCH);
    }
}
