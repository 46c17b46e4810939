//! Keep/reject decisions for postings.
//!
//! Filtering runs in two phases so a blacklisted company can be rejected
//! from its card alone, before any detail page is fetched:
//! [`RelevanceFilter::cheap_reject`] then [`RelevanceFilter::evaluate`].

use std::fmt;

use jobcrawl_shared::RelevanceConfig;

/// Why a posting was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The company name contains this blacklist entry.
    BlacklistedCompany(String),
    /// No topic term occurs in the title or description.
    MissingTopicTerm,
    /// No category term occurs in the title or description.
    MissingCategoryTerm,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlacklistedCompany(entry) => write!(f, "blacklisted company (matched '{entry}')"),
            Self::MissingTopicTerm => f.write_str("no topic term"),
            Self::MissingCategoryTerm => f.write_str("no category term"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject(RejectReason),
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Applies the blacklist and the required-term switches.
///
/// Terms are lowercased once at construction. A switch that is on with an
/// empty term list rejects everything.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    blacklist: Vec<String>,
    topic_terms: Option<Vec<String>>,
    category_terms: Option<Vec<String>>,
}

impl RelevanceFilter {
    pub fn new(config: &RelevanceConfig) -> Self {
        Self {
            blacklist: normalize(&config.blacklist),
            topic_terms: config
                .require_topic_term
                .then(|| normalize(&config.topic_terms)),
            category_terms: config
                .require_category_term
                .then(|| normalize(&config.category_terms)),
        }
    }

    /// Blacklist check on the company name alone.
    pub fn cheap_reject(&self, company: &str) -> Option<RejectReason> {
        let company = company.trim().to_lowercase();
        self.blacklist
            .iter()
            .find(|entry| company.contains(entry.as_str()))
            .map(|entry| RejectReason::BlacklistedCompany(entry.clone()))
    }

    /// Full decision. Checks run in order and stop at the first failure:
    /// blacklist, topic term, category term.
    pub fn evaluate(&self, company: &str, title: &str, description: &str) -> Decision {
        if let Some(reason) = self.cheap_reject(company) {
            return Decision::Reject(reason);
        }

        let text = combined_text(title, description);

        if let Some(terms) = &self.topic_terms {
            if !contains_any(&text, terms) {
                return Decision::Reject(RejectReason::MissingTopicTerm);
            }
        }
        if let Some(terms) = &self.category_terms {
            if !contains_any(&text, terms) {
                return Decision::Reject(RejectReason::MissingCategoryTerm);
            }
        }

        Decision::Accept
    }
}

/// Lowercased `title + " " + description`.
pub(crate) fn combined_text(title: &str, description: &str) -> String {
    format!("{title} {description}").to_lowercase()
}

/// Whether any of the (already lowercased) `terms` occurs in `haystack`.
pub(crate) fn contains_any(haystack: &str, terms: &[String]) -> bool {
    terms.iter().any(|term| haystack.contains(term.as_str()))
}

fn normalize(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
