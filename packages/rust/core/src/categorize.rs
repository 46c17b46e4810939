//! Priority-ordered category assignment.

use jobcrawl_shared::CategoryRule;

use crate::relevance::{combined_text, contains_any};

/// Label given when no rule in the priority list matches.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone)]
struct CompiledRule {
    label: String,
    title_keywords: Vec<String>,
    description_keywords: Vec<String>,
}

/// Assigns the first matching category, walking rules in priority order.
///
/// Only labels named in the priority list are ever evaluated. Labels in the
/// list without a rule are skipped.
#[derive(Debug, Clone)]
pub struct Categorizer {
    ordered: Vec<CompiledRule>,
}

impl Categorizer {
    pub fn new(rules: &[CategoryRule], priority: &[String]) -> Self {
        let ordered = priority
            .iter()
            .filter_map(|label| rules.iter().find(|r| &r.label == label))
            .map(|rule| CompiledRule {
                label: rule.label.clone(),
                title_keywords: lowercase(&rule.title_keywords),
                description_keywords: lowercase(&rule.description_keywords),
            })
            .collect();
        Self { ordered }
    }

    /// Title keywords are matched against the title only; description
    /// keywords against title and description together.
    pub fn classify(&self, title: &str, description: &str) -> &str {
        let title_lower = title.to_lowercase();
        let text = combined_text(title, description);

        self.ordered
            .iter()
            .find(|rule| {
                contains_any(&title_lower, &rule.title_keywords)
                    || contains_any(&text, &rule.description_keywords)
            })
            .map_or(UNCATEGORIZED, |rule| rule.label.as_str())
    }
}

fn lowercase(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}
