//! Post-run statistics over accepted jobs.

use std::fmt;

use jobcrawl_shared::{Job, NOT_AVAILABLE};

/// Locations listed in the summary.
const TOP_LOCATIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    /// Descending by count; ties keep first appearance.
    pub by_category: Vec<(String, usize)>,
    pub by_query: Vec<(String, usize)>,
    /// Most common known locations, at most ten.
    pub top_locations: Vec<(String, usize)>,
    /// Jobs that list a salary.
    pub with_salary: usize,
}

impl RunSummary {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let mut top_locations = tally(
            jobs.iter()
                .map(|j| j.location.as_str())
                .filter(|loc| *loc != NOT_AVAILABLE && !loc.is_empty()),
        );
        top_locations.truncate(TOP_LOCATIONS);

        Self {
            total: jobs.len(),
            by_category: tally(jobs.iter().map(|j| j.category.as_deref().unwrap_or(""))),
            by_query: tally(jobs.iter().map(|j| j.search_query.as_str())),
            top_locations,
            with_salary: jobs.iter().filter(|j| j.has_salary()).count(),
        }
    }
}

fn tally<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total jobs kept: {}", self.total)?;

        writeln!(f, "\nBy category:")?;
        for (label, n) in &self.by_category {
            writeln!(f, "  {label}: {n}")?;
        }

        writeln!(f, "\nBy search query:")?;
        for (query, n) in &self.by_query {
            writeln!(f, "  {query}: {n}")?;
        }

        if !self.top_locations.is_empty() {
            writeln!(f, "\nTop locations:")?;
            for (location, n) in &self.top_locations {
                writeln!(f, "  {location}: {n}")?;
            }
        }

        write!(f, "\nJobs with salary info: {}/{}", self.with_salary, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobcrawl_shared::ParsedCard;

    fn job(query: &str, category: &str, location: &str, salary: &str) -> Job {
        let card = ParsedCard {
            title: "Seller Ops".into(),
            location: location.into(),
            salary: salary.into(),
            ..ParsedCard::default()
        };
        let mut job = Job::from_card(card, "https://www.indeed.com/viewjob?jk=1".into(), query);
        job.category = Some(category.into());
        job
    }

    #[test]
    fn counts_sorted_with_stable_ties() {
        let jobs = vec![
            job("q1", "Related Roles", "Remote", NOT_AVAILABLE),
            job("q2", "Leadership Roles", "Austin, TX", "$90,000"),
            job("q2", "Leadership Roles", "Remote", NOT_AVAILABLE),
            job("q1", "Marketplace General", NOT_AVAILABLE, "$20 an hour"),
        ];

        let summary = RunSummary::from_jobs(&jobs);
        assert_eq!(summary.total, 4);
        assert_eq!(
            summary.by_category,
            vec![
                ("Leadership Roles".to_string(), 2),
                ("Related Roles".to_string(), 1),
                ("Marketplace General".to_string(), 1),
            ]
        );
        assert_eq!(
            summary.by_query,
            vec![("q1".to_string(), 2), ("q2".to_string(), 2)]
        );
        assert_eq!(
            summary.top_locations,
            vec![("Remote".to_string(), 2), ("Austin, TX".to_string(), 1)]
        );
        assert_eq!(summary.with_salary, 2);
    }

    #[test]
    fn display_lists_sections() {
        let summary = RunSummary::from_jobs(&[job("q", "Related Roles", "Remote", NOT_AVAILABLE)]);
        let text = summary.to_string();
        assert!(text.starts_with("Total jobs kept: 1"));
        assert!(text.contains("  Related Roles: 1"));
        assert!(text.ends_with("Jobs with salary info: 0/1"));
    }
}
