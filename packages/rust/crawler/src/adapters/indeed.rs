//! Extractor for Indeed-style results pages.

use scraper::{Html, Selector};
use tracing::debug;

use jobcrawl_shared::{ParsedCard, or_not_available};

use super::{CardExtractor, collapsed_text, css, first_text};
use crate::site::NEXT_PAGE_SELECTOR;

/// Reads `job_seen_beacon` cards, or the older `resultContent` table cells
/// when a page has none.
pub struct IndeedExtractor {
    card: Selector,
    card_fallback: Selector,
    title: Selector,
    link: Selector,
    company: [Selector; 2],
    location: [Selector; 2],
    salary: [Selector; 2],
    snippet: Selector,
    date: Selector,
    next_page: Selector,
}

impl IndeedExtractor {
    pub fn new() -> Self {
        Self {
            card: css("div.job_seen_beacon"),
            card_fallback: css("td.resultContent"),
            title: css("h2.jobTitle"),
            link: css("a[href]"),
            company: [
                css(r#"span[data-testid="company-name"]"#),
                css("span.companyName"),
            ],
            location: [
                css(r#"div[data-testid="text-location"]"#),
                css("div.companyLocation"),
            ],
            salary: [
                css("div.salary-snippet-container"),
                css(r#"div[data-testid="attribute_snippet_testid"]"#),
            ],
            snippet: css("div.job-snippet"),
            date: css("span.date"),
            next_page: css(NEXT_PAGE_SELECTOR),
        }
    }

    fn parse_card(&self, el: scraper::ElementRef<'_>) -> ParsedCard {
        let title = el
            .select(&self.title)
            .next()
            .map(collapsed_text)
            .unwrap_or_default();

        let raw_url = el
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| href.trim().to_string())
            .unwrap_or_default();

        let snippet = el
            .select(&self.snippet)
            .next()
            .map(collapsed_text)
            .unwrap_or_default();

        let posted_date = el.select(&self.date).next().map(|d| {
            collapsed_text(d)
                .replace("Posted", "")
                .trim()
                .to_string()
        });

        ParsedCard {
            title,
            company: or_not_available(first_text(el, &self.company)),
            location: or_not_available(first_text(el, &self.location)),
            salary: or_not_available(first_text(el, &self.salary)),
            raw_url,
            snippet,
            posted_date: or_not_available(posted_date),
        }
    }
}

impl Default for IndeedExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CardExtractor for IndeedExtractor {
    fn extract_cards(&self, markup: &str) -> Vec<ParsedCard> {
        let doc = Html::parse_document(markup);

        let mut cards: Vec<ParsedCard> = doc
            .select(&self.card)
            .map(|el| self.parse_card(el))
            .collect();

        if cards.is_empty() {
            cards = doc
                .select(&self.card_fallback)
                .map(|el| self.parse_card(el))
                .collect();
        }

        debug!(cards = cards.len(), extractor = self.name(), "extracted cards");
        cards
    }

    fn has_next_page(&self, markup: &str) -> bool {
        Html::parse_document(markup)
            .select(&self.next_page)
            .next()
            .is_some()
    }

    fn name(&self) -> &str {
        "indeed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobcrawl_shared::NOT_AVAILABLE;

    const PAGE: &str = r#"<html><body>
      <div id="mosaic-provider-jobcards">
        <div class="job_seen_beacon">
          <h2 class="jobTitle"><a href="/rc/clk?jk=3f2a9c&amp;from=serp"><span title="Amazon Marketplace Manager">Amazon Marketplace
             Manager</span></a></h2>
          <span data-testid="company-name">Brandly Inc</span>
          <div data-testid="text-location">Remote</div>
          <div class="salary-snippet-container">$70,000 - $90,000 a year</div>
          <div class="job-snippet"><ul><li>Own our seller account.</li><li>Grow marketplace sales.</li></ul></div>
          <span class="date">Posted 3 days ago</span>
        </div>
        <div class="job_seen_beacon">
          <h2 class="jobTitle"><a href="https://www.indeed.com/viewjob?jk=77aa">Ecommerce Analyst</a></h2>
        </div>
      </div>
      <nav><a data-testid="pagination-page-next" href="/jobs?q=x&amp;start=10">Next</a></nav>
    </body></html>"#;

    const LEGACY_PAGE: &str = r#"<html><body><table><tr>
        <td class="resultContent">
          <h2 class="jobTitle"><a href="/viewjob?jk=01">Seller Support Lead</a></h2>
          <span class="companyName">Acme</span>
          <div class="companyLocation">Austin, TX</div>
        </td>
    </tr></table></body></html>"#;

    #[test]
    fn extracts_all_fields() {
        let cards = IndeedExtractor::new().extract_cards(PAGE);
        assert_eq!(cards.len(), 2);

        let first = &cards[0];
        assert_eq!(first.title, "Amazon Marketplace Manager");
        assert_eq!(first.raw_url, "/rc/clk?jk=3f2a9c&from=serp");
        assert_eq!(first.company, "Brandly Inc");
        assert_eq!(first.location, "Remote");
        assert_eq!(first.salary, "$70,000 - $90,000 a year");
        assert_eq!(first.snippet, "Own our seller account. Grow marketplace sales.");
        assert_eq!(first.posted_date, "3 days ago");
    }

    #[test]
    fn missing_fields_use_sentinels() {
        let cards = IndeedExtractor::new().extract_cards(PAGE);
        let second = &cards[1];
        assert_eq!(second.title, "Ecommerce Analyst");
        assert_eq!(second.company, NOT_AVAILABLE);
        assert_eq!(second.location, NOT_AVAILABLE);
        assert_eq!(second.salary, NOT_AVAILABLE);
        assert_eq!(second.posted_date, NOT_AVAILABLE);
        assert!(second.snippet.is_empty());
    }

    #[test]
    fn falls_back_to_result_content_cells() {
        let cards = IndeedExtractor::new().extract_cards(LEGACY_PAGE);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].company, "Acme");
        assert_eq!(cards[0].location, "Austin, TX");
        assert_eq!(cards[0].raw_url, "/viewjob?jk=01");
    }

    #[test]
    fn detects_next_page() {
        let extractor = IndeedExtractor::new();
        assert!(extractor.has_next_page(PAGE));
        assert!(!extractor.has_next_page(LEGACY_PAGE));
    }

    #[test]
    fn empty_page_has_no_cards() {
        let extractor = IndeedExtractor::new();
        assert!(extractor.extract_cards("<html><body></body></html>").is_empty());
    }
}
