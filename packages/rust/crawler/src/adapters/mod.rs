//! Results-page extraction.
//!
//! An extractor turns one results page into [`ParsedCard`]s and says whether
//! the page offers a next page. Extraction never fails: fields the markup
//! lacks fall back to their sentinels.

mod indeed;

use jobcrawl_shared::ParsedCard;
use scraper::{ElementRef, Selector};

pub use indeed::IndeedExtractor;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Parses job cards out of a results page.
pub trait CardExtractor: Send + Sync {
    /// All cards on the page, in page order.
    fn extract_cards(&self, markup: &str) -> Vec<ParsedCard>;

    /// Whether the page links to a further results page.
    fn has_next_page(&self, markup: &str) -> bool;

    /// Human-readable extractor name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a built-in selector.
///
/// # Panics
///
/// Panics if `selector` is not valid CSS. Only call this with string literals.
pub(crate) fn css(selector: &'static str) -> Selector {
    Selector::parse(selector)
        .unwrap_or_else(|e| panic!("built-in selector `{selector}` is invalid: {e}"))
}

/// Text content of `el` with runs of whitespace collapsed to one space.
pub(crate) fn collapsed_text(el: ElementRef<'_>) -> String {
    let joined = el.text().collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapsed text of the first descendant matching any of `selectors`,
/// skipping matches whose text is blank.
pub(crate) fn first_text(el: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .filter_map(|sel| el.select(sel).next())
        .map(collapsed_text)
        .find(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn collapsed_text_normalizes_whitespace() {
        let doc = Html::parse_fragment("<div>  Senior\n\t<b>Seller</b>   Manager </div>");
        let div = doc.select(&css("div")).next().unwrap();
        assert_eq!(collapsed_text(div), "Senior Seller Manager");
    }

    #[test]
    fn first_text_tries_selectors_in_order() {
        let doc = Html::parse_fragment(
            r#"<div><span class="a">  </span><span class="b">Acme</span></div>"#,
        );
        let div = doc.select(&css("div")).next().unwrap();
        assert_eq!(
            first_text(div, &[css("span.a"), css("span.b")]).as_deref(),
            Some("Acme")
        );
        assert_eq!(first_text(div, &[css("span.c")]), None);
    }
}
