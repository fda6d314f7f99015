//! HTML parser for discovering category and question links
//!
//! A link qualifies when its `href` contains one of the configured path
//! markers. Matching is a plain substring test, and qualifying hrefs are made
//! absolute with [`absolutize`].

use crate::url::absolutize;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Parses a fetched body into an immutable document
pub fn parse_html(body: &str) -> Html {
    Html::parse_document(body)
}

/// Extracts every anchor target containing `marker`
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `marker` - Substring an href must contain to qualify
/// * `site_base` - Prefix used to make relative hrefs absolute
///
/// # Returns
///
/// The deduplicated set of absolute targets. Iteration order of the set
/// is unspecified.
///
/// # Example
///
/// ```
/// use faq_harvester::crawler::{extract_links, parse_html};
///
/// let html = r#"<a href="/faq/show/1">Q1</a><a href="/faq/show/1">again</a><a href="/about">About</a>"#;
/// let links = extract_links(&parse_html(html), "/faq/show/", "https://example.com");
/// assert_eq!(links.len(), 1);
/// assert!(links.contains("https://example.com/faq/show/1"));
/// ```
pub fn extract_links(document: &Html, marker: &str, site_base: &str) -> HashSet<String> {
    let mut links = HashSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if href.contains(marker) {
                    links.insert(absolutize(href, site_base));
                }
            }
        }
    }

    links
}

/// Convenience function for extracting marker links from raw HTML
pub fn extract_links_simple(html: &str, marker: &str, site_base: &str) -> HashSet<String> {
    extract_links(&parse_html(html), marker, site_base)
}
