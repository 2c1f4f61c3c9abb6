//! HTML parser for extracting anchors and metadata
//!
//! This module handles parsing HTML content to extract:
//! - Every `<a>` element, with or without an `href`
//! - Page title

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// Maximum number of characters kept from the inner text of an `<a>` without `href`
pub const INNER_TEXT_LIMIT: usize = 50;

/// One `<a>` element found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorTag {
    /// Raw `href` attribute value (empty when absent)
    pub href: String,

    /// Whether the element carried an `href` attribute at all
    pub href_present: bool,

    /// Trimmed, truncated inner text; only filled when `href` is absent
    pub inner_text: String,

    /// URL of the page the element was found on
    pub found_on: String,
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All anchors found on the page, in document order
    pub anchors: Vec<AnchorTag>,
}

/// Parses HTML content and extracts anchors and metadata
///
/// Unlike link extraction for a frontier, nothing is filtered here: the
/// classifier decides what each href means, and `<a>` elements without an
/// `href` are returned so they can be reported.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `found_on` - URL of the page, stamped on every anchor
///
/// # Example
///
/// ```
/// use sitewalk::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html, "https://example.com/");
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.anchors[0].href, "/page");
/// ```
pub fn parse_html(html: &str, found_on: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        anchors: extract_anchors(&document, found_on),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts every `<a>` element from the HTML document
fn extract_anchors(document: &Html, found_on: &str) -> Vec<AnchorTag> {
    let Ok(a_selector) = Selector::parse("a") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .map(|element| match element.value().attr("href") {
            Some(href) => AnchorTag {
                href: href.to_string(),
                href_present: true,
                inner_text: String::new(),
                found_on: found_on.to_string(),
            },
            None => AnchorTag {
                href: String::new(),
                href_present: false,
                inner_text: truncate_text(&element.text().collect::<String>()),
                found_on: found_on.to_string(),
            },
        })
        .collect()
}

/// Collapses whitespace and cuts the text to [`INNER_TEXT_LIMIT`] characters
fn truncate_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > INNER_TEXT_LIMIT {
        let cut: String = collapsed.chars().take(INNER_TEXT_LIMIT).collect();
        format!("{}...", cut)
    } else {
        collapsed
    }
}
