//! HTML parser for extracting anchor links
//!
//! Parsing is lenient: malformed markup yields whatever anchors the HTML5
//! parser recovers, and anchors without a usable `href` are skipped. A page
//! that cannot be understood simply contributes zero links.

use scraper::{Html, Selector};
use url::Url;

/// Trait for link extraction backends
pub trait LinkExtractor: Send + Sync {
    /// Returns the absolute URLs of the page's anchors, resolved against `base_url`
    fn extract_links(&self, html: &str, base_url: &Url) -> Vec<String>;
}

/// Anchor extractor built on `scraper`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, html: &str, base_url: &Url) -> Vec<String> {
        parse_html(html, base_url)
    }
}

/// Parses HTML content and returns its anchor links in document order
///
/// # Link Extraction Rules
///
/// **Include:**
/// - every `<a href="...">`, resolved against `base_url`
///
/// **Exclude:**
/// - empty and fragment-only hrefs (same page anchors)
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - hrefs that do not resolve to an HTTP(S) URL
///
/// # Example
///
/// ```
/// use path_mirror::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="a">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/cn/").unwrap();
/// let links = parse_html(html, &base_url);
/// assert_eq!(links, vec!["https://example.com/cn/a".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    extract_anchor_links(&document, base_url)
}

/// Extracts all valid anchor links from the HTML document
fn extract_anchor_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url.to_string())
    } else {
        None
    }
}
