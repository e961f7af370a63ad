//! HTML parsing: link extraction, metadata, and clean-text content
//!
//! This module turns raw HTML into the pieces a page record needs:
//! - Links to follow (absolute, HTTP(S)-only)
//! - Title and meta description
//! - Element counts for the response metadata
//! - Clean text with markup, scripts, and styles stripped

use crate::state::ElementCounts;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Meta description, falling back to og:description
    pub description: Option<String>,

    /// All followable links on the page (absolute URLs, document order)
    pub links: Vec<Url>,

    /// Counts of notable element types
    pub elements: ElementCounts,
}

/// Parses HTML content and extracts links, metadata, and element counts
///
/// # Link Extraction Rules
///
/// **Include:** `<a href="...">` tags resolved against `base_url`.
///
/// **Exclude:** `javascript:`, `mailto:`, `tel:` and `data:` links,
/// fragment-only anchors, links with the `download` attribute, and
/// anything that is not HTTP(S) after resolution.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The page's final URL, for resolving relative links
pub fn parse_page(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        description: extract_description(&document),
        links: extract_links(&document, base_url),
        elements: count_elements(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts the meta description, preferring `name=description` over
/// `property=og:description`
fn extract_description(document: &Html) -> Option<String> {
    for selector_str in [
        "meta[name='description']",
        "meta[property='og:description']",
    ] {
        if let Ok(selector) = Selector::parse(selector_str) {
            let found = document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("content"))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            if found.is_some() {
                return found;
            }
        }
    }
    None
}

/// Extracts all followable links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(url) = resolve_link(href, base_url) {
                    links.push(url);
                }
            }
        }
    }

    links
}

/// Counts notable element types across the document
fn count_elements(document: &Html) -> ElementCounts {
    let count = |pattern: &str| {
        Selector::parse(pattern)
            .map(|sel| document.select(&sel).count())
            .unwrap_or(0)
    };

    ElementCounts {
        links: count("a"),
        images: count("img"),
        forms: count("form"),
        scripts: count("script"),
        total: count("*"),
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only anchors
/// - Invalid or non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        _ => None,
    }
}

/// Extracts clean text content from an HTML document
///
/// Scripts, styles, and markup are stripped; whitespace runs collapse to
/// single spaces; block-level elements produce line breaks. Pure function,
/// no I/O.
pub fn extract_clean_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let root = Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element());

    let mut out = String::new();
    collect_text(root, &mut out);

    out.trim().to_string()
}

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "table", "tr",
    "section", "article", "header", "footer", "blockquote", "pre",
];

fn collect_text(element: ElementRef, out: &mut String) {
    let name = element.value().name();

    if SKIPPED_ELEMENTS.contains(&name) {
        return;
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            push_words(out, text);
        }
    }

    if BLOCK_ELEMENTS.contains(&name) && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Appends words from a text chunk, collapsing whitespace
fn push_words(out: &mut String, chunk: &str) {
    for word in chunk.split_whitespace() {
        if !out.is_empty() && !out.ends_with(char::is_whitespace) {
            out.push(' ');
        }
        out.push_str(word);
    }
}

/// Clean-text extraction seam
///
/// The orchestrator only needs this one operation; swapping in a heavier
/// article extractor is a matter of implementing the trait.
pub trait ContentExtractor: Send + Sync {
    fn extract_clean_text(&self, html: &str) -> String;
}

/// Default extractor backed by [`extract_clean_text`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl ContentExtractor for PlainTextExtractor {
    fn extract_clean_text(&self, html: &str) -> String {
        extract_clean_text(html)
    }
}
