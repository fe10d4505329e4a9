//! HTML extraction of page text and outgoing links
//!
//! This module turns a fetched body into:
//! - The visible text, whitespace-collapsed and lowercased
//! - Every anchor `href` value, verbatim and in document order
//!
//! Resolution and filtering of the hrefs happen later, in the worker.

use scraper::{Html, Selector};
use thiserror::Error;

/// Elements whose descendants never contribute visible text
const NON_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "head", "link", "meta", "title", "iframe", "svg", "canvas",
    "img", "video", "audio", "map", "area", "object", "embed", "source", "track", "template",
    "picture", "param",
];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    /// Visible text, lowercased, words separated by single spaces
    pub text: String,

    /// Raw `href` attribute values of all `<a>` elements
    pub links: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("response body is empty")]
    EmptyDocument,
}

/// Extracts text and links from a response body
pub trait Extractor: Send + Sync {
    fn extract(&self, body: &str) -> Result<PageContent, ExtractError>;
}

/// HTML5 extractor built on scraper
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for HtmlExtractor {
    /// Parses the body as HTML
    ///
    /// The parser recovers from any malformed markup, so the only failure is
    /// a body with nothing in it.
    ///
    /// # Example
    ///
    /// ```
    /// use site_sweep::crawler::{Extractor, HtmlExtractor};
    ///
    /// let html = r#"<html><head><title>T</title></head><body><p>Hello <b>World</b></p><a href="/next">Next</a></body></html>"#;
    /// let page = HtmlExtractor::new().extract(html).unwrap();
    /// assert_eq!(page.text, "hello world next");
    /// assert_eq!(page.links, vec!["/next".to_string()]);
    /// ```
    fn extract(&self, body: &str) -> Result<PageContent, ExtractError> {
        if body.trim().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }

        let document = Html::parse_document(body);

        Ok(PageContent {
            text: extract_text(&document),
            links: extract_links(&document),
        })
    }
}

fn extract_text(document: &Html) -> String {
    let mut text = String::new();

    for node in document.root_element().descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| NON_TEXT_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        for word in fragment.split_whitespace() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&word.to_lowercase());
        }
    }

    text
}

fn extract_links(document: &Html) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                links.push(href.to_string());
            }
        }
    }

    links
}
