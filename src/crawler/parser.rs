//! HTML parser for article pages
//!
//! This module handles parsing article HTML to extract:
//! - Meta tags with a given property prefix (e.g. `og:`)
//! - The article body text located by a CSS selector

use scraper::{Html, Selector};
use std::collections::HashMap;

/// Information extracted from an article page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticlePage {
    /// Meta properties with the prefix stripped, e.g. `image`, `description`
    pub meta: HashMap<String, String>,

    /// Text of the nodes matching the body selector, one paragraph per node
    pub body: String,
}

/// Parses an article page
///
/// The parsed document is not kept: `scraper::Html` cannot be held across
/// an await point, so everything needed later is copied out here.
///
/// # Example
///
/// ```
/// use newsbot_crawler::crawler::parse_article_page;
/// use scraper::Selector;
///
/// let html = r#"<html><head><meta property="og:image" content="https://example.com/a.jpg"></head>
///     <body><div class="story"><p>Hello.</p></div></body></html>"#;
/// let body = Selector::parse(".story p").unwrap();
/// let page = parse_article_page(html, "og:", &body);
/// assert_eq!(page.meta["image"], "https://example.com/a.jpg");
/// assert_eq!(page.body, "Hello.");
/// ```
pub fn parse_article_page(html: &str, meta_prefix: &str, body_selector: &Selector) -> ArticlePage {
    let document = Html::parse_document(html);

    ArticlePage {
        meta: extract_meta_tags(&document, meta_prefix),
        body: extract_body(&document, body_selector),
    }
}

/// Extracts `<meta property="{prefix}name" content="...">` tags
///
/// Names and values are trimmed; tags with an empty name or value are
/// ignored. When a property repeats, the last one wins.
pub fn extract_meta_tags(document: &Html, prefix: &str) -> HashMap<String, String> {
    let mut meta = HashMap::new();

    let Ok(selector) = Selector::parse("meta[property]") else {
        return meta;
    };

    for element in document.select(&selector) {
        let Some(property) = element.value().attr("property") else {
            continue;
        };
        let Some(name) = property.strip_prefix(prefix) else {
            continue;
        };

        let name = name.trim();
        let value = element.value().attr("content").unwrap_or("").trim();
        if !name.is_empty() && !value.is_empty() {
            meta.insert(name.to_string(), value.to_string());
        }
    }

    meta
}

/// Extracts the text of every node matching `selector`
///
/// Each node becomes one paragraph; paragraphs are separated by a blank line.
pub fn extract_body(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .map(|element| {
            element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|paragraph| !paragraph.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
        <head>
            <meta property="og:title" content="  Budget passes  ">
            <meta property="og:image" content="https://example.com/budget.jpg">
            <meta property="og:description" content="">
            <meta property="twitter:image" content="https://example.com/other.jpg">
            <meta name="description" content="Plain description">
        </head>
        <body>
            <div class="entry-content">
                <p>The budget passed
                   on Tuesday.</p>
                <p>   </p>
                <p>Debate lasted <b>ten</b> hours.</p>
            </div>
            <p>Footer text</p>
        </body>
        </html>
    "#;

    fn body_selector() -> Selector {
        Selector::parse(".entry-content p").unwrap()
    }

    #[test]
    fn test_extract_prefixed_meta_tags() {
        let page = parse_article_page(PAGE, "og:", &body_selector());

        assert_eq!(page.meta.get("title").map(String::as_str), Some("Budget passes"));
        assert_eq!(
            page.meta.get("image").map(String::as_str),
            Some("https://example.com/budget.jpg")
        );
        assert!(!page.meta.contains_key("description"));
        assert_eq!(page.meta.len(), 2);
    }

    #[test]
    fn test_extract_other_prefix() {
        let page = parse_article_page(PAGE, "twitter:", &body_selector());
        assert_eq!(
            page.meta.get("image").map(String::as_str),
            Some("https://example.com/other.jpg")
        );
    }

    #[test]
    fn test_extract_body_paragraphs() {
        let page = parse_article_page(PAGE, "og:", &body_selector());
        assert_eq!(
            page.body,
            "The budget passed on Tuesday.\n\nDebate lasted ten hours."
        );
    }

    #[test]
    fn test_body_selector_without_match() {
        let selector = Selector::parse(".missing p").unwrap();
        let page = parse_article_page(PAGE, "og:", &selector);
        assert!(page.body.is_empty());
    }
}
