//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for feed documents and article pages
//! - Feed parsing (RSS and Atom)
//! - Error classification

use crate::config::UserAgentConfig;
use crate::CrawlError;
use feed_rs::model::Feed;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use newsbot_crawler::config::UserAgentConfig;
/// use newsbot_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body as text
///
/// Any non-success status is an error; redirects are followed by the client.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, CrawlError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| classify_error(url, e))
}

/// Fetches and parses the syndication document at `url`
pub async fn fetch_feed(client: &Client, url: &str) -> Result<Feed, CrawlError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|e| classify_error(url, e))?;
    parse_feed(&body, url)
}

/// Parses an RSS or Atom document
pub fn parse_feed(body: &[u8], url: &str) -> Result<Feed, CrawlError> {
    feed_rs::parser::parse(body).map_err(|e| CrawlError::FeedParse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn classify_error(url: &str, error: reqwest::Error) -> CrawlError {
    if error.is_timeout() {
        CrawlError::Timeout {
            url: url.to_string(),
        }
    } else {
        CrawlError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Example News</title>
    <link>https://example.com/</link>
    <description>Latest</description>
    <item>
      <title>First story</title>
      <link>https://example.com/first</link>
      <guid>https://example.com/?p=1</guid>
      <description>Feed description</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_parse_rss_feed() {
        let feed = parse_feed(RSS.as_bytes(), "https://example.com/feed").unwrap();
        assert_eq!(feed.entries.len(), 1);

        let entry = &feed.entries[0];
        assert_eq!(entry.id, "https://example.com/?p=1");
        assert_eq!(entry.links[0].href, "https://example.com/first");
        assert_eq!(
            entry.summary.as_ref().map(|s| s.content.as_str()),
            Some("Feed description")
        );
    }

    #[test]
    fn test_parse_invalid_feed() {
        let result = parse_feed(b"<html>not a feed</html>", "https://example.com/feed");
        assert!(matches!(result, Err(CrawlError::FeedParse { .. })));
    }
}
