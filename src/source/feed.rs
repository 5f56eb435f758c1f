//! Feed-backed source
//!
//! [`FeedSource`] fetches RSS or Atom documents and follows every entry to
//! its article page. An entry becomes an article only if its page has a meta
//! image, a description (from the page when `use_meta_desc` is set, from the
//! feed otherwise) and a non-empty body. Entries missing any of these are
//! skipped without error.

use crate::crawler::{fetch_feed, fetch_text, parse_article_page, Cycle};
use crate::source::{CrawlResponse, Link, Source, SourceOptions};
use crate::storage::Article;
use crate::{CrawlError, Result};
use async_trait::async_trait;
use feed_rs::model::{Entry, Feed};
use scraper::Selector;
use std::fmt;

/// A source harvested through syndication feeds
pub struct FeedSource {
    name: String,
    domain: String,
    links: Vec<Link>,
    options: SourceOptions,
    body_selector: Selector,
}

impl FeedSource {
    /// Creates a feed source
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::InvalidSelector` if the body selector does not parse.
    pub fn new(name: &str, domain: &str, links: Vec<Link>, options: SourceOptions) -> Result<Self> {
        let body_selector =
            Selector::parse(&options.body_selector).map_err(|e| CrawlError::InvalidSelector {
                selector: options.body_selector.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            name: name.to_string(),
            domain: domain.to_string(),
            links,
            options,
            body_selector,
        })
    }

    /// Turns one feed entry into a stored article
    ///
    /// Returns `Ok(false)` when the entry was skipped.
    async fn harvest_entry(&self, cycle: &Cycle, link: &Link, entry: &Entry) -> Result<bool> {
        let Some(url) = entry_link(entry) else {
            tracing::debug!("Entry {} has no link", entry.id);
            return Ok(false);
        };

        let html = {
            let Some(_slot) = cycle.acquire_slot().await else {
                return Ok(false);
            };
            match fetch_text(cycle.client(), &url).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::debug!("{}", e);
                    return Ok(false);
                }
            }
        };

        let page = parse_article_page(&html, &self.options.meta_prefix, &self.body_selector);

        let Some(image) = page.meta.get("image") else {
            tracing::debug!("Image not found: {:?}", page.meta);
            return Ok(false);
        };

        let description = if self.options.use_meta_desc {
            match page.meta.get("description") {
                Some(description) => description.clone(),
                None => {
                    tracing::debug!("Description not found: {:?}", page.meta);
                    return Ok(false);
                }
            }
        } else {
            feed_description(entry)
        };

        if page.body.is_empty() {
            tracing::debug!("Empty body at {}", url);
            return Ok(false);
        }

        let guid = entry.id.trim();
        if guid.is_empty() {
            tracing::debug!("Entry at {} has no GUID", url);
            return Ok(false);
        }

        let analysis = cycle.analyzer().analyze(&page.body, &description);

        let title = entry
            .title
            .as_ref()
            .map(|title| title.content.trim().to_string())
            .unwrap_or_default();

        let mut article = Article::new(
            &title,
            guid,
            &description,
            &url,
            &self.domain,
            image,
            entry.published.or(entry.updated),
            analysis.tags,
        );
        let store = cycle.store();
        let topic = store.get_or_create_topic(&link.category)?;
        article.set_topic(&topic);
        article.author = entry.authors.first().map(|author| author.name.clone());
        article.summary = analysis.summary;
        article.assessment = Some(analysis.assessment);

        // the store reports whether the GUID was new, atomically with the write
        if store.upsert_article(&article)? {
            cycle.record_discovery();
        }

        Ok(true)
    }
}

/// The entry's own description, as the feed carries it
fn feed_description(entry: &Entry) -> String {
    entry
        .summary
        .as_ref()
        .map(|summary| summary.content.clone())
        .unwrap_or_default()
}

/// The page an entry points to: its first link, else an http(s) id
fn entry_link(entry: &Entry) -> Option<String> {
    entry
        .links
        .iter()
        .filter(|link| link.rel.as_deref().map_or(true, |rel| rel == "alternate"))
        .map(|link| link.href.trim())
        .find(|href| !href.is_empty())
        .or_else(|| {
            let id = entry.id.trim();
            (id.starts_with("http://") || id.starts_with("https://")).then_some(id)
        })
        .map(str::to_string)
}

#[async_trait]
impl Source for FeedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> &str {
        &self.domain
    }

    fn links(&self) -> &[Link] {
        &self.links
    }

    fn options(&self) -> Option<&SourceOptions> {
        Some(&self.options)
    }

    async fn fetch(&self, cycle: &Cycle, link: &Link) -> Result<Feed> {
        fetch_feed(cycle.client(), &link.url).await
    }

    async fn process(&self, response: CrawlResponse) -> Result<()> {
        let cycle = &response.cycle;
        tracing::info!(
            "Found {} items at {}",
            response.feed.entries.len(),
            response.link.url
        );

        let mut saved = 0;
        for entry in &response.feed.entries {
            // spread page requests out to avoid bursts against the origin
            let delay = cycle.entry_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            if self.harvest_entry(cycle, &response.link, entry).await? {
                saved += 1;
            }
        }

        tracing::debug!("Saved {} articles from {}", saved, response.link);
        Ok(())
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedSource")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("links", &self.links)
            .field("options", &self.options)
            .finish()
    }
}
