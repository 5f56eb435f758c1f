//! News sources and their feed links
//!
//! A [`Source`] is a named content origin with a fixed list of feed
//! [`Link`]s. The crawler asks it to fetch each link and later hands every
//! fetched document back to it as a [`CrawlResponse`] for processing.

mod feed;
mod roster;

pub use feed::FeedSource;
pub use roster::{
    bbc, citinewsroom, default_roster, ghanaweb, modernghana, myjoyonline, pulse, AFRICA,
    BUSINESS, ENTERTAINMENT, LIFESTYLE, POLITICS, SPORTS, TECH, TOP_STORIES, WORLD,
};

use crate::crawler::{Cycle, WorkUnit};
use crate::Result;
use async_trait::async_trait;
use feed_rs::model::Feed;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A feed URL tagged with the category its articles are filed under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    pub category: String,
    pub url: String,
}

impl Link {
    pub fn new(category: &str, url: &str) -> Self {
        Self {
            category: category.to_string(),
            url: url.to_string(),
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.url)
    }
}

/// Page extraction options of a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    /// Prefer the page's meta description over the feed description; an
    /// entry whose page has none is skipped
    pub use_meta_desc: bool,

    /// CSS selector locating the article body paragraphs
    pub body_selector: String,

    /// Property prefix of the page meta tags
    pub meta_prefix: String,
}

impl SourceOptions {
    pub fn new(use_meta_desc: bool, body_selector: &str) -> Self {
        Self {
            use_meta_desc,
            body_selector: body_selector.to_string(),
            ..Self::default()
        }
    }

    /// Builds options from a loosely typed option map
    ///
    /// Recognized keys are `UseMetaDesc` (bool) and `BodySelector` (string).
    /// Unknown keys and values of the wrong type are ignored.
    pub fn from_map(map: &HashMap<String, Value>) -> Self {
        let mut options = Self::default();

        if let Some(use_meta_desc) = map.get("UseMetaDesc").and_then(Value::as_bool) {
            options.use_meta_desc = use_meta_desc;
        }
        if let Some(selector) = map.get("BodySelector").and_then(Value::as_str) {
            options.body_selector = selector.to_string();
        }

        options
    }
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            use_meta_desc: false,
            body_selector: "p".to_string(),
            meta_prefix: "og:".to_string(),
        }
    }
}

/// A fetched feed document waiting to be processed by its source
///
/// The response carries the work unit that keeps its cycle open; the unit is
/// released when the response is dropped.
pub struct CrawlResponse {
    pub source: Arc<dyn Source>,
    pub link: Link,
    pub feed: Feed,
    pub cycle: Arc<Cycle>,
    pub(crate) unit: WorkUnit,
}

impl fmt::Debug for CrawlResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlResponse")
            .field("source", &self.source.name())
            .field("link", &self.link)
            .field("entries", &self.feed.entries.len())
            .field("cycle", &self.cycle.number())
            .field("unit", &self.unit)
            .finish()
    }
}

/// A content origin the crawler can harvest
#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &str;

    fn domain(&self) -> &str;

    fn links(&self) -> &[Link];

    /// Page extraction options, for sources that have them
    fn options(&self) -> Option<&SourceOptions> {
        None
    }

    /// Retrieves and parses the feed document behind `link`
    async fn fetch(&self, cycle: &Cycle, link: &Link) -> Result<Feed>;

    /// Harvests the entries of a fetched feed document into the store
    async fn process(&self, response: CrawlResponse) -> Result<()>;
}
