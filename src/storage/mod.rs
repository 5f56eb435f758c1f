//! Storage module for persisting harvested articles
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Article upserts keyed by feed GUID
//! - Topic lookup-or-create for article categories

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{ArticleStore, StorageError, StorageResult};

use crate::analysis::Assessment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A harvested news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Stable identifier, taken from the feed entry GUID
    pub id: String,
    pub title: String,
    pub description: String,
    pub summary: Vec<String>,
    pub link: String,
    pub domain: String,
    /// Id of the topic the originating feed link belongs to
    pub topic_id: Option<String>,
    pub author: Option<String>,
    pub image: String,
    pub tags: Vec<String>,
    pub assessment: Option<Assessment>,
    pub score: f64,
    pub published: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Article {
    /// Creates a new article with empty summary, no topic and no assessment
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: &str,
        guid: &str,
        description: &str,
        link: &str,
        domain: &str,
        image: &str,
        published: Option<DateTime<Utc>>,
        tags: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: guid.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            summary: Vec::new(),
            link: link.to_string(),
            domain: domain.to_string(),
            topic_id: None,
            author: None,
            image: image.to_string(),
            tags,
            assessment: None,
            score: 0.0,
            published,
            created: now,
            updated: now,
        }
    }

    pub fn set_topic(&mut self, topic: &Topic) {
        self.topic_id = Some(topic.id.clone());
    }
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// A category articles are filed under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Lower-cased name
    pub id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub created: DateTime<Utc>,
}

impl Topic {
    pub fn new(name: &str) -> Self {
        Self {
            id: topic_id(name),
            name: name.to_string(),
            tags: Vec::new(),
            created: Utc::now(),
        }
    }
}

/// Topic ids are the lower-cased topic name
pub fn topic_id(name: &str) -> String {
    name.trim().to_lowercase()
}
