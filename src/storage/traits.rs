//! Storage traits and error types
//!
//! This module defines the trait interface for article store backends and
//! associated error types.

use crate::storage::{Article, Topic};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for article store implementations
///
/// The crawler only relies on these semantics; it never touches the schema.
/// Implementations are shared between every processing task of a cycle and
/// must provide their own interior synchronization.
pub trait ArticleStore: Send + Sync {
    /// Returns true if an article with this id has been stored before
    fn article_exists(&self, id: &str) -> StorageResult<bool>;

    /// Gets an article by id
    fn get_article(&self, id: &str) -> StorageResult<Option<Article>>;

    /// Inserts a new article or refreshes the stored one
    ///
    /// Content fields, tags, summary and assessment are overwritten and the
    /// update timestamp is bumped. The creation timestamp and the
    /// accumulated score of an existing article are kept.
    ///
    /// Returns true if the article was not stored before. The check and the
    /// write happen atomically, so concurrent upserts of one id report a
    /// single insert.
    fn upsert_article(&self, article: &Article) -> StorageResult<bool>;

    /// Looks up a topic by name (case-insensitive), creating it if missing
    fn get_or_create_topic(&self, name: &str) -> StorageResult<Topic>;

    /// Gets total article count
    fn count_articles(&self) -> StorageResult<u64>;

    /// Gets article counts per topic name, sorted by name
    fn count_articles_by_topic(&self) -> StorageResult<Vec<(String, u64)>>;
}
