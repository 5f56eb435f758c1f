//! Newsbot crawler: a periodic news feed harvester
//!
//! This crate fetches syndicated feeds from a fixed roster of news sources,
//! follows every entry to its article page, extracts an image, description,
//! body text and readability metrics, and upserts the result into an article
//! store. Cycles repeat on a fixed interval and never overlap.

pub mod analysis;
pub mod config;
pub mod crawler;
pub mod source;
pub mod storage;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Feed parse error for {url}: {message}")]
    FeedParse { url: String, message: String },

    #[error("Invalid body selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("The dispatch loop is already running")]
    AlreadyListening,

    #[error("The scheduling loop is already running")]
    AlreadyScheduled,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, CycleReport};
pub use source::{CrawlResponse, FeedSource, Link, Source, SourceOptions};
pub use storage::{Article, ArticleStore, SqliteStore};
