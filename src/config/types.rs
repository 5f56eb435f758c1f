use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Crawl scheduling and concurrency configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Time between the end of one cycle and the start of the next, as a
    /// duration string such as "60m" or "1h30m"
    #[serde(default)]
    pub interval: Option<String>,

    /// Capacity of the channel between feed fetches and the dispatch loop
    #[serde(rename = "channel-capacity", default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Maximum number of outbound requests in flight at once
    #[serde(
        rename = "max-concurrent-fetches",
        default = "default_max_concurrent_fetches"
    )]
    pub max_concurrent_fetches: usize,

    /// Delay before fetching each feed entry's page (milliseconds)
    #[serde(rename = "entry-delay-ms", default = "default_entry_delay_ms")]
    pub entry_delay_ms: u64,

    /// Timeout applied to every HTTP request (seconds)
    #[serde(
        rename = "request-timeout-secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,
}

impl CrawlerConfig {
    /// Parsed cycle interval, falling back to 60 minutes when unset or malformed
    pub fn interval(&self) -> Duration {
        super::parser::parse_interval(self.interval.as_deref())
    }

    pub fn entry_delay(&self) -> Duration {
        Duration::from_millis(self.entry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            interval: None,
            channel_capacity: default_channel_capacity(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            entry_delay_ms: default_entry_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, url),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

/// Article store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_channel_capacity() -> usize {
    10
}

fn default_max_concurrent_fetches() -> usize {
    16
}

fn default_entry_delay_ms() -> u64 {
    5_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_crawler_name() -> String {
    "newsbot".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_database_path() -> String {
    "./newsbot.db".to_string()
}
