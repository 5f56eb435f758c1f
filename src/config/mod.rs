//! Configuration module for the crawler
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file and the environment overrides layered on top of it.
//!
//! # Example
//!
//! ```no_run
//! use newsbot_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("newsbot.toml")).unwrap();
//! println!("Next cycle after: {:?}", config.crawler.interval());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, StorageConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, apply_overrides_from, compute_config_hash, default_config, load_config,
    load_config_with_hash, parse_duration, parse_interval, DEFAULT_INTERVAL,
};
