//! Crawler module for feed harvesting
//!
//! This module contains the core crawling logic, including:
//! - Cycle orchestration and the dispatch loop
//! - Completion tracking across dynamically spawned tasks
//! - HTTP fetching of feeds and article pages
//! - Article page parsing

mod cycle;
mod fetcher;
mod orchestrator;
mod parser;
mod tracker;

pub use cycle::{Cycle, CycleReport, Services};
pub use fetcher::{build_http_client, fetch_feed, fetch_text, parse_feed};
pub use orchestrator::Crawler;
pub use parser::{extract_body, extract_meta_tags, parse_article_page, ArticlePage};
pub use tracker::{CompletionTracker, WorkUnit};
