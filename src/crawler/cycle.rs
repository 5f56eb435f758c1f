//! Per-cycle crawl context
//!
//! A fresh [`Cycle`] is created by every `Crawler::run` and handed to every
//! task of that cycle. It owns the discovery counter and the completion
//! tracker, so starting a new cycle is what resets them.

use crate::analysis::Analyzer;
use crate::crawler::tracker::{CompletionTracker, WorkUnit};
use crate::source::CrawlResponse;
use crate::storage::ArticleStore;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore, SemaphorePermit};

/// Handles shared by every cycle of a crawler
pub struct Services {
    pub client: Client,
    pub store: Arc<dyn ArticleStore>,
    pub analyzer: Arc<dyn Analyzer>,
    /// Bounds the number of outbound requests in flight
    pub pool: Semaphore,
    /// Delay before each feed entry's page is fetched
    pub entry_delay: Duration,
}

impl Services {
    pub fn new(
        client: Client,
        store: Arc<dyn ArticleStore>,
        analyzer: Arc<dyn Analyzer>,
        max_concurrent_fetches: usize,
        entry_delay: Duration,
    ) -> Self {
        Self {
            client,
            store,
            analyzer,
            pool: Semaphore::new(max_concurrent_fetches.max(1)),
            entry_delay,
        }
    }
}

/// Context of one crawl cycle
pub struct Cycle {
    number: u64,
    started: Instant,
    discovered: AtomicU64,
    tracker: CompletionTracker,
    responses: mpsc::Sender<CrawlResponse>,
    services: Arc<Services>,
}

impl Cycle {
    pub(crate) fn new(
        number: u64,
        services: Arc<Services>,
        responses: mpsc::Sender<CrawlResponse>,
    ) -> Self {
        Self {
            number,
            started: Instant::now(),
            discovered: AtomicU64::new(0),
            tracker: CompletionTracker::new(),
            responses,
            services,
        }
    }

    /// Sequence number of this cycle, starting at 1
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Counts one feed item that was not in the store yet
    pub fn record_discovery(&self) {
        self.discovered.fetch_add(1, Ordering::AcqRel);
    }

    /// Number of new feed items seen so far in this cycle
    pub fn discovered(&self) -> u64 {
        self.discovered.load(Ordering::Acquire)
    }

    pub fn client(&self) -> &Client {
        &self.services.client
    }

    pub fn store(&self) -> &dyn ArticleStore {
        self.services.store.as_ref()
    }

    pub fn analyzer(&self) -> &dyn Analyzer {
        self.services.analyzer.as_ref()
    }

    pub fn entry_delay(&self) -> Duration {
        self.services.entry_delay
    }

    /// Waits for a free slot in the fetch pool
    ///
    /// Returns `None` only if the pool has been closed.
    pub async fn acquire_slot(&self) -> Option<SemaphorePermit<'_>> {
        self.services.pool.acquire().await.ok()
    }

    pub(crate) fn register(&self) -> WorkUnit {
        self.tracker.register()
    }

    pub(crate) fn tracker(&self) -> &CompletionTracker {
        &self.tracker
    }

    pub(crate) fn responses(&self) -> &mpsc::Sender<CrawlResponse> {
        &self.responses
    }

    /// Snapshot of the cycle's statistics
    pub fn report(&self) -> CycleReport {
        CycleReport {
            cycle: self.number,
            discovered: self.discovered(),
            elapsed: self.started.elapsed(),
        }
    }
}

/// Statistics of a finished cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    /// Feed items whose GUID was not in the store when they were processed
    pub discovered: u64,
    pub elapsed: Duration,
}
