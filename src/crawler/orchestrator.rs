//! Crawl orchestration
//!
//! The [`Crawler`] drives repeated crawl cycles over its source roster:
//! - `run` fans out one task per source and one per feed link, then waits
//!   until every unit of work of the cycle has been released
//! - `listen` drains the response channel and spawns one processing task
//!   per fetched feed document
//! - `start` repeats `run` with a fixed pause between cycles until `stop`
//!
//! Cycles never overlap. Outbound requests are bounded by the fetch pool in
//! [`Services`]; feed documents are handed over through a bounded channel
//! whose senders wait when it is full.

use crate::analysis::Analyzer;
use crate::config::CrawlerConfig;
use crate::crawler::cycle::{Cycle, CycleReport, Services};
use crate::crawler::tracker::WorkUnit;
use crate::source::{CrawlResponse, Link, Source};
use crate::storage::ArticleStore;
use crate::{CrawlError, Result};
use reqwest::Client;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Coordinates crawl cycles across a fixed roster of sources
pub struct Crawler {
    sources: Vec<Arc<dyn Source>>,
    interval: Duration,
    services: Arc<Services>,
    sender: mpsc::Sender<CrawlResponse>,
    receiver: Mutex<Option<mpsc::Receiver<CrawlResponse>>>,
    shutdown: CancellationToken,
    cycles: AtomicU64,
    scheduled: AtomicBool,
    /// Held for the duration of a cycle
    cycle_lock: tokio::sync::Mutex<()>,
}

impl Crawler {
    /// Creates a crawler from its roster and scheduling parameters
    ///
    /// A channel capacity of zero is raised to one.
    pub fn configure(
        sources: Vec<Arc<dyn Source>>,
        interval: Duration,
        channel_capacity: usize,
        services: Services,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(channel_capacity.max(1));

        Self {
            sources,
            interval,
            services: Arc::new(services),
            sender,
            receiver: Mutex::new(Some(receiver)),
            shutdown: CancellationToken::new(),
            cycles: AtomicU64::new(0),
            scheduled: AtomicBool::new(false),
            cycle_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Creates a crawler using the `[crawler]` section of the configuration
    pub fn from_config(
        sources: Vec<Arc<dyn Source>>,
        config: &CrawlerConfig,
        client: Client,
        store: Arc<dyn ArticleStore>,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        let services = Services::new(
            client,
            store,
            analyzer,
            config.max_concurrent_fetches,
            config.entry_delay(),
        );
        Self::configure(sources, config.interval(), config.channel_capacity, services)
    }

    pub fn sources(&self) -> &[Arc<dyn Source>] {
        &self.sources
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs one full crawl cycle
    ///
    /// Returns once every source, link fetch and response processing task of
    /// the cycle has finished. Responses are only processed while `listen`
    /// is running; without it, the cycle waits on the full channel.
    pub async fn run(&self) -> CycleReport {
        let _running = self.cycle_lock.lock().await;

        let number = self.cycles.fetch_add(1, Ordering::AcqRel) + 1;
        let cycle = Arc::new(Cycle::new(
            number,
            Arc::clone(&self.services),
            self.sender.clone(),
        ));
        tracing::info!("Starting crawler");

        for source in &self.sources {
            let unit = cycle.register();
            let task = crawl_source(Arc::clone(source), Arc::clone(&cycle), unit);
            spawn_logged(format!("source {}", source.name()), task);
        }

        cycle.tracker().wait().await;

        let report = cycle.report();
        self.done(&report);
        report
    }

    /// Repeats `run` every `interval` until `stop` is called
    ///
    /// The pause starts when a cycle finishes, so cycles never overlap. A
    /// cycle in progress when `stop` is called is allowed to finish.
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::AlreadyScheduled` if the loop was started before.
    pub async fn run_forever(&self) -> Result<()> {
        self.claim_schedule()?;
        self.schedule().await;
        Ok(())
    }

    /// Spawns the scheduling loop of `run_forever` on the runtime
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::AlreadyScheduled` if the loop was started before.
    pub fn start(self: &Arc<Self>) -> Result<JoinHandle<()>> {
        self.claim_schedule()?;
        let crawler = Arc::clone(self);
        Ok(tokio::spawn(async move { crawler.schedule().await }))
    }

    fn claim_schedule(&self) -> Result<()> {
        if self.scheduled.swap(true, Ordering::AcqRel) {
            return Err(CrawlError::AlreadyScheduled);
        }
        Ok(())
    }

    async fn schedule(&self) {
        while !self.shutdown.is_cancelled() {
            self.run().await;

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    /// Dispatches fetched feed documents to their sources until `stop`
    ///
    /// On stop the channel is closed: later sends fail and their responses
    /// are dropped, and responses still buffered are discarded.
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::AlreadyListening` if called more than once.
    pub async fn listen(&self) -> Result<()> {
        let receiver = match self.receiver.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let mut receiver = receiver.ok_or(CrawlError::AlreadyListening)?;

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    receiver.close();
                    tracing::info!("Stopping crawler");
                    break;
                }
                response = receiver.recv() => match response {
                    Some(response) => dispatch(response),
                    None => break,
                },
            }
        }

        Ok(())
    }

    /// Signals `listen` and the scheduling loop to exit
    ///
    /// In-flight fetch and processing tasks are not cancelled.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn done(&self, report: &CycleReport) {
        tracing::info!("Done crawling {} news feed", report.discovered);
        tracing::debug!(
            "Cycle {} finished in {:.2}s",
            report.cycle,
            report.elapsed.as_secs_f64()
        );
    }
}

/// Spawns a task and logs it if it panics
///
/// Work units held by the task are released while it unwinds.
fn spawn_logged<F>(what: String, task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = tokio::spawn(task);
    tokio::spawn(async move {
        if let Err(e) = handle.await {
            if e.is_panic() {
                tracing::error!("Task for {} panicked: {}", what, e);
            }
        }
    });
}

async fn crawl_source(source: Arc<dyn Source>, cycle: Arc<Cycle>, unit: WorkUnit) {
    let links = source.links();
    tracing::info!(
        "Starting source {} with {} links",
        source.name(),
        links.len()
    );

    for link in links {
        let task = fetch_link(
            Arc::clone(&source),
            Arc::clone(&cycle),
            link.clone(),
            unit.register_child(),
        );
        spawn_logged(format!("link {}", link), task);
    }
}

async fn fetch_link(source: Arc<dyn Source>, cycle: Arc<Cycle>, link: Link, unit: WorkUnit) {
    let feed = {
        let Some(_slot) = cycle.acquire_slot().await else {
            return;
        };
        match source.fetch(&cycle, &link).await {
            Ok(feed) => feed,
            Err(e) => {
                tracing::debug!("{} might be down: {}", link, e);
                return;
            }
        }
    };
    tracing::debug!("{} is up", link);

    let response = CrawlResponse {
        source,
        link,
        feed,
        cycle: Arc::clone(&cycle),
        unit: unit.register_child(),
    };
    if let Err(rejected) = cycle.responses().send(response).await {
        tracing::warn!(
            "Crawler stopped, dropping response for {}",
            rejected.0.link
        );
    }
}

fn dispatch(response: CrawlResponse) {
    let what = format!("response {}", response.link);
    spawn_logged(what, async move {
        let source = Arc::clone(&response.source);
        let link = response.link.clone();
        if let Err(e) = source.process(response).await {
            tracing::error!("Failed to process {}: {}", link, e);
        }
    });
}
