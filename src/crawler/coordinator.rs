//! Crawler coordinator - main crawl orchestration logic
//!
//! This module ties one crawl together:
//! - Validating the configuration and the seed URL
//! - Building the shared session and admitting the seed
//! - Running the completion watcher and the worker pool
//! - Turning the live counters into the final report

use crate::config::{validate, Config};
use crate::crawler::extractor::{Extractor, HtmlExtractor};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::session::{Admission, CrawlSession};
use crate::crawler::worker::{run_worker, WorkerContext};
use crate::output::{CrawlStatistics, ReportContext};
use crate::url::{normalize_seed, CanonicalUrl};
use crate::SweepError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    seed: CanonicalUrl,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    cancel: CancellationToken,
    discoveries: Option<UnboundedSender<CanonicalUrl>>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `seed` - The absolute http(s) URL the crawl starts from
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(SweepError)` - Invalid configuration or seed, or the HTTP client
    ///   could not be built
    pub fn new(config: Config, seed: &str) -> Result<Self, SweepError> {
        validate(&config)?;

        let seed = normalize_seed(seed).map_err(|e| SweepError::InvalidSeed {
            url: seed.to_string(),
            reason: e.to_string(),
        })?;

        let fetcher = HttpFetcher::new(&config.crawler, &config.user_agent)?;

        Ok(Self {
            config,
            seed,
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(HtmlExtractor::new()),
            cancel: CancellationToken::new(),
            discoveries: None,
        })
    }

    /// Replaces the HTTP fetcher
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replaces the HTML extractor
    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Token that stops the crawl when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Opens the stream of newly admitted URLs, seed included
    ///
    /// The stream ends when the crawl finishes. Only the most recent
    /// subscriber receives URLs.
    pub fn subscribe(&mut self) -> UnboundedReceiver<CanonicalUrl> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.discoveries = Some(tx);
        rx
    }

    pub fn seed(&self) -> &CanonicalUrl {
        &self.seed
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the crawl to completion or cancellation
    pub async fn run(self) -> Result<CrawlStatistics, SweepError> {
        let started_at = Utc::now();
        let start_time = Instant::now();

        let session = Arc::new(CrawlSession::new(
            &self.config,
            &self.seed,
            self.cancel.clone(),
            self.discoveries,
        ));

        tracing::info!(
            "Starting crawl of {} with {} workers (frontier capacity {}, policy {:?})",
            self.seed,
            self.config.crawler.workers,
            self.config.crawler.frontier_capacity,
            session.policy()
        );

        match session.admit(self.seed.clone()).await {
            Admission::Admitted => {}
            other => {
                return Err(SweepError::InvalidSeed {
                    url: self.seed.to_string(),
                    reason: format!("seed could not be queued: {:?}", other),
                });
            }
        }

        let watcher_stop = self.cancel.child_token();
        let watcher = tokio::spawn(watch_completion(session.clone(), watcher_stop.clone()));

        let ctx = Arc::new(WorkerContext {
            session: session.clone(),
            fetcher: self.fetcher,
            extractor: self.extractor,
            abort_fetch_on_cancel: self.config.crawler.abort_fetch_on_cancel,
        });

        let mut workers = JoinSet::new();
        for id in 0..self.config.crawler.workers {
            workers.spawn(run_worker(id, ctx.clone()));
        }

        let mut dequeued = 0;
        while let Some(joined) = workers.join_next().await {
            dequeued += joined?;
        }

        // A cancelled crawl leaves the watcher waiting on a counter that will
        // never reach zero
        watcher_stop.cancel();
        watcher.await?;
        session.frontier.close();

        let cancelled = self.cancel.is_cancelled();
        let elapsed = start_time.elapsed();

        if cancelled {
            tracing::info!(
                "Crawl cancelled after {:?}: {} URLs dequeued, {} left in frontier",
                elapsed,
                dequeued,
                session.frontier.len()
            );
        } else {
            tracing::info!("Crawl completed: {} URLs dequeued in {:?}", dequeued, elapsed);
        }

        Ok(session.stats.snapshot(ReportContext {
            scope: session.scope().to_string(),
            started_at,
            elapsed,
            tasks_started: session.counter.started(),
            tasks_finished: session.counter.finished(),
            cancelled,
        }))
    }
}

/// Closes the frontier the first time no task is pending or in flight
async fn watch_completion(session: Arc<CrawlSession>, stop: CancellationToken) {
    tokio::select! {
        _ = session.counter.wait_for_zero() => {
            if session.frontier.close() {
                tracing::info!("No outstanding tasks, closing frontier");
            }
        }
        _ = stop.cancelled() => {}
    }
}
