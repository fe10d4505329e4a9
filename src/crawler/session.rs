//! Crawl session state and the admission protocol
//!
//! A `CrawlSession` owns everything one crawl shares between its workers: the
//! scope, the link filter, the dedup store, the frontier, the outstanding-task
//! counter and the live statistics. Workers reach it through an `Arc`.

use crate::config::{Config, FullFrontierPolicy};
use crate::crawler::counter::OutstandingCounter;
use crate::crawler::dedup::{DedupStore, Reservation};
use crate::crawler::frontier::{EnqueueError, Frontier};
use crate::output::CrawlCounters;
use crate::url::{
    classify_link, normalize_href, CanonicalUrl, LinkClassification, MediaFilter, ScopeDomain,
};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Result of offering a URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Recorded as seen and queued for a worker
    Admitted,
    /// Already admitted earlier
    Duplicate,
    /// Not queued; the URL stays eligible for a later discovery
    Reverted(RevertReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertReason {
    FrontierFull,
    FrontierClosed,
    Cancelled,
    TimedOut,
}

impl From<&EnqueueError> for RevertReason {
    fn from(err: &EnqueueError) -> Self {
        match err {
            EnqueueError::Full(_) => Self::FrontierFull,
            EnqueueError::Closed(_) => Self::FrontierClosed,
            EnqueueError::Cancelled(_) => Self::Cancelled,
            EnqueueError::TimedOut(_) => Self::TimedOut,
        }
    }
}

/// What happened to one raw href found on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Offered(Admission),
    OffDomain,
    Media,
    Unparseable,
}

pub struct CrawlSession {
    pub(crate) scope: ScopeDomain,
    pub(crate) filter: MediaFilter,
    pub(crate) dedup: DedupStore,
    pub(crate) frontier: Frontier,
    pub(crate) counter: OutstandingCounter,
    pub(crate) stats: CrawlCounters,
    pub(crate) cancel: CancellationToken,
    policy: FullFrontierPolicy,
    block_timeout: Duration,
    discoveries: Option<UnboundedSender<CanonicalUrl>>,
}

impl CrawlSession {
    pub fn new(
        config: &Config,
        seed: &CanonicalUrl,
        cancel: CancellationToken,
        discoveries: Option<UnboundedSender<CanonicalUrl>>,
    ) -> Self {
        Self {
            scope: ScopeDomain::from_seed(seed),
            filter: MediaFilter::from_config(&config.filter),
            dedup: DedupStore::new(),
            frontier: Frontier::new(config.crawler.frontier_capacity),
            counter: OutstandingCounter::new(),
            stats: CrawlCounters::new(),
            cancel,
            policy: config.crawler.full_frontier_policy,
            block_timeout: config.crawler.block_timeout(),
            discoveries,
        }
    }

    /// Resolves, filters and admits one href found on `base`
    pub async fn offer_link(&self, href: &str, base: &CanonicalUrl) -> LinkOutcome {
        self.stats.record_link_seen();

        let url = match normalize_href(href, base) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Skipping href '{}' on {}: {}", href, base, e);
                self.stats.record_unparseable();
                return LinkOutcome::Unparseable;
            }
        };

        let classification = classify_link(&url, &self.scope, &self.filter);
        if !classification.should_crawl() {
            tracing::debug!("Rejected {} ({:?})", url, classification);
            self.stats.record_rejected(classification);
            return match classification {
                LinkClassification::Media => LinkOutcome::Media,
                _ => LinkOutcome::OffDomain,
            };
        }

        LinkOutcome::Offered(self.admit(url).await)
    }

    /// Admits a canonical URL into the dedup store and the frontier together
    ///
    /// On `Admitted` the URL is queued exactly once, the counter has been
    /// incremented and the URL is published to the discovery stream. On any
    /// other outcome nothing is left behind.
    pub async fn admit(&self, url: CanonicalUrl) -> Admission {
        let admission = match self.policy {
            FullFrontierPolicy::Revert => self.admit_or_revert(&url),
            FullFrontierPolicy::Block => self.admit_or_wait(&url).await,
        };

        match admission {
            Admission::Admitted => {
                tracing::trace!("Admitted {}", url);
                self.stats.record_admitted();
                if let Some(tx) = &self.discoveries {
                    // Receiver may have been dropped; the crawl does not depend on it
                    let _ = tx.send(url);
                }
            }
            Admission::Duplicate => {
                self.stats.record_duplicate();
            }
            Admission::Reverted(reason) => {
                tracing::warn!("Reverted admission of {} ({:?})", url, reason);
                self.stats.record_reverted();
            }
        }

        admission
    }

    fn admit_or_revert(&self, url: &CanonicalUrl) -> Admission {
        let mut failure = None;

        let reservation = self.dedup.insert_with(url, || {
            self.counter.increment();
            match self.frontier.try_enqueue(url.clone()) {
                Ok(()) => true,
                Err(e) => {
                    self.counter.decrement();
                    failure = Some(RevertReason::from(&e));
                    false
                }
            }
        });

        match reservation {
            Reservation::Committed => Admission::Admitted,
            Reservation::AlreadySeen => Admission::Duplicate,
            Reservation::RolledBack => {
                Admission::Reverted(failure.unwrap_or(RevertReason::FrontierFull))
            }
        }
    }

    async fn admit_or_wait(&self, url: &CanonicalUrl) -> Admission {
        if !self.dedup.insert(url) {
            return Admission::Duplicate;
        }

        self.counter.increment();
        match self
            .frontier
            .enqueue_wait(url.clone(), self.block_timeout, &self.cancel)
            .await
        {
            Ok(()) => Admission::Admitted,
            Err(e) => {
                self.dedup.remove(url);
                self.counter.decrement();
                Admission::Reverted(RevertReason::from(&e))
            }
        }
    }

    pub fn scope(&self) -> &ScopeDomain {
        &self.scope
    }

    pub fn policy(&self) -> FullFrontierPolicy {
        self.policy
    }
}
