//! Statistics collected while a crawl runs
//!
//! Workers update lock-free counters on `CrawlCounters`; the coordinator turns
//! them into an immutable `CrawlStatistics` report once every worker has
//! exited.

use crate::state::PageState;
use crate::url::LinkClassification;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters shared by all workers of one crawl session
#[derive(Debug, Default)]
pub struct CrawlCounters {
    by_state: [AtomicU64; 6],
    admitted: AtomicU64,
    duplicates: AtomicU64,
    reverted: AtomicU64,
    off_domain: AtomicU64,
    media: AtomicU64,
    unparseable: AtomicU64,
    links_seen: AtomicU64,
    text_bytes: AtomicU64,
}

impl CrawlCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the terminal state of one dequeued URL
    pub fn record_outcome(&self, state: PageState) {
        self.by_state[state_index(state)].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_link_seen(&self) {
        self.links_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reverted(&self) {
        self.reverted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unparseable(&self) {
        self.unparseable.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a link the scope or media filter turned away
    pub fn record_rejected(&self, classification: LinkClassification) {
        match classification {
            LinkClassification::OffDomain => {
                self.off_domain.fetch_add(1, Ordering::Relaxed);
            }
            LinkClassification::Media => {
                self.media.fetch_add(1, Ordering::Relaxed);
            }
            LinkClassification::Crawlable => {}
        }
    }

    pub fn record_text(&self, bytes: usize) {
        self.text_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Number of URLs that ended in the given state so far
    pub fn outcome_count(&self, state: PageState) -> u64 {
        self.by_state[state_index(state)].load(Ordering::Relaxed)
    }

    /// URLs whose pipeline ran to a terminal state other than cancellation
    pub fn processed(&self) -> u64 {
        PageState::all_states()
            .iter()
            .filter(|s| **s != PageState::Cancelled)
            .map(|s| self.outcome_count(*s))
            .sum()
    }

    pub fn admitted(&self) -> u64 {
        self.admitted.load(Ordering::Relaxed)
    }

    pub fn reverted(&self) -> u64 {
        self.reverted.load(Ordering::Relaxed)
    }

    /// Freezes the counters into a report
    pub fn snapshot(&self, report: ReportContext) -> CrawlStatistics {
        let mut pages_by_state = BTreeMap::new();
        for state in PageState::all_states() {
            let count = self.outcome_count(state);
            if count > 0 {
                pages_by_state.insert(state, count);
            }
        }

        CrawlStatistics {
            scope: report.scope,
            started_at: report.started_at,
            elapsed: report.elapsed,
            processed: self.processed(),
            pages_by_state,
            admitted: self.admitted(),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            reverted: self.reverted(),
            off_domain: self.off_domain.load(Ordering::Relaxed),
            media: self.media.load(Ordering::Relaxed),
            unparseable: self.unparseable.load(Ordering::Relaxed),
            links_seen: self.links_seen.load(Ordering::Relaxed),
            text_bytes: self.text_bytes.load(Ordering::Relaxed),
            tasks_started: report.tasks_started,
            tasks_finished: report.tasks_finished,
            cancelled: report.cancelled,
        }
    }
}

/// Session facts the counters do not track themselves
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub scope: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub tasks_started: u64,
    pub tasks_finished: u64,
    pub cancelled: bool,
}

fn state_index(state: PageState) -> usize {
    match state {
        PageState::Processed => 0,
        PageState::HttpError => 1,
        PageState::Unreachable => 2,
        PageState::ContentMismatch => 3,
        PageState::ParseFailed => 4,
        PageState::Cancelled => 5,
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// The `host[:port]` the crawl was restricted to
    pub scope: String,

    /// Wall-clock start of the crawl
    pub started_at: DateTime<Utc>,

    /// Time from seed admission to the last worker exiting
    pub elapsed: Duration,

    /// URLs whose pipeline completed, successfully or not
    pub processed: u64,

    /// Count of dequeued URLs by terminal state
    pub pages_by_state: BTreeMap<PageState, u64>,

    /// URLs admitted to the frontier, including the seed
    pub admitted: u64,

    /// Links dropped because they were already admitted
    pub duplicates: u64,

    /// Admissions undone because the frontier was full or closed
    pub reverted: u64,

    /// Links outside the scope domain
    pub off_domain: u64,

    /// Links with a blocked extension
    pub media: u64,

    /// Hrefs that could not be resolved to a canonical URL
    pub unparseable: u64,

    /// Hrefs read from anchors across all pages
    pub links_seen: u64,

    /// Bytes of lowercased page text extracted
    pub text_bytes: u64,

    /// Outstanding-task counter increments over the crawl
    pub tasks_started: u64,

    /// Outstanding-task counter decrements over the crawl
    pub tasks_finished: u64,

    /// Whether the crawl stopped because of cancellation
    pub cancelled: bool,
}

impl CrawlStatistics {
    /// Number of URLs that ended in the given state
    pub fn count(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Number of URLs for which a response body arrived
    pub fn fetched(&self) -> u64 {
        self.pages_by_state
            .iter()
            .filter(|(state, _)| state.was_fetched())
            .map(|(_, count)| count)
            .sum()
    }

    /// True when every counter increment was matched by a decrement
    pub fn is_balanced(&self) -> bool {
        self.tasks_started == self.tasks_finished
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Scope: {}", stats.scope);
    println!("  Started: {}", stats.started_at.to_rfc3339());
    println!("  Elapsed: {:.2?}", stats.elapsed);
    if stats.cancelled {
        println!("  Stopped early: cancelled");
    }
    println!();

    println!("Pages by State:");
    for (state, count) in &stats.pages_by_state {
        let percentage = if stats.admitted > 0 {
            (*count as f64 / stats.admitted as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    println!("Links:");
    println!("  Seen: {}", stats.links_seen);
    println!("  Admitted: {}", stats.admitted);
    println!("  Duplicates: {}", stats.duplicates);
    println!("  Off-domain: {}", stats.off_domain);
    println!("  Media: {}", stats.media);
    println!("  Unparseable: {}", stats.unparseable);
    println!("  Reverted (frontier full): {}", stats.reverted);
    println!();

    println!("Extracted text: {} bytes", stats.text_bytes);
    if !stats.is_balanced() {
        println!(
            "Outstanding tasks at exit: {}",
            stats.tasks_started.saturating_sub(stats.tasks_finished)
        );
    }
    println!();

    println!("Total Processed URL: {}", stats.processed);
}
