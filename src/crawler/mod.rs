//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The bounded frontier, dedup store and outstanding-task counter
//! - The admission protocol tying those three together
//! - HTTP fetching and HTML extraction behind swappable traits
//! - The worker pool and overall crawl coordination

mod coordinator;
mod counter;
mod dedup;
mod extractor;
mod fetcher;
mod frontier;
mod session;
mod worker;

#[cfg(test)]
mod test_support;

pub use coordinator::Coordinator;
pub use counter::{OutstandingCounter, TaskGuard};
pub use dedup::{DedupStore, Reservation};
pub use extractor::{ExtractError, Extractor, HtmlExtractor, PageContent};
pub use fetcher::{build_http_client, fetch_url, FetchResult, Fetcher, HttpFetcher};
pub use frontier::{EnqueueError, Frontier};
pub use session::{Admission, CrawlSession, LinkOutcome, RevertReason};

use crate::config::Config;
use crate::output::CrawlStatistics;
use crate::SweepError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl with the default HTTP
/// fetcher and HTML extractor. It will:
/// 1. Validate the configuration and canonicalize the seed
/// 2. Admit the seed and start the worker pool
/// 3. Follow same-host links until no work remains
/// 4. Return the crawl statistics
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - The absolute http(s) URL to start from
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Crawl finished
/// * `Err(SweepError)` - Crawl could not start
pub async fn crawl(config: Config, seed: &str) -> Result<CrawlStatistics, SweepError> {
    Coordinator::new(config, seed)?.run().await
}
