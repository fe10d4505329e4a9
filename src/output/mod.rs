//! Output module for crawl reporting
//!
//! Extracted page text is never persisted; what a crawl leaves behind is the
//! statistics report built here and the stream of discovered URLs the
//! coordinator publishes while it runs.

mod stats;

pub use stats::{print_statistics, CrawlCounters, CrawlStatistics, ReportContext};
