use serde::Deserialize;
use std::time::Duration;

/// User agent sent with every request unless the configuration overrides it
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.3;; en-US) AppleWebKit/602.45 (KHTML, like Gecko) Chrome/52.0.3750.323 Safari/536.7 Edge/10.62018";

/// Main configuration structure for Site-Sweep
///
/// Every section is optional in the TOML file; missing sections and keys fall
/// back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub filter: FilterConfig,
}

/// What to do when an admitted URL finds the frontier at capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FullFrontierPolicy {
    /// Undo the admission so a later discovery of the same link can retry
    #[default]
    Revert,
    /// Wait for a free slot, bounded by `block-timeout-ms`, then revert
    Block,
}

impl std::str::FromStr for FullFrontierPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "revert" => Ok(Self::Revert),
            "block" => Ok(Self::Block),
            other => Err(format!(
                "unknown full-frontier policy '{}', expected 'revert' or 'block'",
                other
            )),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of workers pulling from the frontier
    pub workers: usize,

    /// Maximum number of URLs waiting in the frontier
    pub frontier_capacity: usize,

    /// Policy applied when the frontier is full
    pub full_frontier_policy: FullFrontierPolicy,

    /// Longest a blocked admission waits for a free slot (milliseconds)
    pub block_timeout_ms: u64,

    /// Per-request timeout for page fetches (milliseconds)
    pub request_timeout_ms: u64,

    /// Whether cancellation also aborts fetches already in flight
    pub abort_fetch_on_cancel: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 50,
            frontier_capacity: 50_000,
            full_frontier_policy: FullFrontierPolicy::Revert,
            block_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
            abort_fetch_on_cancel: true,
        }
    }
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn block_timeout(&self) -> Duration {
        Duration::from_millis(self.block_timeout_ms)
    }
}

/// Request header configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// The User-Agent header value
    pub value: String,

    /// The Accept-Language header value
    pub accept_language: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// Link filtering configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FilterConfig {
    /// Also block stylesheets and scripts
    pub block_static_assets: bool,

    /// Additional extensions to block, each starting with '.'
    pub extra_extensions: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            block_static_assets: true,
            extra_extensions: Vec::new(),
        }
    }
}
