//! Terminal outcomes for a dequeued URL
//!
//! Every URL a worker takes off the frontier ends in exactly one of these
//! states, and reaching any of them releases the URL's outstanding-task slot.

use std::fmt;

/// Represents how processing of a dequeued URL ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageState {
    // ===== Terminal Success States =====
    /// Page was fetched, parsed, and its links were offered to the frontier
    Processed,

    // ===== Terminal Error States =====
    /// Server answered with a non-success status code
    HttpError,

    /// Request failed in transport (timeout, connection refused, TLS, body read)
    Unreachable,

    /// Response was not HTML
    ContentMismatch,

    /// Body could not be turned into a document
    ParseFailed,

    // ===== Special States =====
    /// Fetch was abandoned because the crawl was cancelled
    Cancelled,
}

impl PageState {
    /// Returns true if the page's links were extracted
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if a response body was received
    pub fn was_fetched(&self) -> bool {
        matches!(self, Self::Processed | Self::ParseFailed)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::HttpError | Self::Unreachable | Self::ContentMismatch | Self::ParseFailed
        )
    }

    /// Short snake_case label used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::HttpError => "http_error",
            Self::Unreachable => "unreachable",
            Self::ContentMismatch => "content_mismatch",
            Self::ParseFailed => "parse_failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> [Self; 6] {
        [
            Self::Processed,
            Self::HttpError,
            Self::Unreachable,
            Self::ContentMismatch,
            Self::ParseFailed,
            Self::Cancelled,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
