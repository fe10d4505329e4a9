//! URL handling module for Site-Sweep
//!
//! This module provides the canonical URL type, href normalization, the
//! single-host scope check and the media extension filter.

mod domain;
mod media;
mod normalize;

use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

// Re-export main types and functions
pub use domain::ScopeDomain;
pub use media::{MediaFilter, DEFAULT_MEDIA_EXTENSIONS, STATIC_ASSET_EXTENSIONS};
pub use normalize::{normalize_href, normalize_seed};

/// An absolute `scheme://host[:port]/path` URL
///
/// Query, fragment and userinfo are always absent, so two values compare equal
/// exactly when they name the same page for deduplication purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    /// Builds a canonical URL from an already-resolved absolute URL
    ///
    /// Rejects anything that is not HTTP(S) or has no host, and strips the
    /// components the canonical form never carries.
    pub(crate) fn from_resolved(mut url: Url) -> UrlResult<Self> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(UrlError::MissingHost);
        }

        url.set_query(None);
        url.set_fragment(None);
        // Both only fail for URLs that cannot have a host, ruled out above
        let _ = url.set_username("");
        let _ = url.set_password(None);

        Ok(Self(url))
    }

    /// Returns the canonical string form
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the underlying parsed URL
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the percent-encoded path
    pub fn path(&self) -> &str {
        self.0.path()
    }

    /// Returns `host[:port]`, with the port omitted when it is the scheme default
    ///
    /// # Examples
    ///
    /// ```
    /// use site_sweep::url::normalize_seed;
    ///
    /// let url = normalize_seed("http://Example.COM:8080/a").unwrap();
    /// assert_eq!(url.host_key(), "example.com:8080");
    ///
    /// let url = normalize_seed("https://example.com:443/").unwrap();
    /// assert_eq!(url.host_key(), "example.com");
    /// ```
    pub fn host_key(&self) -> String {
        let host = self.0.host_str().unwrap_or_default();
        match self.0.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Link classification types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClassification {
    /// Same host and not a blocked extension - may be admitted
    Crawlable,
    /// Host differs from the scope domain
    OffDomain,
    /// Path extension is on the media block-list
    Media,
}

impl LinkClassification {
    /// Returns true if the link may be offered to the frontier
    pub fn should_crawl(&self) -> bool {
        matches!(self, Self::Crawlable)
    }
}

/// Classifies a canonical link against the crawl scope and media filter
///
/// The scope check runs first; the media filter only sees same-host links.
pub fn classify_link(
    url: &CanonicalUrl,
    scope: &ScopeDomain,
    filter: &MediaFilter,
) -> LinkClassification {
    if !scope.accepts(url) {
        return LinkClassification::OffDomain;
    }

    if !filter.accepts(url) {
        return LinkClassification::Media;
    }

    LinkClassification::Crawlable
}
