use crate::url::CanonicalUrl;
use crate::{UrlError, UrlResult};
use percent_encoding::percent_decode_str;
use url::Url;

/// Normalizes a raw href found on `base` into a canonical URL
///
/// # Normalization Steps
///
/// 1. Percent-decode the href; keep the raw string if the result is not UTF-8
/// 2. Resolve it against the base page URL (absolute hrefs pass through)
/// 3. Reject non-HTTP(S) schemes and host-less results
/// 4. Remove query, fragment and userinfo
///
/// Re-parsing re-encodes the path, so `/a b` and `/a%20b` produce the same
/// canonical string, and dot segments are already resolved.
///
/// # Examples
///
/// ```
/// use site_sweep::url::{normalize_href, normalize_seed};
///
/// let base = normalize_seed("http://a.test/p/q").unwrap();
/// let url = normalize_href("../x/y", &base).unwrap();
/// assert_eq!(url.as_str(), "http://a.test/x/y");
/// ```
pub fn normalize_href(href: &str, base: &CanonicalUrl) -> UrlResult<CanonicalUrl> {
    let decoded = percent_decode_str(href)
        .decode_utf8()
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| href.to_string());

    let resolved = base
        .as_url()
        .join(&decoded)
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    CanonicalUrl::from_resolved(resolved)
}

/// Normalizes the crawl seed
///
/// The seed must be absolute: a relative reference, a non-HTTP(S) scheme or a
/// missing host is rejected.
pub fn normalize_seed(seed: &str) -> UrlResult<CanonicalUrl> {
    let url = Url::parse(seed.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    CanonicalUrl::from_resolved(url)
}
