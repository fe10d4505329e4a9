use crate::url::CanonicalUrl;
use std::fmt;

/// The single host a crawl session is restricted to
///
/// Fixed from the seed when the session starts. Hosts arrive already
/// lowercased (and IDNA-encoded) by URL parsing, so plain string equality is
/// the whole comparison. The port is part of the scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeDomain {
    authority: String,
}

impl ScopeDomain {
    /// Fixes the scope to the seed's `host[:port]`
    ///
    /// # Examples
    ///
    /// ```
    /// use site_sweep::url::{normalize_seed, ScopeDomain};
    ///
    /// let seed = normalize_seed("http://A.TEST/start").unwrap();
    /// let scope = ScopeDomain::from_seed(&seed);
    /// assert_eq!(scope.as_str(), "a.test");
    ///
    /// let other = normalize_seed("http://b.a.test/").unwrap();
    /// assert!(!scope.accepts(&other));
    /// ```
    pub fn from_seed(seed: &CanonicalUrl) -> Self {
        Self {
            authority: seed.host_key(),
        }
    }

    /// Returns true if the URL's `host[:port]` equals the scope exactly
    pub fn accepts(&self, url: &CanonicalUrl) -> bool {
        url.host_key() == self.authority
    }

    pub fn as_str(&self) -> &str {
        &self.authority
    }
}

impl fmt::Display for ScopeDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::normalize_seed;

    fn scope(seed: &str) -> ScopeDomain {
        ScopeDomain::from_seed(&normalize_seed(seed).unwrap())
    }

    fn accepts(scope: &ScopeDomain, url: &str) -> bool {
        scope.accepts(&normalize_seed(url).unwrap())
    }

    #[test]
    fn test_same_host_accepted() {
        let scope = scope("http://a.test/");
        assert!(accepts(&scope, "http://a.test/b"));
        assert!(accepts(&scope, "http://a.test/deep/path"));
    }

    #[test]
    fn test_case_insensitive_through_parsing() {
        let scope = scope("http://A.Test/");
        assert!(accepts(&scope, "http://a.TEST/x"));
    }

    #[test]
    fn test_other_host_rejected() {
        let scope = scope("http://a.test/");
        assert!(!accepts(&scope, "http://other.test/d"));
    }

    #[test]
    fn test_subdomain_rejected() {
        let scope = scope("http://a.test/");
        assert!(!accepts(&scope, "http://www.a.test/"));
        assert!(!accepts(&scope, "http://blog.a.test/"));
    }

    #[test]
    fn test_parent_domain_rejected() {
        let scope = scope("http://blog.a.test/");
        assert!(!accepts(&scope, "http://a.test/"));
    }

    #[test]
    fn test_port_is_part_of_scope() {
        let scope = scope("http://127.0.0.1:8080/");
        assert_eq!(scope.as_str(), "127.0.0.1:8080");
        assert!(accepts(&scope, "http://127.0.0.1:8080/page"));
        assert!(!accepts(&scope, "http://127.0.0.1:9090/page"));
        assert!(!accepts(&scope, "http://127.0.0.1/page"));
    }

    #[test]
    fn test_scheme_not_constrained() {
        let scope = scope("http://a.test/");
        assert!(accepts(&scope, "https://a.test/secure"));
    }
}
