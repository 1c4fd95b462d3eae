use crate::url::domain::{strip_port, strip_www};
use serde::{Deserialize, Serialize};

/// Which hosts a crawl may traverse into
///
/// Depth alone does not bound fan-out once links leave the seed's site, so
/// scoping is an explicit, configurable policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrawlScope {
    /// Only the seed's exact host
    #[default]
    SameHost,
    /// The seed's domain and any of its subdomains
    SameDomain,
    /// No host restriction
    Any,
}

impl CrawlScope {
    /// Returns true if a link to `candidate` may be followed from a crawl
    /// seeded on `seed_host`
    ///
    /// Both are domains as produced by `extract_domain`: lowercase host plus
    /// any explicit port. `SameHost` compares host and port; `SameDomain`
    /// ignores ports.
    ///
    /// # Examples
    ///
    /// ```
    /// use deep_crawl::url::CrawlScope;
    ///
    /// assert!(CrawlScope::SameHost.allows("example.com", "example.com"));
    /// assert!(!CrawlScope::SameHost.allows("example.com", "blog.example.com"));
    /// assert!(!CrawlScope::SameHost.allows("example.com:8080", "example.com:9090"));
    /// assert!(CrawlScope::SameDomain.allows("www.example.com", "blog.example.com"));
    /// assert!(CrawlScope::Any.allows("example.com", "other.org"));
    /// ```
    pub fn allows(&self, seed_host: &str, candidate: &str) -> bool {
        match self {
            Self::SameHost => seed_host == candidate,
            Self::SameDomain => matches_wildcard(
                &format!("*.{}", strip_www(strip_port(seed_host))),
                strip_port(candidate),
            ),
            Self::Any => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SameHost => "same-host",
            Self::SameDomain => "same-domain",
            Self::Any => "any",
        }
    }
}

/// Checks if a host matches a wildcard pattern
///
/// Two kinds of patterns are supported:
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches "example.com" itself and any
///    subdomain at any nesting level
///
/// # Examples
///
/// ```
/// use deep_crawl::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "api.v2.example.com"));
/// assert!(!matches_wildcard("*.example.com", "myexample.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}
