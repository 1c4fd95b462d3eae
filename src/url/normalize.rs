use crate::UrlError;
use url::Url;

/// Tracking query parameters removed during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Normalizes an absolute URL string into its canonical form
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not HTTP or HTTPS
/// 3. Lowercase scheme and host, drop the default port (done by the parser)
/// 4. Normalize path:
///    - Remove dot segments (. and ..)
///    - Collapse repeated slashes
///    - Remove trailing slash (except for root /)
///    - Empty path becomes /
/// 5. Remove fragment (everything after #)
/// 6. Remove tracking query parameters and sort the rest by key
/// 7. Remove empty query string (trailing ?)
///
/// Normalizing an already-normalized URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use deep_crawl::url::normalize_url;
///
/// let url = normalize_url("HTTP://Example.COM:80/docs/#intro").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/docs");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(url)
}

/// Resolves an href found on a page against the page URL, then normalizes it
///
/// Hrefs that are empty or resolve to a non-HTTP(S) scheme (`mailto:`,
/// `javascript:`, `tel:`, `data:`) are rejected.
///
/// # Examples
///
/// ```
/// use deep_crawl::url::resolve_url;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/guide/intro").unwrap();
/// let url = resolve_url("../about/", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about");
/// assert!(resolve_url("mailto:team@example.com", &base).is_err());
/// ```
pub fn resolve_url(href: &str, base: &Url) -> Result<Url, UrlError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::Malformed("empty href".to_string()));
    }

    let joined = base
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;
    canonicalize(joined)
}

/// Applies the normalization steps to an already-parsed URL
fn canonicalize(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {
            let lowered = host.to_lowercase();
            if lowered != host {
                url.set_host(Some(&lowered))
                    .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;
            }
        }
        _ => return Err(UrlError::MissingDomain),
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            // Skip empty segments (from multiple slashes) and current directory markers
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    if normalized_segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", normalized_segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !key.is_empty() && !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    // Stable sort keeps the relative order of repeated keys
    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
