use url::Url;

/// Extracts the domain from a URL
///
/// Returns the lowercase host followed by `:port` when the URL names a
/// non-default port. `None` only for URLs that have no host, which never
/// survive normalization.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use deep_crawl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com:8443".to_string()));
///
/// let url = Url::parse("https://example.com:443/").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Drops a trailing `:port` from a domain as returned by [`extract_domain`]
pub fn strip_port(domain: &str) -> &str {
    match domain.rsplit_once(':') {
        Some((host, port))
            if !port.is_empty()
                && port.bytes().all(|b| b.is_ascii_digit())
                && (!host.contains(':') || host.ends_with(']')) =>
        {
            host
        }
        _ => domain,
    }
}

/// Strips a leading `www.` label from a host
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
