use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitewalk::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the `www.`/bare-domain toggle of a host
///
/// `www.example.com` becomes `example.com` and `example.com` becomes
/// `www.example.com`. The input is expected to be lowercase.
///
/// # Examples
///
/// ```
/// use sitewalk::url::host_alias;
///
/// assert_eq!(host_alias("example.com"), "www.example.com");
/// assert_eq!(host_alias("www.example.com"), "example.com");
/// ```
pub fn host_alias(host: &str) -> String {
    match host.strip_prefix("www.") {
        Some(bare) => bare.to_string(),
        None => format!("www.{}", host),
    }
}
