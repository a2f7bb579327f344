use url::Url;

/// Extracts the lowercase host of a URL, used to scope browser cookies
///
/// Returns `None` for host-less URLs such as `data:` or `file:` URLs.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linkwalk::url::extract_domain;
///
/// let url = Url::parse("https://Shop.Example.com/items?page=2").unwrap();
/// assert_eq!(extract_domain(&url), Some("shop.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
