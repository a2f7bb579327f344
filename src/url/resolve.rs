use crate::config::URL_TEMPLATE_PLACEHOLDER;
use url::Url;

/// Schemes that look like links but never lead to another document
const PSEUDO_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Returns true if an `href` value is a same-page fragment or a pseudo-link
///
/// Such values exist on many clickable elements purely to make them focusable;
/// following them would never yield a new document.
pub fn is_non_navigational(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return true;
    }

    let lower = href.to_ascii_lowercase();
    PSEUDO_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// Returns true for `http(s)://...`, protocol-relative `//...` and root-relative `/...` values
pub fn is_absolute_or_root_relative(value: &str) -> bool {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || value.starts_with('/')
}

/// Resolves a discovered link against the URL of the document it was found in
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linkwalk::url::resolve_url;
///
/// let base = Url::parse("https://example.com/list/page-2").unwrap();
/// assert_eq!(resolve_url(&base, "/p/1").unwrap().as_str(), "https://example.com/p/1");
/// assert_eq!(resolve_url(&base, "item-7").unwrap().as_str(), "https://example.com/list/item-7");
/// ```
pub fn resolve_url(base: &Url, candidate: &str) -> Result<Url, url::ParseError> {
    base.join(candidate.trim())
}

/// Substitutes an opaque identifier into a URL template
///
/// Only the first `{id}` placeholder is replaced.
pub fn apply_template(template: &str, id: &str) -> String {
    template.replacen(URL_TEMPLATE_PLACEHOLDER, id.trim(), 1)
}
