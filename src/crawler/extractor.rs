//! Field extraction from a document subtree
//!
//! Pure functions over parsed HTML: locate the first element matching a
//! selector and read its text, inner markup, or an attribute.

use crate::config::FieldKind;
use crate::CrawlError;
use scraper::{ElementRef, Selector};

/// How a plain field reads its element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractRule<'a> {
    Text,
    Markup,
    Attribute(&'a str),
}

impl FieldKind {
    /// The extraction rule of a plain field; `None` for navigation fields
    pub fn extract_rule(&self) -> Option<ExtractRule<'_>> {
        match self {
            FieldKind::Text => Some(ExtractRule::Text),
            FieldKind::Markup => Some(ExtractRule::Markup),
            FieldKind::Attribute { name } => Some(ExtractRule::Attribute(name)),
            FieldKind::Navigate(_) => None,
        }
    }
}

/// Parses a CSS selector, mapping failures into the crawl error taxonomy
pub fn parse_selector(selector: &str) -> Result<Selector, CrawlError> {
    Selector::parse(selector.trim())
        .map_err(|e| CrawlError::InvalidSelector(format!("{} ({:?})", selector, e)))
}

/// Extracts a value from the first element matching `selector` within `subtree`
///
/// Returns `None` when nothing matches, when the attribute is absent, or when
/// text or markup is empty after trimming.
///
/// # Example
///
/// ```
/// use linkwalk::crawler::{extract, parse_selector, ExtractRule};
/// use scraper::Html;
///
/// let html = Html::parse_fragment(r#"<li><a class="link" href="/d/1"> One </a></li>"#);
/// let link = parse_selector(".link").unwrap();
/// let root = html.root_element();
///
/// assert_eq!(extract(root, &link, ExtractRule::Text), Some("One".to_string()));
/// assert_eq!(extract(root, &link, ExtractRule::Attribute("href")), Some("/d/1".to_string()));
/// ```
pub fn extract(subtree: ElementRef<'_>, selector: &Selector, rule: ExtractRule<'_>) -> Option<String> {
    let element = subtree.select(selector).next()?;
    extract_from(element, rule)
}

/// Applies an extraction rule to an already located element
pub fn extract_from(element: ElementRef<'_>, rule: ExtractRule<'_>) -> Option<String> {
    match rule {
        ExtractRule::Text => text_content(element),
        ExtractRule::Markup => non_empty(element.inner_html().trim()),
        ExtractRule::Attribute(name) => element.value().attr(name).map(str::to_string),
    }
}

/// Whitespace-normalized text of an element, `None` when empty
pub fn text_content(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    non_empty(&normalized)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
