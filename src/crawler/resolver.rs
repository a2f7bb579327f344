//! Link discovery for navigation fields
//!
//! Real-world markup marks clickable elements in many inconsistent ways, so a
//! link is found by an ordered chain of heuristics, each a pure function over
//! the parsed document. The first heuristic that produces a target wins.
//!
//! # Heuristic Order
//!
//! | Step | Where it looks |
//! |------|----------------|
//! | 1 | First match of the click selector inside the subtree |
//! | 2 | The subtree's root element |
//! | 3 | First descendant carrying an `href` |
//! | 4 | Nearest ancestor carrying an `href` |
//! | 5 | Up to 3 ancestor containers: first `href` descendant, else first scripted/data-link descendant |
//!
//! Every candidate element is read the same way by [`extract_link`].

use crate::url::{is_absolute_or_root_relative, is_non_navigational};
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

/// Data attributes used by client-side routers to hold a destination
const NAV_DATA_ATTRIBUTES: &[&str] = &[
    "data-href",
    "data-url",
    "data-link",
    "data-navigate",
    "data-redirect",
];

/// Attributes holding an item identifier rather than a URL
const ID_ATTRIBUTES: &[&str] = &[
    "data-id",
    "data-item-id",
    "data-product-id",
    "data-post-id",
    "data-record-id",
    "data-key",
];

/// Inline event handler inspected for scripted navigation
const HANDLER_ATTRIBUTE: &str = "onclick";

/// How many ancestor containers the nearby search climbs
const MAX_CONTAINER_HOPS: usize = 3;

static LOCATION_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[^\w.])(?:window\.|document\.|self\.|top\.)?location(?:\.href)?\s*=\s*['"]([^'"]+)['"]"#)
        .expect("location assignment pattern is valid")
});

static LOCATION_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:window\.open|location\.assign|location\.replace)\s*\(\s*['"]([^'"]+)['"]"#)
        .expect("location call pattern is valid")
});

/// What a clickable element points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// A URL, possibly relative to the document it was found in
    Url(String),
    /// An identifier that needs a URL template to become navigable
    OpaqueId(String),
}

/// Options controlling the heuristic chain
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions<'a> {
    /// Preferred element to read the link from
    pub click_selector: Option<&'a Selector>,
    /// When set, an unmatched click selector ends the search with no link
    pub strict: bool,
}

type Heuristic = fn(ElementRef<'_>, &ResolveOptions<'_>) -> Option<LinkTarget>;

const HEURISTICS: &[(&str, Heuristic)] = &[
    ("click-selector", from_click_selector),
    ("element", from_element),
    ("descendant-anchor", from_descendant_anchor),
    ("ancestor-anchor", from_ancestor_anchor),
    ("nearby-container", from_nearby_container),
];

/// Resolves the navigation target of a subtree
///
/// # Example
///
/// ```
/// use linkwalk::crawler::{resolve_link, LinkTarget, ResolveOptions};
/// use scraper::{Html, Selector};
///
/// let html = Html::parse_fragment(r#"<div class="card"><span onclick="location.href='/p/9'">Open</span></div>"#);
/// let card = html.select(&Selector::parse(".card").unwrap()).next().unwrap();
///
/// assert_eq!(
///     resolve_link(card, &ResolveOptions::default()),
///     Some(LinkTarget::Url("/p/9".to_string()))
/// );
/// ```
pub fn resolve_link(subtree: ElementRef<'_>, options: &ResolveOptions<'_>) -> Option<LinkTarget> {
    if options.strict {
        if let Some(selector) = options.click_selector {
            if first_match(subtree, selector).is_none() {
                tracing::debug!("Strict click selector matched nothing; no link");
                return None;
            }
        }
    }

    HEURISTICS.iter().find_map(|(name, heuristic)| {
        let target = heuristic(subtree, options)?;
        tracing::debug!(heuristic = name, ?target, "Resolved link");
        Some(target)
    })
}

/// Step 1: the element matched by the click selector, the root included
pub fn from_click_selector(
    subtree: ElementRef<'_>,
    options: &ResolveOptions<'_>,
) -> Option<LinkTarget> {
    let selector = options.click_selector?;
    extract_link(first_match(subtree, selector)?)
}

/// Step 2: the subtree's own root element
pub fn from_element(subtree: ElementRef<'_>, _options: &ResolveOptions<'_>) -> Option<LinkTarget> {
    extract_link(subtree)
}

/// Step 3: the first descendant exposing an `href`
pub fn from_descendant_anchor(
    subtree: ElementRef<'_>,
    _options: &ResolveOptions<'_>,
) -> Option<LinkTarget> {
    extract_link(first_descendant(subtree, is_anchor_like)?)
}

/// Step 4: the nearest ancestor that is itself anchor-like
pub fn from_ancestor_anchor(
    subtree: ElementRef<'_>,
    _options: &ResolveOptions<'_>,
) -> Option<LinkTarget> {
    let anchor = subtree
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|element| is_anchor_like(*element))?;
    extract_link(anchor)
}

/// Step 5: search a few enclosing containers for a link-bearing sibling
pub fn from_nearby_container(
    subtree: ElementRef<'_>,
    _options: &ResolveOptions<'_>,
) -> Option<LinkTarget> {
    subtree
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(MAX_CONTAINER_HOPS)
        .find_map(|container| {
            let candidate = first_descendant(container, is_anchor_like)
                .or_else(|| first_descendant(container, is_scripted_link))?;
            extract_link(candidate)
        })
}

/// Reads a link from one candidate element
///
/// Checked in order: `href` (fragments and pseudo-links rejected), navigation
/// data attributes (absolute or root-relative values only), the `onclick`
/// handler, and finally identifier attributes, which yield an opaque id.
pub fn extract_link(element: ElementRef<'_>) -> Option<LinkTarget> {
    href_link(element)
        .or_else(|| data_attribute_link(element))
        .or_else(|| inline_handler_link(element))
        .map(LinkTarget::Url)
        .or_else(|| identifier(element).map(LinkTarget::OpaqueId))
}

fn href_link(element: ElementRef<'_>) -> Option<String> {
    let href = element.value().attr("href")?;
    if is_non_navigational(href) {
        return None;
    }
    Some(href.trim().to_string())
}

fn data_attribute_link(element: ElementRef<'_>) -> Option<String> {
    NAV_DATA_ATTRIBUTES.iter().find_map(|name| {
        let value = element.value().attr(name)?;
        is_absolute_or_root_relative(value).then(|| value.trim().to_string())
    })
}

fn inline_handler_link(element: ElementRef<'_>) -> Option<String> {
    let handler = element.value().attr(HANDLER_ATTRIBUTE)?;
    script_target(handler)
}

/// Extracts the string literal a navigation script sends the browser to
pub fn script_target(script: &str) -> Option<String> {
    [&*LOCATION_ASSIGNMENT, &*LOCATION_CALL]
        .iter()
        .filter_map(|pattern| pattern.captures(script))
        .filter_map(|captures| captures.get(1))
        .map(|target| target.as_str().trim())
        .find(|target| !is_non_navigational(target))
        .map(str::to_string)
}

fn identifier(element: ElementRef<'_>) -> Option<String> {
    ID_ATTRIBUTES.iter().find_map(|name| {
        let value = element.value().attr(name)?.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn is_anchor_like(element: ElementRef<'_>) -> bool {
    element.value().attr("href").is_some()
}

/// True only when the handler or a data attribute actually yields a URL
fn is_scripted_link(element: ElementRef<'_>) -> bool {
    inline_handler_link(element).is_some() || data_attribute_link(element).is_some()
}

fn first_match<'a>(subtree: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    if selector.matches(&subtree) {
        return Some(subtree);
    }
    subtree.select(selector).next()
}

fn first_descendant<'a>(
    subtree: ElementRef<'a>,
    predicate: fn(ElementRef<'_>) -> bool,
) -> Option<ElementRef<'a>> {
    subtree
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|element| predicate(*element))
}
