//! Crawler module: the recursive extraction engine
//!
//! This module contains the core crawl logic, including:
//! - Field extraction from a document subtree
//! - Heuristic link discovery for navigation fields
//! - Static and rendered document fetching
//! - Depth-bounded traversal of the field schema
//! - Record collection over the list items

mod collector;
mod extractor;
mod fetcher;
mod render;
mod resolver;
mod traversal;

#[cfg(test)]
pub(crate) mod testing;

pub use collector::{crawl, crawl_with_timeout};
pub use extractor::{extract, extract_from, parse_selector, text_content, ExtractRule};
pub use fetcher::{
    browser_cookies, build_http_client, cookie_header, parse_cookies, BrowserCookie,
    DocumentFetcher, Fetch, FetchMode, FetchRequest, HttpFetcher,
};
pub use render::{browser_capabilities, webdriver_cookie, RenderedFetcher};
pub use resolver::{extract_link, resolve_link, script_target, LinkTarget, ResolveOptions};
pub use traversal::{Traversal, MAX_DEPTH};
