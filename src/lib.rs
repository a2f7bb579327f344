//! Linkwalk: a schema-driven, link-following record extractor
//!
//! This crate walks the items of an HTML list page according to a declarative
//! field schema. Plain fields are read straight from each item; navigation
//! fields discover a link, fetch the linked document and keep extracting there,
//! up to a fixed depth. Failures are isolated per field so one broken field
//! never aborts a whole record.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("List selector '{selector}' matched no elements")]
    ListNotFound { selector: String },

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Navigation depth {depth} exceeds the maximum of {max}")]
    DepthExceeded { depth: usize, max: usize },

    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Document acquisition errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("WebDriver session error: {0}")]
    Session(String),

    #[error("Rendering failed for {url}: {message}")]
    Render { url: String, message: String },

    #[error("Rendered fetch requested for {url} but no renderer is configured")]
    RenderingUnavailable { url: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::{Config, CrawlRequest, FieldKind, FieldSpec, NavigationSpec};
pub use crawler::{crawl, crawl_with_timeout, DocumentFetcher, Fetch, FetchMode, FetchRequest};
pub use output::{CrawlResult, Record, Value};
