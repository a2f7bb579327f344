//! Configuration module for Linkwalk
//!
//! This module defines the crawl request and field schema types, and handles
//! loading, parsing, and validating TOML configuration files for the CLI host.
//!
//! # Example
//!
//! ```no_run
//! use linkwalk::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("List selector: {}", config.request.list_selector);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlRequest, FieldKind, FieldSpec, HttpConfig, NavigationSpec, RenderConfig,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

// Re-export validation
pub use validation::{validate, validate_request, URL_TEMPLATE_PLACEHOLDER};
