//! URL handling module for Linkwalk
//!
//! This module resolves discovered links against their document, classifies
//! link values that do not lead anywhere, expands opaque-identifier templates,
//! and extracts hosts for cookie scoping.

mod domain;
mod resolve;

pub use domain::extract_domain;
pub use resolve::{apply_template, is_absolute_or_root_relative, is_non_navigational, resolve_url};
