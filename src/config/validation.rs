use crate::config::types::{Config, CrawlRequest, FieldKind, FieldSpec, NavigationSpec};
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Placeholder replaced by an opaque identifier in a navigation URL template
pub const URL_TEMPLATE_PLACEHOLDER: &str = "{id}";

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_request(&config.request)?;

    if config.crawl_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "crawl-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.render.webdriver_url.is_empty() {
        return Err(ConfigError::Validation(
            "webdriver-url cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a crawl request before any fetch happens
pub fn validate_request(request: &CrawlRequest) -> Result<(), ConfigError> {
    if request.url.trim().is_empty() {
        return Err(ConfigError::Validation("url cannot be empty".to_string()));
    }

    let url = Url::parse(&request.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid url '{}': {}", request.url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "url '{}' must use http or https",
            request.url
        )));
    }

    if request.list_selector.trim().is_empty() {
        return Err(ConfigError::Validation(
            "list-selector cannot be empty".to_string(),
        ));
    }
    validate_selector("list-selector", &request.list_selector)?;

    if request.max_items == Some(0) {
        return Err(ConfigError::Validation(
            "max-items must be >= 1".to_string(),
        ));
    }

    validate_optional_selector("wait-selector", request.wait_selector.as_deref())?;
    validate_optional_selector("click-selector", request.click_selector.as_deref())?;

    validate_fields(&request.fields, "")
}

/// Validates a sibling list of fields, recursing into navigation children
fn validate_fields(fields: &[FieldSpec], parent: &str) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for field in fields {
        let path = if parent.is_empty() {
            field.name.clone()
        } else {
            format!("{}.{}", parent, field.name)
        };

        if field.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "field name cannot be empty (under '{}')",
                parent
            )));
        }

        if !seen.insert(field.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate field name '{}'",
                path
            )));
        }

        if field.selector.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "field '{}' has an empty selector",
                path
            )));
        }
        validate_selector(&path, &field.selector)?;

        match &field.kind {
            FieldKind::Text | FieldKind::Markup => {}
            FieldKind::Attribute { name } => {
                if name.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "field '{}' has an empty attribute name",
                        path
                    )));
                }
            }
            FieldKind::Navigate(navigation) => validate_navigation(navigation, &path)?,
        }
    }

    Ok(())
}

fn validate_navigation(navigation: &NavigationSpec, path: &str) -> Result<(), ConfigError> {
    if !navigation.click_selector.trim().is_empty() {
        validate_selector(path, &navigation.click_selector)?;
    }
    validate_optional_selector(path, navigation.target_selector.as_deref())?;
    validate_optional_selector(path, navigation.wait_selector.as_deref())?;

    if let Some(template) = &navigation.url_template {
        if !template.contains(URL_TEMPLATE_PLACEHOLDER) {
            return Err(ConfigError::Validation(format!(
                "field '{}': url-template '{}' must contain {}",
                path, template, URL_TEMPLATE_PLACEHOLDER
            )));
        }
    }

    validate_fields(&navigation.fields, path)
}

fn validate_optional_selector(context: &str, selector: Option<&str>) -> Result<(), ConfigError> {
    match selector {
        Some(selector) if !selector.trim().is_empty() => validate_selector(context, selector),
        _ => Ok(()),
    }
}

fn validate_selector(context: &str, selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector).map(|_| ()).map_err(|e| {
        ConfigError::InvalidSelector(format!("{}: '{}' ({:?})", context, selector, e))
    })
}
