//! Recursive, depth-bounded field traversal
//!
//! A plain field is read straight from its anchor element. A navigation field
//! resolves a link from its anchor, fetches the linked document and extracts
//! its child fields there, one hop deeper. Every field is guarded on its own:
//! a failure becomes a `null` value plus one message in the error list, and
//! its siblings carry on.
//!
//! # Depth
//!
//! Top-level fields run at depth 1 and each hop adds one. A field evaluated
//! beyond [`MAX_DEPTH`] fails with [`CrawlError::DepthExceeded`], which nulls
//! that field only.

use crate::config::{CrawlRequest, FieldKind, FieldSpec, NavigationSpec};
use crate::crawler::extractor::{extract_from, parse_selector, text_content};
use crate::crawler::fetcher::{Fetch, FetchMode, FetchRequest};
use crate::crawler::resolver::{resolve_link, LinkTarget, ResolveOptions};
use crate::output::{Record, Value};
use crate::url::{apply_template, resolve_url};
use crate::CrawlError;
use scraper::{ElementRef, Html};
use std::future::Future;
use std::pin::Pin;
use url::Url;

/// Deepest level at which a field may be evaluated
pub const MAX_DEPTH: usize = 3;

type FieldFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, CrawlError>> + 'a>>;

/// Walks a field schema against documents obtained through a [`Fetch`]
pub struct Traversal<'r> {
    fetcher: &'r dyn Fetch,
    request: &'r CrawlRequest,
}

impl<'r> Traversal<'r> {
    /// The request supplies the cookie, user agent, fetch mode and click strictness
    pub fn new(fetcher: &'r dyn Fetch, request: &'r CrawlRequest) -> Self {
        Self { fetcher, request }
    }

    /// Extracts `fields` from `subtree` into a record, in declaration order
    ///
    /// `parent` is the dotted path of the enclosing navigation field, empty at
    /// the top level. Field failures are appended to `errors`. Relative links
    /// resolve against `document_url`, the URL the document was requested with;
    /// redirects and `<base href>` are not taken into account.
    pub async fn extract_record(
        &self,
        subtree: ElementRef<'_>,
        fields: &[FieldSpec],
        document_url: &Url,
        depth: usize,
        parent: &str,
        errors: &mut Vec<String>,
    ) -> Record {
        let mut record = Record::with_capacity(fields.len());

        for field in fields {
            let path = if parent.is_empty() {
                field.name.clone()
            } else {
                format!("{}.{}", parent, field.name)
            };

            let value = self
                .extract_guarded(subtree, field, document_url, depth, &path, errors)
                .await;
            record.insert(field.name.as_str(), value);
        }

        record
    }

    /// Extracts one field, converting any failure into `null` plus an error message
    pub async fn extract_guarded(
        &self,
        subtree: ElementRef<'_>,
        field: &FieldSpec,
        document_url: &Url,
        depth: usize,
        path: &str,
        errors: &mut Vec<String>,
    ) -> Value {
        match self
            .extract_field(subtree, field, document_url, depth, path, errors)
            .await
        {
            Ok(value) => value,
            Err(e) => {
                let message = format!("Field '{}': {}", path, e);
                tracing::warn!("{}", message);
                errors.push(message);
                Value::Null
            }
        }
    }

    /// Extracts one field, failing with `DepthExceeded` beyond [`MAX_DEPTH`]
    ///
    /// A selector that matches nothing is not an error: the value is `null`.
    pub fn extract_field<'a>(
        &'a self,
        subtree: ElementRef<'a>,
        field: &'a FieldSpec,
        document_url: &'a Url,
        depth: usize,
        path: &'a str,
        errors: &'a mut Vec<String>,
    ) -> FieldFuture<'a> {
        Box::pin(async move {
            if depth > MAX_DEPTH {
                return Err(CrawlError::DepthExceeded {
                    depth,
                    max: MAX_DEPTH,
                });
            }

            let selector = parse_selector(&field.selector)?;
            let Some(anchor) = subtree.select(&selector).next() else {
                tracing::trace!("Field '{}': '{}' matched nothing", path, field.selector);
                return Ok(Value::Null);
            };

            match &field.kind {
                FieldKind::Navigate(navigation) => {
                    self.follow(anchor, navigation, document_url, depth, path, errors)
                        .await
                }
                plain => Ok(plain
                    .extract_rule()
                    .and_then(|rule| extract_from(anchor, rule))
                    .into()),
            }
        })
    }

    /// Follows the link found at `anchor` and extracts the navigation's target
    async fn follow(
        &self,
        anchor: ElementRef<'_>,
        navigation: &NavigationSpec,
        document_url: &Url,
        depth: usize,
        path: &str,
        errors: &mut Vec<String>,
    ) -> Result<Value, CrawlError> {
        let Some(next_url) = self.next_url(anchor, navigation, document_url, path)? else {
            return Ok(Value::Null);
        };

        tracing::debug!("Field '{}': following {} from depth {}", path, next_url, depth);

        let fetch_request = FetchRequest {
            url: &next_url,
            cookie: self.request.cookie.as_deref(),
            user_agent: &self.request.user_agent,
            mode: FetchMode::from_rendered(self.request.use_rendered_fetch),
            wait_selector: navigation.wait_selector.as_deref(),
            click_selector: None,
        };
        let body = self.fetcher.fetch(&fetch_request).await?;
        let document = Html::parse_document(&body);

        let target = match non_blank(navigation.target_selector.as_deref()) {
            Some(target_selector) => {
                let selector = parse_selector(target_selector)?;
                match document.select(&selector).next() {
                    Some(target) => target,
                    None => {
                        tracing::trace!(
                            "Field '{}': target '{}' not found in {}",
                            path,
                            target_selector,
                            next_url
                        );
                        return Ok(Value::Null);
                    }
                }
            }
            None => document.root_element(),
        };

        if navigation.fields.is_empty() {
            return Ok(text_content(target).into());
        }

        let record = self
            .extract_record(target, &navigation.fields, &next_url, depth + 1, path, errors)
            .await;
        Ok(Value::Record(record))
    }

    /// Absolute URL of the next document, `None` when no usable link exists
    fn next_url(
        &self,
        anchor: ElementRef<'_>,
        navigation: &NavigationSpec,
        document_url: &Url,
        path: &str,
    ) -> Result<Option<Url>, CrawlError> {
        let click_selector = non_blank(Some(navigation.click_selector.as_str()))
            .map(parse_selector)
            .transpose()?;
        let options = ResolveOptions {
            click_selector: click_selector.as_ref(),
            strict: self.request.strict_click_selector,
        };

        let candidate = match resolve_link(anchor, &options) {
            Some(LinkTarget::Url(url)) => url,
            Some(LinkTarget::OpaqueId(id)) => match &navigation.url_template {
                Some(template) => apply_template(template, &id),
                None => {
                    tracing::debug!(
                        "Field '{}': found identifier '{}' but no url-template",
                        path,
                        id
                    );
                    return Ok(None);
                }
            },
            None => {
                tracing::debug!("Field '{}': no link found", path);
                return Ok(None);
            }
        };

        Ok(Some(resolve_url(document_url, &candidate)?))
    }
}

fn non_blank(selector: Option<&str>) -> Option<&str> {
    selector.filter(|selector| !selector.trim().is_empty())
}
