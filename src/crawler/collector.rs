//! Record collection over the items of a list page
//!
//! This is the crawl entry point. It validates the request, fetches the list
//! document, and runs the traversal once per list item, strictly in document
//! order. Only three things fail a whole crawl: an invalid request, a failed
//! list fetch, and a list selector that matches nothing. Everything after that
//! is recorded per field and never flips `success`.

use crate::config::{validate_request, CrawlRequest};
use crate::crawler::extractor::parse_selector;
use crate::crawler::fetcher::{Fetch, FetchMode, FetchRequest};
use crate::crawler::traversal::Traversal;
use crate::output::CrawlResult;
use crate::{CrawlError, FetchError};
use scraper::Html;
use std::time::Duration;
use tracing::Instrument;
use url::Url;

/// Runs a crawl and always returns a result
///
/// Crawl-level failures come back as `success = false` with a single error.
pub async fn crawl(request: &CrawlRequest, fetcher: &dyn Fetch) -> CrawlResult {
    match collect(request, fetcher).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Crawl of {} failed: {}", request.url, e);
            CrawlResult::failed(e.to_string())
        }
    }
}

/// Runs a crawl bounded by a wall-clock limit
///
/// Expiry is reported like a fetch timeout on the list URL. Records collected
/// before expiry are discarded.
pub async fn crawl_with_timeout(
    request: &CrawlRequest,
    fetcher: &dyn Fetch,
    limit: Duration,
) -> CrawlResult {
    match tokio::time::timeout(limit, crawl(request, fetcher)).await {
        Ok(result) => result,
        Err(_) => {
            let error = CrawlError::from(FetchError::Timeout {
                url: request.url.clone(),
            });
            tracing::error!("Crawl exceeded {:?}: {}", limit, error);
            CrawlResult::failed(error.to_string())
        }
    }
}

async fn collect(request: &CrawlRequest, fetcher: &dyn Fetch) -> Result<CrawlResult, CrawlError> {
    validate_request(request)?;
    let url = Url::parse(&request.url)?;
    let list_selector = parse_selector(&request.list_selector)?;

    tracing::info!("Crawling {} for '{}'", url, request.list_selector);

    let fetch_request = FetchRequest {
        url: &url,
        cookie: request.cookie.as_deref(),
        user_agent: &request.user_agent,
        mode: FetchMode::from_rendered(request.use_rendered_fetch),
        wait_selector: request.wait_selector.as_deref(),
        click_selector: request.click_selector.as_deref(),
    };
    let body = fetcher.fetch(&fetch_request).await?;
    let document = Html::parse_document(&body);

    let items: Vec<_> = document
        .select(&list_selector)
        .take(request.max_items.unwrap_or(usize::MAX))
        .collect();

    if items.is_empty() {
        return Err(CrawlError::ListNotFound {
            selector: request.list_selector.clone(),
        });
    }

    tracing::info!("Found {} items", items.len());

    let traversal = Traversal::new(fetcher, request);
    let mut result = CrawlResult {
        success: true,
        ..CrawlResult::default()
    };

    for (index, item) in items.into_iter().enumerate() {
        let record = traversal
            .extract_record(item, &request.fields, &url, 1, "", &mut result.errors)
            .instrument(tracing::debug_span!("item", index))
            .await;
        result.records.push(record);
    }

    tracing::info!(
        "Extracted {} records with {} field errors",
        result.records.len(),
        result.errors.len()
    );

    Ok(result)
}
