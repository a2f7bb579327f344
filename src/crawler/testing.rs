//! In-memory fetcher for engine tests

use crate::crawler::fetcher::{Fetch, FetchMode, FetchRequest};
use crate::FetchError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// A fetch as observed by [`MockFetcher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFetch {
    pub url: String,
    pub mode: FetchMode,
    pub cookie: Option<String>,
    pub wait_selector: Option<String>,
}

/// Serves canned documents keyed by absolute URL; unknown URLs answer 404
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<RecordedFetch>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn requests(&self) -> Vec<RecordedFetch> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|fetch| fetch.url).collect()
    }
}

#[async_trait]
impl Fetch for MockFetcher {
    async fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(RecordedFetch {
            url: request.url.to_string(),
            mode: request.mode,
            cookie: request.cookie.map(str::to_string),
            wait_selector: request.wait_selector.map(str::to_string),
        });

        self.pages
            .get(request.url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: request.url.to_string(),
                status: 404,
            })
    }
}
