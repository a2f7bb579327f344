//! Rendered fetch strategy backed by a WebDriver server
//!
//! Every fetch opens its own WebDriver session, so no browser state leaks
//! between hops, and closes it before returning on both the success and the
//! failure path.

use crate::config::RenderConfig;
use crate::crawler::fetcher::{browser_cookies, BrowserCookie, FetchRequest};
use crate::FetchError;
use fantoccini::cookies::Cookie;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::time::timeout;

/// Interval between readiness polls
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Fetches documents by driving a real browser
#[derive(Debug, Clone)]
pub struct RenderedFetcher {
    config: RenderConfig,
}

impl RenderedFetcher {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Renders a URL and returns the serialized document
    ///
    /// # Request Flow
    ///
    /// 1. Open a fresh WebDriver session with the request's user agent
    /// 2. Navigate, install host-scoped cookies, reload, wait for `readyState`
    /// 3. Wait for `wait_selector` if given (bounded; failure is fatal)
    /// 4. Click `click_selector` if given, then wait for navigation (bounded; failure tolerated)
    /// 5. Capture the page source
    /// 6. Close the session, whatever happened above
    pub async fn render(&self, request: &FetchRequest<'_>) -> Result<String, FetchError> {
        let client = self.connect(request.user_agent).await?;

        let outcome = self.capture(&client, request).await;

        if let Err(e) = client.close().await {
            tracing::warn!("Failed to close WebDriver session for {}: {}", request.url, e);
        }

        outcome
    }

    async fn connect(&self, user_agent: &str) -> Result<Client, FetchError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(browser_capabilities(self.config.headless, user_agent));

        let client = builder
            .connect(&self.config.webdriver_url)
            .await
            .map_err(|e| {
                FetchError::Session(format!(
                    "failed to connect to WebDriver at {}: {}",
                    self.config.webdriver_url, e
                ))
            })?;

        tracing::debug!("Opened WebDriver session at {}", self.config.webdriver_url);
        Ok(client)
    }

    async fn capture(&self, client: &Client, request: &FetchRequest<'_>) -> Result<String, FetchError> {
        let url = request.url.as_str();
        let page_load = Duration::from_secs(self.config.page_load_timeout_secs);

        self.navigate(client, url).await?;

        if let Some(raw) = request.cookie {
            let cookies = browser_cookies(raw, request.url);
            if !cookies.is_empty() {
                for cookie in cookies {
                    client
                        .add_cookie(webdriver_cookie(cookie))
                        .await
                        .map_err(|e| render_error(url, format!("failed to set cookie: {}", e)))?;
                }

                match timeout(page_load, client.refresh()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => return Err(render_error(url, format!("reload failed: {}", e))),
                    Err(_) => {
                        return Err(FetchError::Timeout {
                            url: url.to_string(),
                        })
                    }
                }
                wait_for_ready_state(client, page_load).await;
            }
        }

        if let Some(selector) = request.wait_selector {
            client
                .wait()
                .at_most(Duration::from_secs(self.config.wait_timeout_secs))
                .for_element(Locator::Css(selector))
                .await
                .map_err(|e| {
                    render_error(url, format!("timed out waiting for '{}': {}", selector, e))
                })?;
        }

        if let Some(selector) = request.click_selector {
            self.click_and_wait(client, url, selector).await?;
        }

        client
            .source()
            .await
            .map_err(|e| render_error(url, format!("failed to read page source: {}", e)))
    }

    async fn navigate(&self, client: &Client, url: &str) -> Result<(), FetchError> {
        let page_load = Duration::from_secs(self.config.page_load_timeout_secs);
        tracing::debug!("Rendering {}", url);

        match timeout(page_load, client.goto(url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(render_error(url, format!("navigation failed: {}", e))),
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
        }

        if !wait_for_ready_state(client, page_load).await {
            tracing::warn!("{} did not finish loading in time; continuing", url);
        }
        Ok(())
    }

    async fn click_and_wait(&self, client: &Client, url: &str, selector: &str) -> Result<(), FetchError> {
        let before = client
            .current_url()
            .await
            .map(|current| current.to_string())
            .unwrap_or_else(|_| url.to_string());

        let element = client
            .find(Locator::Css(selector))
            .await
            .map_err(|e| render_error(url, format!("click target '{}' not found: {}", selector, e)))?;
        element
            .click()
            .await
            .map_err(|e| render_error(url, format!("click on '{}' failed: {}", selector, e)))?;

        let limit = Duration::from_secs(self.config.click_wait_timeout_secs);
        if !wait_for_navigation(client, &before, limit).await {
            tracing::warn!(
                "No navigation after clicking '{}' on {}; using current document",
                selector,
                url
            );
        }
        wait_for_ready_state(client, limit).await;
        Ok(())
    }
}

/// Polls `document.readyState` until it is `complete`; false on timeout
async fn wait_for_ready_state(client: &Client, limit: Duration) -> bool {
    let poll = async {
        loop {
            match client.execute("return document.readyState", vec![]).await {
                Ok(Value::String(state)) if state == "complete" => return,
                Ok(_) => {}
                Err(e) => tracing::trace!("readyState poll failed: {}", e),
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    };
    timeout(limit, poll).await.is_ok()
}

/// Polls the current URL until it differs from `previous`; false on timeout
async fn wait_for_navigation(client: &Client, previous: &str, limit: Duration) -> bool {
    let poll = async {
        loop {
            if let Ok(current) = client.current_url().await {
                if current.as_str() != previous {
                    return;
                }
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    };
    timeout(limit, poll).await.is_ok()
}

/// Session capabilities for Chrome and Firefox drivers
///
/// Vendor-prefixed keys a driver does not understand are ignored by it.
pub fn browser_capabilities(headless: bool, user_agent: &str) -> Map<String, Value> {
    let mut chrome_args = vec![
        format!("--user-agent={}", user_agent),
        "--disable-gpu".to_string(),
        "--no-sandbox".to_string(),
    ];
    let mut firefox_args = Vec::new();

    if headless {
        chrome_args.push("--headless=new".to_string());
        firefox_args.push("-headless".to_string());
    }

    let mut capabilities = Map::new();
    capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": chrome_args }));
    capabilities.insert(
        "moz:firefoxOptions".to_string(),
        json!({
            "args": firefox_args,
            "prefs": { "general.useragent.override": user_agent },
        }),
    );
    capabilities
}

/// Converts a host-scoped cookie into the WebDriver cookie type
pub fn webdriver_cookie(cookie: BrowserCookie) -> Cookie<'static> {
    let mut webdriver_cookie = Cookie::new(cookie.name, cookie.value);
    webdriver_cookie.set_domain(cookie.domain);
    webdriver_cookie.set_path("/");
    webdriver_cookie
}

fn render_error(url: &str, message: String) -> FetchError {
    FetchError::Render {
        url: url.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_capabilities() {
        let capabilities = browser_capabilities(true, "TestAgent/1.0");

        let chrome_args = capabilities["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap();
        assert!(chrome_args.contains(&json!("--headless=new")));
        assert!(chrome_args.contains(&json!("--user-agent=TestAgent/1.0")));

        let firefox = &capabilities["moz:firefoxOptions"];
        assert_eq!(firefox["args"], json!(["-headless"]));
        assert_eq!(
            firefox["prefs"]["general.useragent.override"],
            json!("TestAgent/1.0")
        );
    }

    #[test]
    fn test_headed_capabilities() {
        let capabilities = browser_capabilities(false, "TestAgent/1.0");
        let chrome_args = capabilities["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap();
        assert!(!chrome_args.contains(&json!("--headless=new")));
        assert_eq!(capabilities["moz:firefoxOptions"]["args"], json!([]));
    }

    #[test]
    fn test_webdriver_cookie_is_host_scoped() {
        let cookie = webdriver_cookie(BrowserCookie {
            name: "session".to_string(),
            value: "abc".to_string(),
            domain: "shop.example.com".to_string(),
        });

        assert_eq!(cookie.name(), "session");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.domain(), Some("shop.example.com"));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[tokio::test]
    async fn test_unreachable_webdriver_is_session_error() {
        let fetcher = RenderedFetcher::new(RenderConfig {
            webdriver_url: "http://127.0.0.1:9".to_string(),
            ..RenderConfig::default()
        });
        let url = url::Url::parse("https://example.com/").unwrap();

        let result = fetcher.render(&FetchRequest::get(&url, "TestAgent/1.0")).await;
        assert!(matches!(result, Err(FetchError::Session(_))));
    }
}
