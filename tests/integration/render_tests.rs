//! Integration tests for rendered fetches
//!
//! A wiremock server stands in for the WebDriver endpoint, so session
//! lifecycle can be checked without a browser.

use linkwalk::config::RenderConfig;
use linkwalk::crawler::{FetchRequest, RenderedFetcher};
use linkwalk::FetchError;
use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_URL: &str = "https://example.com/";

fn webdriver_ok(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "value": value }))
}

fn webdriver_error(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(500).set_body_json(json!({
        "value": { "error": "unknown error", "message": message, "stacktrace": "" }
    }))
}

fn fetcher(mock_server: &MockServer) -> RenderedFetcher {
    RenderedFetcher::new(RenderConfig {
        webdriver_url: mock_server.uri(),
        page_load_timeout_secs: 5,
        wait_timeout_secs: 1,
        click_wait_timeout_secs: 1,
        ..RenderConfig::default()
    })
}

/// Mounts session creation, current URL, and the session close expected exactly once
async fn mount_session(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(webdriver_ok(json!({ "sessionId": "s1", "capabilities": {} })))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/session/s1/url"))
        .respond_with(webdriver_ok(json!(PAGE_URL)))
        .mount(mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/session/s1"))
        .respond_with(webdriver_ok(Value::Null))
        .expect(1)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_session_closed_when_navigation_fails() {
    let mock_server = MockServer::start().await;
    mount_session(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/session/s1/url"))
        .respond_with(webdriver_error("navigation refused"))
        .mount(&mock_server)
        .await;

    let url = Url::parse(PAGE_URL).unwrap();
    let result = fetcher(&mock_server)
        .render(&FetchRequest::get(&url, "TestAgent/1.0"))
        .await;

    assert!(matches!(result, Err(FetchError::Render { .. })), "{:?}", result);
}

#[tokio::test]
async fn test_click_without_navigation_still_captures_source() {
    let mock_server = MockServer::start().await;
    mount_session(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/session/s1/url"))
        .respond_with(webdriver_ok(Value::Null))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/session/s1/execute/sync"))
        .respond_with(webdriver_ok(json!("complete")))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/session/s1/element"))
        .respond_with(webdriver_ok(
            json!({ "element-6066-11e4-a52e-4f735466cecf": "e1" }),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/session/s1/element/e1/click"))
        .respond_with(webdriver_ok(Value::Null))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/session/s1/source"))
        .respond_with(webdriver_ok(json!("<html><body>clicked</body></html>")))
        .mount(&mock_server)
        .await;

    let url = Url::parse(PAGE_URL).unwrap();
    let request = FetchRequest {
        click_selector: Some(".load-more"),
        ..FetchRequest::get(&url, "TestAgent/1.0")
    };
    let source = fetcher(&mock_server).render(&request).await.unwrap();

    assert!(source.contains("clicked"));
}

#[tokio::test]
async fn test_session_closed_when_click_target_missing() {
    let mock_server = MockServer::start().await;
    mount_session(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/session/s1/url"))
        .respond_with(webdriver_ok(Value::Null))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/session/s1/execute/sync"))
        .respond_with(webdriver_ok(json!("complete")))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/session/s1/element"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "value": { "error": "no such element", "message": "not found", "stacktrace": "" }
        })))
        .mount(&mock_server)
        .await;

    let url = Url::parse(PAGE_URL).unwrap();
    let request = FetchRequest {
        click_selector: Some(".missing"),
        ..FetchRequest::get(&url, "TestAgent/1.0")
    };
    let result = fetcher(&mock_server).render(&request).await;

    assert!(matches!(result, Err(FetchError::Render { .. })), "{:?}", result);
}
