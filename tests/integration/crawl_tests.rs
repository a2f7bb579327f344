//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run whole crawls
//! through the real HTTP fetcher.

use linkwalk::config::{CrawlRequest, FieldSpec, HttpConfig, NavigationSpec};
use linkwalk::crawler::{crawl, crawl_with_timeout, DocumentFetcher, HttpFetcher};
use linkwalk::output::{write_json, Value};
use std::time::Duration;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn fetcher() -> DocumentFetcher {
    DocumentFetcher::new(HttpFetcher::new(&HttpConfig::default()).expect("Failed to build client"))
}

/// Mounts a list page with two products, each linking to a detail page
async fn mount_catalog(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(html(
            r#"<ul>
                <li class="product"><h2 class="name">Lamp</h2><a class="more" href="/products/1">Details</a></li>
                <li class="product"><h2 class="name">Desk</h2><a class="more" href="/products/2">Details</a></li>
            </ul>"#,
        ))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products/1"))
        .respond_with(html(
            r#"<main><p class="price">19.00</p><div class="description"><b>Warm</b> light</div></main>"#,
        ))
        .mount(mock_server)
        .await;
}

fn catalog_request(base_url: &str) -> CrawlRequest {
    CrawlRequest::new(format!("{}/products", base_url), ".product")
        .with_field(FieldSpec::text("name", ".name"))
        .with_field(FieldSpec::navigate(
            "detail",
            ".more",
            NavigationSpec::new(".more")
                .with_target("main")
                .with_fields(vec![
                    FieldSpec::text("price", ".price"),
                    FieldSpec::markup("description", ".description"),
                ]),
        ))
}

#[tokio::test]
async fn test_full_crawl_with_navigation() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/products/2"))
        .respond_with(html(r#"<main><p class="price">85.50</p></main>"#))
        .mount(&mock_server)
        .await;

    let result = crawl(&catalog_request(&mock_server.uri()), &fetcher()).await;

    assert!(result.success, "errors: {:?}", result.errors);
    assert!(result.errors.is_empty());
    assert_eq!(result.records.len(), 2);

    let lamp = &result.records[0];
    assert_eq!(lamp.get("name"), Some(&Value::from("Lamp")));
    let detail = lamp.get("detail").and_then(Value::as_record).unwrap();
    assert_eq!(detail.get("price"), Some(&Value::from("19.00")));
    assert_eq!(
        detail.get("description"),
        Some(&Value::from("<b>Warm</b> light"))
    );

    let desk = &result.records[1];
    assert_eq!(desk.get("name"), Some(&Value::from("Desk")));
    let detail = desk.get("detail").and_then(Value::as_record).unwrap();
    assert_eq!(detail.get("price"), Some(&Value::from("85.50")));
    assert_eq!(detail.get("description"), Some(&Value::Null));
}

#[tokio::test]
async fn test_navigation_failure_is_isolated() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/products/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let result = crawl(&catalog_request(&mock_server.uri()), &fetcher()).await;

    assert!(result.success);
    assert_eq!(result.records.len(), 2);
    assert!(result.records[0].get("detail").and_then(Value::as_record).is_some());
    assert_eq!(result.records[1].get("name"), Some(&Value::from("Desk")));
    assert_eq!(result.records[1].get("detail"), Some(&Value::Null));

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Field 'detail': "));
    assert!(result.errors[0].contains("HTTP 500"));
}

#[tokio::test]
async fn test_user_agent_and_cookie_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/list"))
        .and(header("user-agent", "TestAgent/1.0"))
        .and(header("cookie", "session=abc; theme=dark"))
        .respond_with(html(r#"<p class="row">one</p>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = CrawlRequest::new(format!("{}/list", mock_server.uri()), ".row")
        .with_field(FieldSpec::text("text", "*"))
        .with_user_agent("TestAgent/1.0")
        .with_cookie(" session=abc ; ;theme=dark; ");

    let result = crawl(&request, &fetcher()).await;
    assert!(result.success, "errors: {:?}", result.errors);
}

#[tokio::test]
async fn test_no_cookie_header_without_cookie() {
    let mock_server = MockServer::start().await;

    // Mounted first so it takes precedence for any request carrying a cookie
    Mock::given(method("GET"))
        .and(header_exists("cookie"))
        .respond_with(ResponseTemplate::new(400))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(html(r#"<p class="row"><span>one</span></p>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = CrawlRequest::new(format!("{}/list", mock_server.uri()), ".row")
        .with_field(FieldSpec::text("text", "span"));

    let result = crawl(&request, &fetcher()).await;
    assert!(result.success);
    assert_eq!(result.records[0].get("text"), Some(&Value::from("one")));
}

#[tokio::test]
async fn test_list_page_not_found_fails_crawl() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let request = CrawlRequest::new(format!("{}/gone", mock_server.uri()), ".item")
        .with_field(FieldSpec::text("title", ".title"));

    let result = crawl(&request, &fetcher()).await;

    assert!(!result.success);
    assert!(result.records.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("HTTP 404"));
}

#[tokio::test]
async fn test_rendered_crawl_without_renderer_fails() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let request = catalog_request(&mock_server.uri()).with_rendered_fetch(true);
    let result = crawl(&request, &fetcher()).await;

    assert!(!result.success);
    assert!(result.errors[0].contains("no renderer is configured"));
}

#[tokio::test]
async fn test_crawl_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html(r#"<p class="row">late</p>"#).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let request = CrawlRequest::new(format!("{}/slow", mock_server.uri()), ".row")
        .with_field(FieldSpec::text("text", "*"));

    let result = crawl_with_timeout(&request, &fetcher(), Duration::from_millis(200)).await;

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("timeout"));
}

#[tokio::test]
async fn test_result_serializes_in_schema_order() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let request = CrawlRequest::new(format!("{}/products", mock_server.uri()), ".product")
        .with_field(FieldSpec::text("name", ".name"))
        .with_field(FieldSpec::attribute("href", ".more", "href"))
        .with_max_items(1);

    let result = crawl(&request, &fetcher()).await;

    let mut buffer = Vec::new();
    write_json(&result, &mut buffer, false).unwrap();
    assert_eq!(
        String::from_utf8(buffer).unwrap(),
        "{\"success\":true,\"records\":[{\"name\":\"Lamp\",\"href\":\"/products/1\"}],\"errors\":[]}\n"
    );
}
