//! Integration tests for the HTTP navigator

use std::time::Duration;
use tag_harvester::config::NavigatorConfig;
use tag_harvester::navigator::{build_http_client, HttpNavigator, NavigatorError, PageNavigator};
use tracing::Span;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_ONE: &str = r#"<html><body>
    <ul class="items">
      <li class="item" data-id="1">  first
         item </li>
      <li class="item" data-id="2">second</li>
    </ul>
    <a id="next" href="/two">next</a>
    <a id="script" href="javascript:void(0)">noop</a>
</body></html>"#;

const PAGE_TWO: &str = r#"<html><body><p class="item">third</p></body></html>"#;

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

fn navigator() -> HttpNavigator {
    let config = NavigatorConfig {
        poll_interval_ms: 20,
        request_timeout_secs: 5,
        ..NavigatorConfig::default()
    };
    let client = build_http_client(&config).unwrap();
    HttpNavigator::new(client, &config, Span::none())
}

async fn server_with_pages() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(html(PAGE_ONE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(html(PAGE_TWO))
        .mount(&server)
        .await;
    server
}

fn url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).unwrap()
}

#[tokio::test]
async fn test_navigate_and_query() {
    let server = server_with_pages().await;
    let mut nav = navigator();

    nav.navigate(&url(&server, "/one")).await.unwrap();
    assert_eq!(nav.current_url(), Some(&url(&server, "/one")));

    let items = nav.query_all(".item").await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(nav.text(&items[0]).await.unwrap(), "first item");
    assert_eq!(
        nav.attribute(&items[1], "data-id").await.unwrap().as_deref(),
        Some("2")
    );
    assert_eq!(nav.attribute(&items[1], "missing").await.unwrap(), None);

    let list = nav.query_all("ul.items").await.unwrap();
    let nested = nav.query_within(&list[0], "li").await.unwrap();
    assert_eq!(nested, items);

    assert!(nav.query_all(".absent").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut nav = navigator();
    let err = nav.navigate(&url(&server, "/gone")).await.unwrap_err();

    assert!(matches!(err, NavigatorError::Status { status: 404, .. }));
    assert!(nav.current_url().is_none());
}

#[tokio::test]
async fn test_click_follows_link() {
    let server = server_with_pages().await;
    let mut nav = navigator();
    nav.navigate(&url(&server, "/one")).await.unwrap();

    let old_items = nav.query_all(".item").await.unwrap();
    let next = nav.query_all("#next").await.unwrap();
    nav.click(&next[0]).await.unwrap();

    assert_eq!(nav.current_url(), Some(&url(&server, "/two")));
    let items = nav.query_all(".item").await.unwrap();
    assert_eq!(nav.text(&items[0]).await.unwrap(), "third");

    // Handles from the previous page no longer resolve
    assert!(matches!(
        nav.text(&old_items[0]).await,
        Err(NavigatorError::StaleHandle)
    ));
}

#[tokio::test]
async fn test_click_on_script_link_is_rejected() {
    let server = server_with_pages().await;
    let mut nav = navigator();
    nav.navigate(&url(&server, "/one")).await.unwrap();

    let script = nav.query_all("#script").await.unwrap();
    let err = nav.click(&script[0]).await.unwrap_err();

    assert!(matches!(err, NavigatorError::NotNavigable { .. }));
    assert_eq!(nav.current_url(), Some(&url(&server, "/one")));
}

#[tokio::test]
async fn test_wait_for_reloads_until_rendered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<html><body><p>Loading…</p></body></html>"))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html(PAGE_TWO))
        .mount(&server)
        .await;

    let mut nav = navigator();
    nav.navigate(&url(&server, "/slow")).await.unwrap();
    assert!(nav.query_all(".item").await.unwrap().is_empty());

    let rendered = nav.wait_for(".item", Duration::from_secs(2)).await.unwrap();
    assert!(rendered);
    assert_eq!(nav.query_all(".item").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_wait_for_times_out() {
    let server = server_with_pages().await;
    let mut nav = navigator();
    nav.navigate(&url(&server, "/two")).await.unwrap();

    let rendered = nav
        .wait_for(".never", Duration::from_millis(100))
        .await
        .unwrap();
    assert!(!rendered);

    // The page is still loaded after a timed-out wait
    assert_eq!(nav.query_all(".item").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_selector() {
    let server = server_with_pages().await;
    let mut nav = navigator();
    nav.navigate(&url(&server, "/one")).await.unwrap();

    assert!(matches!(
        nav.query_all("li[").await,
        Err(NavigatorError::Selector { .. })
    ));
}

#[tokio::test]
async fn test_close_forgets_page() {
    let server = server_with_pages().await;
    let mut nav = navigator();
    nav.navigate(&url(&server, "/one")).await.unwrap();

    nav.close().await.unwrap();

    assert!(nav.current_url().is_none());
    assert!(matches!(nav.query_all("a").await, Err(NavigatorError::NoPage)));
}
