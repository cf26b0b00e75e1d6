//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the explorer and run the full
//! discovery → extraction → persistence → checkpoint cycle over HTTP.

use tag_harvester::config::Config;
use tag_harvester::harvest::IconFetcher;
use tag_harvester::navigator::build_http_client;
use tag_harvester::storage::AddressStore;
use tag_harvester::{CheckpointStore, Harvester, HttpNavigator, SqliteStore};
use tempfile::TempDir;
use tracing::Span;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One address block as the explorer renders it
fn block(address: &str, name: Option<&str>, tags: &[&str], icon: Option<&str>) -> String {
    let name = name
        .map(|n| format!(r#"<div class="tags-table-token"><a href="/token/{address}">{n}</a></div>"#))
        .unwrap_or_default();
    let icon = icon
        .map(|src| format!(r#"<img class="tags-table-token-icon" src="{src}">"#))
        .unwrap_or_default();
    let tags: String = tags
        .iter()
        .map(|t| format!(r#"<span class="tag tag__public"><span class="tag_name">{t}</span></span>"#))
        .collect();

    format!(
        r#"<div class="d-flex flex-column flex-fill">
             <div class="d-flex">{icon}{name}</div>
             <div class="tags-table-address"><a class="overflow-center-elips" href="/address/{address}">{address}</a></div>
             <div class="tags-list">{tags}</div>
           </div>"#
    )
}

/// A listing page; `next` is the href of the enabled next-page control
fn listing(blocks: &[String], next: Option<&str>) -> String {
    let pager = match next {
        Some(href) => format!(
            r##"<ul class="pagination">
                 <li class="page-item disabled"><a class="page-link" href="#">‹</a></li>
                 <li class="page-item active"><a class="page-link" href="#">1</a></li>
                 <li class="page-item"><a class="page-link" href="{href}">›</a></li>
               </ul>"##
        ),
        None => r##"<ul class="pagination">
                     <li class="page-item disabled"><a class="page-link" href="#">›</a></li>
                   </ul>"##
            .to_string(),
    };
    format!(
        "<html><body><div class=\"tags-table\">{}</div>{}</body></html>",
        blocks.concat(),
        pager
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.source.base_url = base_url.to_string();
    config.navigator.render_timeout_ms = 150;
    config.navigator.poll_interval_ms = 50;
    config.navigator.settle_delay_ms = 0;
    config.navigator.page_delay_ms = 0;
    config.navigator.request_timeout_secs = 5;
    config
}

fn build_harvester(
    config: Config,
    dir: &TempDir,
    store: SqliteStore,
) -> Harvester<HttpNavigator, SqliteStore> {
    let client = build_http_client(&config.navigator).unwrap();
    let navigator = HttpNavigator::new(client.clone(), &config.navigator, Span::none());
    let icons = IconFetcher::new(
        client,
        Url::parse(&config.source.base_url).unwrap(),
        Span::none(),
    );
    let checkpoint = CheckpointStore::new(dir.path().join("remaining_tags.txt"), Span::none());

    Harvester::new(config, navigator, store, checkpoint, icons, Span::none()).unwrap()
}

fn harvester_for(server: &MockServer, dir: &TempDir) -> Harvester<HttpNavigator, SqliteStore> {
    build_harvester(
        test_config(&server.uri()),
        dir,
        SqliteStore::open_in_memory("ethplorer").unwrap(),
    )
}

fn seed_checkpoint(dir: &TempDir, tags: &[&str]) {
    let store = CheckpointStore::new(dir.path().join("remaining_tags.txt"), Span::none());
    let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    store.save(&tags).unwrap();
}

#[tokio::test]
async fn test_end_to_end_single_tag() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/tag/alpha",
        listing(
            &[
                block("0xAAA", None, &["x"], None),
                block("0xBBB", None, &[], None),
            ],
            None,
        ),
    )
    .await;

    let dir = TempDir::new().unwrap();
    seed_checkpoint(&dir, &["alpha"]);
    let mut harvester = harvester_for(&server, &dir);

    let summary = harvester.run().await.unwrap();
    assert!(summary.is_clean());
    assert_eq!(summary.addresses_persisted, 2);

    let store = harvester.store();
    assert_eq!(store.count_addresses().unwrap(), 2);
    assert_eq!(store.count_unified().unwrap(), 2);
    assert_eq!(store.count_tags().unwrap(), 1);
    assert_eq!(store.count_links().unwrap(), 1);
    assert_eq!(store.tags_for_address("0xAAA").unwrap(), vec!["x"]);
    assert_eq!(store.get_unified("0xAAA").unwrap().unwrap().address_name, "x");
    assert_eq!(store.get_unified("0xBBB").unwrap().unwrap().address_name, "");

    assert!(harvester.checkpoint().load().unwrap().is_empty());
    let raw = std::fs::read_to_string(harvester.checkpoint().path()).unwrap();
    assert_eq!(raw, "");
}

#[tokio::test]
async fn test_pagination_deduplicates_addresses() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/tag/beta",
        listing(
            &[
                block("0x1", Some("One"), &["beta"], None),
                block("0x2", Some("Two"), &["beta"], None),
            ],
            Some("/tag/beta/2"),
        ),
    )
    .await;
    mount_page(
        &server,
        "/tag/beta/2",
        listing(
            &[
                block("0x2", Some("Two again"), &["beta", "late"], None),
                block("0x3", None, &["beta"], None),
            ],
            None,
        ),
    )
    .await;

    let dir = TempDir::new().unwrap();
    seed_checkpoint(&dir, &["beta"]);
    let mut harvester = harvester_for(&server, &dir);

    let summary = harvester.run().await.unwrap();
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.addresses_persisted, 3);

    let store = harvester.store();
    assert_eq!(store.count_addresses().unwrap(), 3);
    assert_eq!(
        store.get_address("0x2").unwrap().unwrap().name.as_deref(),
        Some("Two")
    );
    assert_eq!(store.tags_for_address("0x2").unwrap(), vec!["beta"]);
    assert_eq!(store.count_tags().unwrap(), 1);
    assert!(harvester.checkpoint().load().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_tag_is_removed() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/tag/empty",
        "<html><body><p>No addresses found</p></body></html>".to_string(),
    )
    .await;
    mount_page(
        &server,
        "/tag/alpha",
        listing(&[block("0xAAA", None, &["x"], None)], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    seed_checkpoint(&dir, &["empty", "alpha"]);
    let mut harvester = harvester_for(&server, &dir);

    let summary = harvester.run().await.unwrap();

    assert_eq!(summary.tags_completed, 2);
    assert!(summary.aborted_tags.is_empty());
    assert!(harvester.checkpoint().load().unwrap().is_empty());
    assert_eq!(harvester.store().count_addresses().unwrap(), 1);
}

#[tokio::test]
async fn test_page_failure_keeps_tag_pending() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/tag/gamma",
        listing(&[block("0xG1", Some("G"), &["gamma"], None)], Some("/tag/gamma/2")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/tag/gamma/2"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/tag/delta",
        listing(&[block("0xD1", None, &["delta"], None)], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    seed_checkpoint(&dir, &["gamma", "delta"]);
    let mut harvester = harvester_for(&server, &dir);

    let summary = harvester.run().await.unwrap();

    assert_eq!(summary.aborted_tags, vec!["gamma"]);
    assert_eq!(summary.tags_completed, 1);
    assert_eq!(harvester.checkpoint().load().unwrap(), vec!["gamma"]);

    // Records from the pages that did load stay committed
    let store = harvester.store();
    assert!(store.get_address("0xG1").unwrap().is_some());
    assert!(store.get_address("0xD1").unwrap().is_some());
}

#[tokio::test]
async fn test_discovery_seeds_checkpoint() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/tag",
        r#"<html><body><div class="word-cloud">
             <span class="word-cloud-item"><a href="/tag/alpha">alpha</a></span>
             <span class="word-cloud-item"><a href="/tag/missing">missing</a></span>
           </div></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        &server,
        "/tag/alpha",
        listing(&[block("0xAAA", Some("Alpha"), &["alpha"], None)], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut harvester = harvester_for(&server, &dir);

    let summary = harvester.run().await.unwrap();

    assert_eq!(summary.tags_pending, 2);
    assert_eq!(summary.tags_completed, 1);
    assert_eq!(summary.aborted_tags, vec!["missing"]);
    assert_eq!(harvester.checkpoint().load().unwrap(), vec!["missing"]);
    assert_eq!(harvester.store().count_addresses().unwrap(), 1);
}

#[tokio::test]
async fn test_failed_discovery_means_no_work() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tag"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut harvester = harvester_for(&server, &dir);

    let summary = harvester.run().await.unwrap();

    assert_eq!(summary.tags_pending, 0);
    assert!(summary.is_clean());
    assert_eq!(harvester.store().count_addresses().unwrap(), 0);
}

#[tokio::test]
async fn test_icons_are_fetched_and_qualified() {
    let server = MockServer::start().await;
    let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a];

    mount_page(
        &server,
        "/tag/icons",
        listing(
            &[
                block("0xI1", Some("With"), &["icons"], Some("/images/ok.png")),
                block("0xI2", Some("Broken"), &["icons"], Some("/images/missing.png")),
                block("0xI3", Some("Inline"), &["icons"], Some("data:image/png;base64,AAAA")),
            ],
            None,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/images/ok.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/images/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    seed_checkpoint(&dir, &["icons"]);
    let mut harvester = harvester_for(&server, &dir);

    let summary = harvester.run().await.unwrap();
    assert_eq!(summary.addresses_persisted, 3);

    let store = harvester.store();

    let ok = store.get_address("0xI1").unwrap().unwrap();
    assert_eq!(ok.icon, Some(png));
    assert_eq!(
        ok.icon_url,
        Some(format!("{}/images/ok.png", server.uri()))
    );

    let broken = store.get_address("0xI2").unwrap().unwrap();
    assert_eq!(broken.icon, None);
    assert_eq!(
        broken.icon_url,
        Some(format!("{}/images/missing.png", server.uri()))
    );

    let inline = store.get_address("0xI3").unwrap().unwrap();
    assert_eq!(inline.icon, None);
    assert_eq!(inline.icon_url.as_deref(), Some("data:image/png;base64,AAAA"));
}

#[tokio::test]
async fn test_site_below_a_base_path() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/explorer/tag/nft",
        listing(&[block("0xN1", Some("Nifty"), &["nft"], Some("/images/n.png"))], None),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/explorer/images/n.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7, 7]))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    seed_checkpoint(&dir, &["nft"]);
    let base = format!("{}/explorer", server.uri());
    let mut harvester = build_harvester(
        test_config(&base),
        &dir,
        SqliteStore::open_in_memory("ethplorer").unwrap(),
    );

    let summary = harvester.run().await.unwrap();
    assert!(summary.is_clean());

    let row = harvester.store().get_address("0xN1").unwrap().unwrap();
    assert_eq!(row.icon, Some(vec![7, 7]));
    assert_eq!(row.icon_url, Some(format!("{}/images/n.png", base)));
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/tag/alpha",
        listing(
            &[
                block("0xAAA", Some("Alpha"), &["x", "y"], None),
                block("0xBBB", None, &["x"], None),
            ],
            None,
        ),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("addresses.db");

    for _ in 0..2 {
        seed_checkpoint(&dir, &["alpha"]);
        let store = SqliteStore::open(&db_path, "ethplorer").unwrap();
        let mut harvester = build_harvester(test_config(&server.uri()), &dir, store);
        harvester.run().await.unwrap();
    }

    let store = SqliteStore::open(&db_path, "ethplorer").unwrap();
    assert_eq!(store.count_addresses().unwrap(), 2);
    assert_eq!(store.count_unified().unwrap(), 2);
    assert_eq!(store.count_tags().unwrap(), 2);
    assert_eq!(store.count_links().unwrap(), 3);
}

#[tokio::test]
async fn test_icon_fetcher_never_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/i/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/i/empty.png"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let client = build_http_client(&config.navigator).unwrap();
    let fetcher = IconFetcher::new(client, Url::parse(&server.uri()).unwrap(), Span::none());

    assert_eq!(fetcher.fetch("/i/logo.png").await, Some(vec![1, 2, 3]));
    assert_eq!(fetcher.fetch("i/logo.png").await, Some(vec![1, 2, 3]));
    assert_eq!(fetcher.fetch("/i/nothing.png").await, None);
    assert_eq!(fetcher.fetch("/i/empty.png").await, None);
    assert_eq!(fetcher.fetch("").await, None);

    let unreachable = Url::parse("http://127.0.0.1:9/i.png").unwrap();
    assert_eq!(fetcher.fetch_url(&unreachable).await, None);
}
