//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end through the real HTTP fetcher.

use site_sweep::config::{Config, FullFrontierPolicy};
use site_sweep::crawler::Coordinator;
use site_sweep::output::CrawlStatistics;
use site_sweep::state::PageState;
use std::collections::HashSet;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with small, fast settings
fn create_test_config(workers: usize, capacity: usize) -> Config {
    let mut config = Config::default();
    config.crawler.workers = workers;
    config.crawler.frontier_capacity = capacity;
    config.crawler.request_timeout_ms = 2_000;
    config
}

/// An HTML response whose body links to each href
fn html_page(links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>Test</title></head><body><p>Some Text</p>{}</body></html>",
            anchors
        ),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, page_path: &str, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html_page(links))
        .mount(server)
        .await;
}

/// Runs a crawl to completion and collects the discovery stream
async fn run_crawl(config: Config, seed: &str) -> (CrawlStatistics, HashSet<String>) {
    let mut coordinator = Coordinator::new(config, seed).expect("Failed to create coordinator");
    let mut discovered = coordinator.subscribe();

    let stats = tokio::time::timeout(Duration::from_secs(20), coordinator.run())
        .await
        .expect("Crawl did not finish in time")
        .expect("Crawl failed");

    let mut urls = HashSet::new();
    while let Some(url) = discovered.recv().await {
        urls.insert(url.to_string());
    }

    (stats, urls)
}

/// Paths the server saw, in arrival order
async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        &[&format!("{}/page1", base_url), "/page2", "page1#section"],
    )
    .await;
    mount_page(&mock_server, "/page1", &["/page2", "/"]).await;
    mount_page(
        &mock_server,
        "/page2",
        &[
            "https://example.com/elsewhere",
            "/logo.png",
            "/assets/site.css",
            "/files/report.PDF",
        ],
    )
    .await;

    let (stats, discovered) = run_crawl(create_test_config(4, 100), &base_url).await;

    let expected: HashSet<String> = ["/", "/page1", "/page2"]
        .iter()
        .map(|p| format!("{}{}", base_url, p))
        .collect();
    assert_eq!(discovered, expected);

    let mut requested = requested_paths(&mock_server).await;
    requested.sort();
    assert_eq!(requested, vec!["/", "/page1", "/page2"]);

    assert_eq!(stats.admitted, 3);
    assert_eq!(stats.processed, 3);
    assert_eq!(stats.count(PageState::Processed), 3);
    assert_eq!(stats.off_domain, 1);
    assert_eq!(stats.media, 3);
    assert!(stats.text_bytes > 0);
    assert!(stats.is_balanced());
    assert!(!stats.cancelled);
}

#[tokio::test]
async fn test_query_and_fragment_variants_fetched_once() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        &["/a?x=1", "/a#top", "/a", "/b/../a", "/%61"],
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page(&["/a?page=2"]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (stats, discovered) = run_crawl(create_test_config(4, 100), &mock_server.uri()).await;

    assert_eq!(discovered.len(), 2);
    assert!(discovered.iter().all(|url| !url.contains('?') && !url.contains('#')));
    assert_eq!(stats.admitted, 2);
    assert_eq!(stats.duplicates, 5);
    assert!(stats.is_balanced());
}

#[tokio::test]
async fn test_other_port_is_off_domain() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        &[&format!("{}/elsewhere", other_server.uri())],
    )
    .await;
    Mock::given(method("GET"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&other_server)
        .await;

    let (stats, discovered) = run_crawl(create_test_config(2, 10), &mock_server.uri()).await;

    assert_eq!(discovered.len(), 1);
    assert_eq!(stats.off_domain, 1);
}

#[tokio::test]
async fn test_error_pages_are_processed() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", &["/missing", "/broken", "/data", "/empty"]).await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{\"a\": 1}", "application/json"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("", "text/html"))
        .mount(&mock_server)
        .await;

    let (stats, _) = run_crawl(create_test_config(2, 10), &mock_server.uri()).await;

    assert_eq!(stats.processed, 5);
    assert_eq!(stats.count(PageState::Processed), 1);
    assert_eq!(stats.count(PageState::HttpError), 2);
    assert_eq!(stats.count(PageState::ContentMismatch), 1);
    assert_eq!(stats.count(PageState::ParseFailed), 1);
    assert!(stats.is_balanced());
}

#[tokio::test]
async fn test_configured_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "SiteSweepTest/1.0"))
        .and(header("accept-language", "de-DE"))
        .respond_with(html_page(&[]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(1, 10);
    config.user_agent.value = "SiteSweepTest/1.0".to_string();
    config.user_agent.accept_language = "de-DE".to_string();

    let (stats, _) = run_crawl(config, &mock_server.uri()).await;

    assert_eq!(stats.count(PageState::Processed), 1);
}

#[tokio::test]
async fn test_request_timeout_marks_unreachable() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", &["/slow"]).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page(&[]).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(2, 10);
    config.crawler.request_timeout_ms = 200;

    let (stats, _) = run_crawl(config, &mock_server.uri()).await;

    assert_eq!(stats.count(PageState::Processed), 1);
    assert_eq!(stats.count(PageState::Unreachable), 1);
    assert!(stats.is_balanced());
}

#[tokio::test]
async fn test_block_policy_with_tiny_frontier() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", &["/1", "/2", "/3", "/4", "/5"]).await;
    for i in 1..=5 {
        mount_page(&mock_server, &format!("/{}", i), &["/"]).await;
    }

    let mut config = create_test_config(3, 1);
    config.crawler.full_frontier_policy = FullFrontierPolicy::Block;

    let (stats, discovered) = run_crawl(config, &mock_server.uri()).await;

    assert_eq!(discovered.len(), 6);
    assert_eq!(stats.count(PageState::Processed), 6);
    assert_eq!(stats.reverted, 0);
    assert!(stats.is_balanced());
}

#[tokio::test]
async fn test_cancellation_stops_slow_crawl() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html_page(&["/next"]).set_delay(Duration::from_secs(30)))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(2, 10);
    config.crawler.request_timeout_ms = 60_000;

    let coordinator = Coordinator::new(config, &mock_server.uri()).unwrap();
    let cancel = coordinator.cancellation_token();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel.cancel();
    });

    let stats = tokio::time::timeout(Duration::from_secs(5), coordinator.run())
        .await
        .expect("Cancellation did not stop the crawl")
        .unwrap();

    assert!(stats.cancelled);
    assert_eq!(stats.count(PageState::Cancelled), 1);
    assert_eq!(stats.processed, 0);
}

#[tokio::test]
async fn test_crawl_entry_point() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", &["/about"]).await;
    mount_page(&mock_server, "/about", &[]).await;

    let stats = site_sweep::crawl(create_test_config(2, 10), &mock_server.uri())
        .await
        .unwrap();

    assert_eq!(stats.processed, 2);
    assert!(stats.scope.starts_with("127.0.0.1:"));
}

#[tokio::test]
async fn test_invalid_seed_is_rejected() {
    let result = Coordinator::new(create_test_config(1, 10), "mailto:someone@example.com");
    assert!(matches!(
        result,
        Err(site_sweep::SweepError::InvalidSeed { .. })
    ));
}
