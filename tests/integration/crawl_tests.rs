use sitewalk::config::Config;
use sitewalk::crawler::{crawl, crawl_seed_until};
use sitewalk::output::{load_report, JsonOutputHandler, OutputHandler, StopReason};
use sitewalk::{LinkKind, SeedContext, UrlError, WalkError};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.max_concurrent_fetches = 4;
    config.crawler.request_timeout_secs = 5;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "1.0.0".to_string();
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(body, "text/html")
}

async fn mount_page(server: &MockServer, p: &str, body: String, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(p))
        .respond_with(html(body))
        .expect(expected_hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    // Start a mock server
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Index page with every kind of link
    mount_page(
        &mock_server,
        "/",
        format!(
            r##"<html><head><title>Home</title></head><body>
            <a href="/page1">Page 1</a>
            <a href="page2">Page 2</a>
            <a href="{}/page1/">Page 1 again</a>
            <a href="#top">Top</a>
            <a href="mailto:team@example.com">Mail</a>
            <a class="btn">Download PDF</a>
            </body></html>"##,
            base_url
        ),
        1,
    )
    .await;

    mount_page(
        &mock_server,
        "/page1",
        r#"<html><head><title>Page 1</title></head><body><a href="/">Home</a></body></html>"#
            .to_string(),
        1,
    )
    .await;

    mount_page(
        &mock_server,
        "/page2",
        r#"<html><head><title>Page 2</title></head><body><a href="page1">1</a></body></html>"#
            .to_string(),
        1,
    )
    .await;

    let report = crawl(&create_test_config(), &base_url, None)
        .await
        .expect("Crawl failed");

    assert!(report.completed);
    assert_eq!(report.stop_reason, StopReason::Completed);
    assert_eq!(report.outstanding, 0);
    assert_eq!(report.seed, base_url);

    let results = &report.results;
    assert_eq!(
        results.internal_pages.len(),
        3,
        "Expected 3 internal pages, got {:?}",
        results.internal_pages
    );
    assert!(results.external_pages.is_empty());
    assert!(results
        .internal_pages
        .iter()
        .all(|p| p.classification == LinkKind::Internal && p.status_code == 200));

    let titles: Vec<_> = results
        .internal_pages
        .iter()
        .filter_map(|p| p.title.as_deref())
        .collect();
    assert!(titles.contains(&"Home"));
    assert!(titles.contains(&"Page 2"));

    assert_eq!(results.missing_href.len(), 1);
    assert_eq!(results.missing_href[0].inner_text, "Download PDF");
    assert_eq!(results.out_of_scope_links.len(), 1);
    assert!(results.malformed_links.is_empty());
    assert!(results.failed_visits.is_empty());

    assert!(report.seen_urls.contains_key("/page1"));
    assert!(report.seen_urls.contains_key("/page1/"));
}

#[tokio::test]
async fn test_external_link_checked_not_expanded() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<a href="{0}/ext">External</a><a href="{0}/ext">Again</a>"#,
            other_server.uri()
        ),
        1,
    )
    .await;

    mount_page(
        &other_server,
        "/ext",
        r#"<a href="/deeper">Deeper</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(&other_server, "/deeper", String::new(), 0).await;

    let report = crawl(&create_test_config(), &mock_server.uri(), None)
        .await
        .expect("Crawl failed");

    assert_eq!(report.results.internal_pages.len(), 1);
    assert_eq!(report.results.external_pages.len(), 1);

    let external = &report.results.external_pages[0];
    assert_eq!(external.classification, LinkKind::External);
    assert_eq!(external.status_code, 200);
    assert!(!external.relative);
}

#[tokio::test]
async fn test_redirect_recorded_in_report() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/old">Old</a>"#.to_string(), 1).await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/new", r#"<a href="/leaf">Leaf</a>"#.to_string(), 1).await;
    mount_page(&mock_server, "/leaf", "<p>leaf</p>".to_string(), 1).await;

    let report = crawl(&create_test_config(), &base_url, None)
        .await
        .expect("Crawl failed");

    let moved = report
        .results
        .internal_pages
        .iter()
        .find(|p| p.requested_href == "/old")
        .expect("Redirected page missing from report");

    assert_eq!(moved.status_code, 200);
    assert_eq!(moved.resolved_url, format!("{}/new", base_url));
    assert_eq!(moved.redirect_chain, vec![format!("{}/new", base_url)]);

    // Anchors of the redirect target are followed
    assert_eq!(report.results.internal_pages.len(), 3);
}

#[tokio::test]
async fn test_broken_links_reported() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/missing">Missing</a><a href="http://">Bad</a>"#.to_string(),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = crawl(&create_test_config(), &mock_server.uri(), None)
        .await
        .expect("Crawl failed");

    let missing = report
        .results
        .internal_pages
        .iter()
        .find(|p| p.requested_href == "/missing")
        .expect("404 page missing from report");
    assert_eq!(missing.status_code, 404);

    assert_eq!(report.results.malformed_links.len(), 1);
    assert_eq!(report.results.malformed_links[0].href, "http://");
}

#[tokio::test]
async fn test_query_strings_share_identity_by_default() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/list?page=1">1</a><a href="/list?page=2">2</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/list", "<p>list</p>".to_string(), 1).await;

    let report = crawl(&create_test_config(), &mock_server.uri(), None)
        .await
        .expect("Crawl failed");

    assert_eq!(report.results.internal_pages.len(), 2);
}

#[tokio::test]
async fn test_query_strings_kept_when_configured() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/list?page=1">1</a><a href="/list?page=2">2</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/list", "<p>list</p>".to_string(), 2).await;

    let mut config = create_test_config();
    config.crawler.strip_query = false;

    let report = crawl(&config, &mock_server.uri(), None)
        .await
        .expect("Crawl failed");

    assert_eq!(report.results.internal_pages.len(), 3);
}

#[tokio::test]
async fn test_parsed_seed_keeps_its_query_setting() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/list?page=1">1</a><a href="/list?page=2">2</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/list", "<p>list</p>".to_string(), 2).await;

    // The config strips queries; the seed was built to keep them
    let config = create_test_config();
    assert!(config.crawler.strip_query);
    let seed = SeedContext::parse(&mock_server.uri())
        .expect("Invalid seed")
        .with_query_stripping(false);

    let report = crawl_seed_until(&config, seed, None, std::future::pending::<()>())
        .await
        .expect("Crawl failed");

    assert_eq!(report.results.internal_pages.len(), 3);
}

#[tokio::test]
async fn test_deadline_produces_partial_report() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/slow">Slow</a>"#.to_string(), 1).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<p>late</p>".to_string()).set_delay(Duration::from_secs(4)))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.crawler.run_deadline_secs = 1;

    let started = Instant::now();
    let report = crawl(&config, &mock_server.uri(), None)
        .await
        .expect("Crawl failed");

    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(!report.completed);
    assert_eq!(report.stop_reason, StopReason::Deadline);
    assert_eq!(report.outstanding, 1);
    assert_eq!(report.results.internal_pages.len(), 1);
}

#[tokio::test]
async fn test_invalid_seed_is_fatal() {
    let result = crawl(&create_test_config(), "example.com", None).await;
    assert!(matches!(
        result,
        Err(WalkError::Url(UrlError::NotAbsolute(_)))
    ));

    let result = crawl(&create_test_config(), "ftp://example.com/", None).await;
    assert!(matches!(
        result,
        Err(WalkError::Url(UrlError::InvalidScheme(_)))
    ));
}

#[tokio::test]
async fn test_report_written_to_file() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", r#"<a href="/a">A</a>"#.to_string(), 1).await;
    mount_page(&mock_server, "/a", "<p>a</p>".to_string(), 1).await;

    let report = crawl(
        &create_test_config(),
        &mock_server.uri(),
        Some("abc123".to_string()),
    )
    .await
    .expect("Crawl failed");

    let dir = TempDir::new().expect("Failed to create temp dir");
    let report_path = dir.path().join("crawl-report.json");
    JsonOutputHandler::new(&report_path)
        .write_report(&report)
        .expect("Failed to write report");

    let loaded = load_report(&report_path).expect("Failed to read report");
    assert_eq!(loaded, report);
    assert_eq!(loaded.config_hash.as_deref(), Some("abc123"));

    let raw = std::fs::read_to_string(&report_path).expect("Failed to read file");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("Invalid JSON");
    for field in [
        "internal_pages",
        "external_pages",
        "missing_href",
        "malformed_links",
        "out_of_scope_links",
        "failed_visits",
        "seen_urls",
    ] {
        assert!(json.get(field).is_some(), "missing field {}", field);
    }
}
