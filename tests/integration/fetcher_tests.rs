use sitewalk::config::UserAgentConfig;
use sitewalk::crawler::{build_http_client, FetchError, FetchMode, HttpFetcher, PageFetcher};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_fetcher(timeout: Duration, max_redirects: u32) -> HttpFetcher {
    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0".to_string(),
        contact_url: "https://example.com/about".to_string(),
    };
    let client = build_http_client(&user_agent, timeout).expect("Failed to build client");
    HttpFetcher::new(client, max_redirects)
}

fn url_for(server: &MockServer, p: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), p)).expect("Failed to parse URL")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

fn redirect(status: u16, location: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).insert_header("location", location)
}

#[tokio::test]
async fn test_fetch_html_extracts_anchors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><title>Home</title></head><body>
            <a href="/a">A</a><a>No link</a></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = create_fetcher(Duration::from_secs(5), 10);
    let page = fetcher
        .fetch(&url_for(&server, "/"), FetchMode::Expand)
        .await
        .expect("Fetch failed");

    assert_eq!(page.status_code, 200);
    assert_eq!(page.title.as_deref(), Some("Home"));
    assert_eq!(page.anchors.len(), 2);
    assert_eq!(page.anchors[0].href, "/a");
    assert!(!page.anchors[1].href_present);
    assert!(page.redirect_chain.is_empty());
}

#[tokio::test]
async fn test_user_agent_header_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestBot/1.0 (+https://example.com/about)"))
        .respond_with(html("<p>hi</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = create_fetcher(Duration::from_secs(5), 10);
    let page = fetcher
        .fetch(&url_for(&server, "/"), FetchMode::Expand)
        .await
        .expect("Fetch failed");
    assert_eq!(page.status_code, 200);
}

#[tokio::test]
async fn test_redirect_chain_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(redirect(301, "/mid"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/mid"))
        .respond_with(redirect(302, &format!("{}/new", server.uri())))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html(r#"<a href="/x">x</a>"#))
        .mount(&server)
        .await;

    let fetcher = create_fetcher(Duration::from_secs(5), 10);
    let page = fetcher
        .fetch(&url_for(&server, "/old"), FetchMode::Expand)
        .await
        .expect("Fetch failed");

    assert_eq!(page.status_code, 200);
    assert_eq!(page.final_url, url_for(&server, "/new"));
    assert_eq!(
        page.redirect_chain,
        vec![
            url_for(&server, "/mid").to_string(),
            url_for(&server, "/new").to_string()
        ]
    );
    // Anchors are stamped with the page they were actually found on
    assert_eq!(page.anchors[0].found_on, url_for(&server, "/new").as_str());
}

#[tokio::test]
async fn test_redirect_loop_detected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(redirect(301, "/b"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(redirect(301, "/a"))
        .mount(&server)
        .await;

    let fetcher = create_fetcher(Duration::from_secs(5), 10);
    let result = fetcher
        .fetch(&url_for(&server, "/a"), FetchMode::Expand)
        .await;

    assert!(matches!(result, Err(FetchError::RedirectLoop { .. })));
}

#[tokio::test]
async fn test_redirect_limit() {
    let server = MockServer::start().await;
    for (from, to) in [("/r1", "/r2"), ("/r2", "/r3"), ("/r3", "/r4")] {
        Mock::given(method("GET"))
            .and(path(from))
            .respond_with(redirect(302, to))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/r4"))
        .respond_with(html("<p>end</p>"))
        .mount(&server)
        .await;

    let strict = create_fetcher(Duration::from_secs(5), 2);
    let result = strict
        .fetch(&url_for(&server, "/r1"), FetchMode::Expand)
        .await;
    assert!(matches!(result, Err(FetchError::RedirectLimit { .. })));

    let lenient = create_fetcher(Duration::from_secs(5), 3);
    let page = lenient
        .fetch(&url_for(&server, "/r1"), FetchMode::Expand)
        .await
        .expect("Fetch failed");
    assert_eq!(page.redirect_chain.len(), 3);
}

#[tokio::test]
async fn test_not_found_is_a_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_raw(r#"<a href="/x">x</a>"#, "text/html"),
        )
        .mount(&server)
        .await;

    let fetcher = create_fetcher(Duration::from_secs(5), 10);
    let page = fetcher
        .fetch(&url_for(&server, "/gone"), FetchMode::Expand)
        .await
        .expect("404 must not be an error");

    assert_eq!(page.status_code, 404);
    assert!(page.anchors.is_empty());
}

#[tokio::test]
async fn test_non_html_not_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/file.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/x">x</a>"#, "application/pdf"),
        )
        .mount(&server)
        .await;

    let fetcher = create_fetcher(Duration::from_secs(5), 10);
    let page = fetcher
        .fetch(&url_for(&server, "/file.pdf"), FetchMode::Expand)
        .await
        .expect("Fetch failed");

    assert_eq!(page.content_type.as_deref(), Some("application/pdf"));
    assert!(page.anchors.is_empty());
}

#[tokio::test]
async fn test_status_only_skips_parsing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<title>T</title><a href="/x">x</a>"#))
        .mount(&server)
        .await;

    let fetcher = create_fetcher(Duration::from_secs(5), 10);
    let page = fetcher
        .fetch(&url_for(&server, "/"), FetchMode::StatusOnly)
        .await
        .expect("Fetch failed");

    assert_eq!(page.status_code, 200);
    assert!(page.title.is_none());
    assert!(page.anchors.is_empty());
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<p>late</p>").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let fetcher = create_fetcher(Duration::from_millis(200), 10);
    let result = fetcher
        .fetch(&url_for(&server, "/slow"), FetchMode::Expand)
        .await;

    match result {
        Err(error) => assert_eq!(error.kind(), "timeout"),
        Ok(page) => panic!("Expected timeout, got status {}", page.status_code),
    }
}
