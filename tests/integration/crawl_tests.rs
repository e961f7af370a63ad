//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! orchestrator + HTTP fetcher cycle end-to-end.

use harvestman::config::{parse_settings, CrawlPolicy, OverrideEntry};
use harvestman::crawler::{
    CancelToken, CrawlRequest, HttpFetcher, Orchestrator, OverrideTable, RenderOptions,
};
use harvestman::state::{FetchErrorKind, PageStatus, StopReason};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html_page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        r#"<html><head><title>{}</title><meta name="description" content="{} page"></head><body><p>{} body text</p>{}</body></html>"#,
        title, title, title, anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, title: &str, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page(title, links))
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn request(seed: &str, policy: CrawlPolicy) -> CrawlRequest {
    CrawlRequest {
        seed_url: seed.to_string(),
        policy,
        render: RenderOptions::default(),
    }
}

fn orchestrator() -> Orchestrator<HttpFetcher> {
    Orchestrator::new(HttpFetcher::new().expect("failed to build HTTP client"))
}

#[tokio::test]
async fn test_full_crawl_collects_linked_pages() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/page1", "/page2"]).await;
    mount_page(&server, "/page1", "Page 1", &[]).await;
    mount_page(&server, "/page2", "Page 2", &[]).await;

    let policy = CrawlPolicy {
        max_depth: 2,
        max_pages: 10,
        ..Default::default()
    };
    let result = orchestrator()
        .crawl(&request(&format!("{}/", server.uri()), policy), &CancelToken::new())
        .await
        .expect("crawl failed");

    assert_eq!(result.summary.fetched, 3);
    assert_eq!(result.summary.errored, 0);

    let titles: Vec<_> = result.pages.iter().filter_map(|p| p.title.clone()).collect();
    assert!(titles.contains(&"Home".to_string()));
    assert!(titles.contains(&"Page 1".to_string()));
    assert!(titles.contains(&"Page 2".to_string()));

    // Content went through clean-text extraction, not raw HTML
    let home = result.pages.iter().find(|p| p.depth == 0).unwrap();
    assert!(home.content.contains("Home body text"));
    assert!(!home.content.contains("<p>"));
    assert_eq!(home.description.as_deref(), Some("Home page"));
    assert_eq!(home.elements.links, 2);
}

#[tokio::test]
async fn test_depth_is_breadth_first_and_bounded() {
    let server = MockServer::start().await;

    mount_page(&server, "/a", "A", &["/b"]).await;
    mount_page(&server, "/b", "B", &["/c"]).await;
    mount_page(&server, "/c", "C", &["/d"]).await;
    mount_page(&server, "/d", "D", &[]).await;

    let policy = CrawlPolicy {
        max_depth: 2,
        max_pages: 10,
        ..Default::default()
    };
    let result = orchestrator()
        .crawl(&request(&format!("{}/a", server.uri()), policy), &CancelToken::new())
        .await
        .expect("crawl failed");

    // D is beyond the depth bound
    let titles: Vec<_> = result.pages.iter().filter_map(|p| p.title.clone()).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);

    // Depth never decreases across dequeue order
    let depths: Vec<_> = result.pages.iter().map(|p| p.depth).collect();
    assert!(depths.windows(2).all(|w| w[0] <= w[1]));

    assert_eq!(result.summary.stop_reason, StopReason::MaxDepthReached);
}

#[tokio::test]
async fn test_duplicate_links_fetched_once() {
    let server = MockServer::start().await;

    // Home links to the same target three ways; the trailing-slash and
    // fragment variants collapse onto one canonical URL
    mount_page(&server, "/", "Home", &["/target", "/target/", "/target#section"]).await;
    mount_page(&server, "/target", "Target", &[]).await;

    let policy = CrawlPolicy {
        max_depth: 1,
        max_pages: 10,
        ..Default::default()
    };
    let result = orchestrator()
        .crawl(&request(&format!("{}/", server.uri()), policy), &CancelToken::new())
        .await
        .expect("crawl failed");

    let target_count = result
        .pages
        .iter()
        .filter(|p| p.title.as_deref() == Some("Target"))
        .count();
    assert_eq!(target_count, 1);
    assert_eq!(result.summary.fetched, 2);
}

#[tokio::test]
async fn test_query_strings_collapse_when_ignored() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/p?x=1", "/p?x=2"]).await;
    mount_page(&server, "/p", "P", &[]).await;

    let policy = CrawlPolicy {
        max_depth: 1,
        max_pages: 10,
        ignore_query_strings: true,
        ..Default::default()
    };
    let result = orchestrator()
        .crawl(&request(&format!("{}/", server.uri()), policy), &CancelToken::new())
        .await
        .expect("crawl failed");

    // Only one of the two query variants is fetched
    assert_eq!(result.summary.fetched, 2);
}

#[tokio::test]
async fn test_error_isolation_end_to_end() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/good", "/bad", "/also-good"]).await;
    mount_page(&server, "/good", "Good", &[]).await;
    mount_page(&server, "/also-good", "Also Good", &[]).await;
    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let policy = CrawlPolicy {
        max_depth: 1,
        max_pages: 10,
        ..Default::default()
    };
    let result = orchestrator()
        .crawl(&request(&format!("{}/", server.uri()), policy), &CancelToken::new())
        .await
        .expect("crawl failed");

    assert_eq!(result.summary.fetched, 3);
    assert_eq!(result.summary.errored, 1);

    let bad = result
        .pages
        .iter()
        .find(|p| p.original_url.ends_with("/bad"))
        .expect("failed page missing from result");
    assert_eq!(bad.status, PageStatus::Error { kind: FetchErrorKind::Network });
}

#[tokio::test]
async fn test_pattern_exclusion_prevents_fetch() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/blog", "/admin/panel"]).await;
    mount_page(&server, "/blog", "Blog", &[]).await;
    // /admin/panel is deliberately not mounted; it must never be requested
    let policy = CrawlPolicy {
        max_depth: 1,
        max_pages: 10,
        exclude_url_patterns: vec!["/admin/".to_string()],
        ..Default::default()
    };
    let result = orchestrator()
        .crawl(&request(&format!("{}/", server.uri()), policy), &CancelToken::new())
        .await
        .expect("crawl failed");

    assert_eq!(result.summary.fetched, 2);
    assert_eq!(result.summary.errored, 0);
    assert!(result.pages.iter().all(|p| !p.original_url.contains("/admin/")));
}

#[tokio::test]
async fn test_domain_restriction_keeps_crawl_local() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        "Home",
        &["/local", "https://elsewhere.example/far"],
    )
    .await;
    mount_page(&server, "/local", "Local", &[]).await;

    let policy = CrawlPolicy {
        max_depth: 1,
        max_pages: 10,
        restrict_to_domains: vec!["127.0.0.1".to_string()],
        follow_external_links: false,
        ..Default::default()
    };
    let result = orchestrator()
        .crawl(&request(&format!("{}/", server.uri()), policy), &CancelToken::new())
        .await
        .expect("crawl failed");

    // The external host was never contacted
    assert_eq!(result.summary.fetched, 2);
    assert!(result
        .pages
        .iter()
        .all(|p| p.final_url.contains("127.0.0.1")));
}

#[tokio::test]
async fn test_redirect_reports_final_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/new", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/new", "New Home", &[]).await;

    let result = orchestrator()
        .crawl(
            &request(&format!("{}/old", server.uri()), CrawlPolicy::default()),
            &CancelToken::new(),
        )
        .await
        .expect("crawl failed");

    let page = &result.pages[0];
    assert!(page.was_redirected);
    assert!(page.original_url.ends_with("/old"));
    assert!(page.final_url.ends_with("/new"));
    assert_eq!(page.title.as_deref(), Some("New Home"));
}

#[tokio::test]
async fn test_non_html_content_is_a_render_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .mount(&server)
        .await;

    let result = orchestrator()
        .crawl(
            &request(&format!("{}/doc.pdf", server.uri()), CrawlPolicy::default()),
            &CancelToken::new(),
        )
        .await
        .expect("crawl failed");

    assert_eq!(result.summary.errored, 1);
    assert_eq!(
        result.pages[0].status,
        PageStatus::Error { kind: FetchErrorKind::Render }
    );
}

#[tokio::test]
async fn test_single_document_override_is_terminal() {
    let server = MockServer::start().await;

    // The page carries links, but the matching override rule makes it a
    // terminal fetch: the settle re-read happens, the links do not
    Mock::given(method("GET"))
        .and(path("/share/abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_page("Conversation", &["/other"]))
                .insert_header("content-type", "text/html"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let overrides = OverrideTable::from_entries(&[OverrideEntry {
        pattern: "/share/".to_string(),
        min_wait: 0.0,
        max_wait: 0.0,
        recurse: false,
    }])
    .unwrap();
    let orchestrator = orchestrator().with_overrides(overrides);

    let policy = CrawlPolicy {
        max_depth: 3,
        max_pages: 10,
        ..Default::default()
    };
    let result = orchestrator
        .crawl(
            &request(&format!("{}/share/abc", server.uri()), policy),
            &CancelToken::new(),
        )
        .await
        .expect("crawl failed");

    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.summary.fetched, 1);
    assert_eq!(result.pages[0].title.as_deref(), Some("Conversation"));
}

#[tokio::test]
async fn test_page_budget_bounds_fetches() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/1", "/2", "/3", "/4", "/5"]).await;
    for route in ["/1", "/2", "/3", "/4", "/5"] {
        mount_page(&server, route, route, &[]).await;
    }

    let policy = CrawlPolicy {
        max_depth: 1,
        max_pages: 3,
        ..Default::default()
    };
    let result = orchestrator()
        .crawl(&request(&format!("{}/", server.uri()), policy), &CancelToken::new())
        .await
        .expect("crawl failed");

    assert!(result.summary.fetched <= 3);
    assert_eq!(result.summary.stop_reason, StopReason::MaxPagesReached);
}

#[tokio::test]
async fn test_concurrent_fetches_complete() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/1", "/2", "/3", "/4"]).await;
    for route in ["/1", "/2", "/3", "/4"] {
        mount_page(&server, route, route, &[]).await;
    }

    let policy = CrawlPolicy {
        max_depth: 1,
        max_pages: 10,
        max_concurrent_fetches: 4,
        ..Default::default()
    };
    let result = orchestrator()
        .crawl(&request(&format!("{}/", server.uri()), policy), &CancelToken::new())
        .await
        .expect("crawl failed");

    assert_eq!(result.summary.fetched, 5);
    assert!(result.pages.iter().all(|p| p.depth <= 1));
}

#[tokio::test]
async fn test_settings_file_drives_session() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/keep", "/drop-me"]).await;
    mount_page(&server, "/keep", "Keep", &[]).await;

    let settings = parse_settings(
        r#"
[crawl]
max_depth = 1
max_pages = 5
exclude_url_patterns = ["drop-me"]

[fetch]
user_agent = "firefox"
page_load_timeout = 10
"#,
    )
    .expect("settings should parse");

    let request = CrawlRequest::from_settings(format!("{}/", server.uri()), &settings);
    assert_eq!(request.render.user_agent, "firefox");
    assert_eq!(request.render.page_load_timeout, 10);

    let result = orchestrator()
        .crawl(&request, &CancelToken::new())
        .await
        .expect("crawl failed");

    assert_eq!(result.summary.fetched, 2);
    assert!(result.pages.iter().all(|p| !p.original_url.contains("drop-me")));
}
