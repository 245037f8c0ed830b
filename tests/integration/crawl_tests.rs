//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use docs_mapper::config::CrawlConfig;
use docs_mapper::crawler::{crawl, Coordinator};
use docs_mapper::output::export;
use docs_mapper::DocsMapperError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration scoped to the mock server under `/iaas/`
fn create_test_config(max_depth: u32) -> CrawlConfig {
    let mut config = CrawlConfig::default();
    config.crawler.max_depth = max_depth;
    config.crawler.max_concurrency = 4;
    config.crawler.request_delay_ms = 0;
    config.crawler.request_timeout_secs = 5;
    config.scope.allowed_host = "127.0.0.1".to_string();
    config.scope.allowed_path_prefixes = vec!["/iaas/".to_string()];
    config
}

/// A documentation page with a heading, a nav block, and a paragraph
fn page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!("<a href=\"{}\">{}</a>\n", href, href))
        .collect();
    format!(
        "<html><head><title>{title} | Docs</title></head><body>\n\
         <nav>\n{anchors}</nav>\n\
         <main><h1>{title}</h1>\n<p>About {title}.</p></main>\n\
         </body></html>"
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: String, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(expected_hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_depth_zero_records_seed_only() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/iaas/home.htm", page("Home", &["/iaas/a.htm"]), 1).await;
    mount_page(&server, "/iaas/a.htm", page("A", &[]), 0).await;

    let report = crawl(create_test_config(0), &format!("{}/iaas/home.htm", base))
        .await
        .expect("crawl failed");

    assert_eq!(report.store.len(), 1);
    let record = &report.store.records()[0];
    assert_eq!(record.title, "Home");
    assert_eq!(record.depth, 0);
    assert_eq!(record.child_urls, vec![format!("{}/iaas/a.htm", base)]);
    assert!(record.content.is_empty());
}

#[tokio::test]
async fn test_depth_one_fan_out_respects_scope() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/iaas/home.htm",
        page(
            "Home",
            &[
                "/iaas/a.htm",
                "b.htm",
                "/iaas/Content/d.htm",
                "/iaas/guide.pdf",
                "/blog/post.htm",
                "https://elsewhere.example.com/iaas/x.htm",
            ],
        ),
        1,
    )
    .await;
    mount_page(&server, "/iaas/a.htm", page("A", &["/iaas/c.htm"]), 1).await;
    mount_page(&server, "/iaas/b.htm", page("B", &[]), 1).await;
    mount_page(&server, "/iaas/Content/d.htm", page("D", &[]), 1).await;
    // Blocked extension, foreign prefix, and beyond max depth
    mount_page(&server, "/iaas/guide.pdf", page("PDF", &[]), 0).await;
    mount_page(&server, "/blog/post.htm", page("Blog", &[]), 0).await;
    mount_page(&server, "/iaas/c.htm", page("C", &[]), 0).await;

    let seed = format!("{}/iaas/home.htm", base);
    let report = crawl(create_test_config(1), &seed).await.expect("crawl failed");

    assert_eq!(report.store.len(), 4);
    assert_eq!(
        report.store.records()[0].child_urls,
        vec![
            format!("{}/iaas/a.htm", base),
            format!("{}/iaas/b.htm", base),
            format!("{}/iaas/Content/d.htm", base),
        ]
    );

    let groups = report.store.by_depth();
    let level1: Vec<(&str, &str)> = groups[&1]
        .iter()
        .map(|r| (r.url.as_str(), r.title.as_str()))
        .collect();
    let a = format!("{}/iaas/a.htm", base);
    let b = format!("{}/iaas/b.htm", base);
    let d = format!("{}/iaas/Content/d.htm", base);
    // URL order within a depth: "Content/d.htm" sorts before "a.htm"
    assert_eq!(
        level1,
        vec![(d.as_str(), "D"), (a.as_str(), "A"), (b.as_str(), "B")]
    );
    for record in &groups[&1] {
        assert_eq!(record.parent_url.as_deref(), Some(seed.as_str()));
    }

    assert_eq!(report.stats.pages_by_depth[&0], 1);
    assert_eq!(report.stats.pages_by_depth[&1], 3);
    assert_eq!(report.stats.total_failures(), 0);
}

#[tokio::test]
async fn test_refused_child_does_not_stop_siblings() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/iaas/home.htm",
        page(
            "Home",
            &["/iaas/a.htm", "http://127.0.0.1:1/iaas/b.htm", "/iaas/c.htm"],
        ),
        1,
    )
    .await;
    mount_page(&server, "/iaas/a.htm", page("A", &[]), 1).await;
    mount_page(&server, "/iaas/c.htm", page("C", &[]), 1).await;

    let report = crawl(create_test_config(1), &format!("{}/iaas/home.htm", base))
        .await
        .expect("crawl failed");

    assert_eq!(report.store.len(), 3);
    assert!(report.store.get("http://127.0.0.1:1/iaas/b.htm").is_none());
    assert_eq!(report.store.records()[0].child_urls.len(), 3);
    assert_eq!(report.stats.failures_by_kind.get("connection"), Some(&1));
}

#[tokio::test]
async fn test_failed_pages_are_isolated() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/iaas/home.htm",
        page(
            "Home",
            &[
                "/iaas/missing.htm",
                "/iaas/ok.htm",
                // Nothing listens on port 1
                "http://127.0.0.1:1/iaas/refused.htm",
            ],
        ),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/iaas/missing.htm"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/iaas/ok.htm", page("OK", &[]), 1).await;

    let report = crawl(create_test_config(1), &format!("{}/iaas/home.htm", base))
        .await
        .expect("crawl failed");

    let urls: Vec<&str> = report.store.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(report.store.len(), 2, "recorded: {:?}", urls);
    assert!(report.store.get(&format!("{}/iaas/ok.htm", base)).is_some());
    assert!(report.store.get(&format!("{}/iaas/missing.htm", base)).is_none());

    assert_eq!(report.stats.failures_by_kind.get("http-status"), Some(&1));
    assert_eq!(report.stats.failures_by_kind.get("connection"), Some(&1));
    assert_eq!(report.stats.urls_visited, 4);
}

#[tokio::test]
async fn test_each_page_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/iaas/home.htm",
        page(
            "Home",
            &["/iaas/a.htm?lang=en", "/iaas/a.htm#install", "/iaas/a.htm", "/iaas/b.htm"],
        ),
        1,
    )
    .await;
    // Siblings share a child and link back to the seed
    mount_page(&server, "/iaas/a.htm", page("A", &["/iaas/c.htm", "/iaas/home.htm"]), 1).await;
    mount_page(&server, "/iaas/b.htm", page("B", &["/iaas/c.htm?v=2", "/iaas/home.htm"]), 1).await;
    mount_page(&server, "/iaas/c.htm", page("C", &["/iaas/a.htm"]), 1).await;

    let report = crawl(create_test_config(3), &format!("{}/iaas/home.htm", base))
        .await
        .expect("crawl failed");

    assert_eq!(report.store.len(), 4);
    let mut urls: Vec<&str> = report.store.iter().map(|r| r.url.as_str()).collect();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), 4);

    let c = report.store.get(&format!("{}/iaas/c.htm", base)).unwrap();
    assert_eq!(c.depth, 2);
    // a.htm was already visited when c.htm was extracted
    assert!(c.child_urls.is_empty());
}

#[tokio::test]
async fn test_sequential_crawl_matches_concurrent() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/iaas/home.htm",
        page("Home", &["/iaas/a.htm", "/iaas/b.htm", "/iaas/c.htm"]),
        1,
    )
    .await;
    for name in ["a", "b", "c"] {
        mount_page(&server, &format!("/iaas/{}.htm", name), page(name, &[]), 1).await;
    }

    let mut config = create_test_config(1);
    config.crawler.max_concurrency = 1;
    let report = crawl(config, &format!("{}/iaas/home.htm", base))
        .await
        .expect("crawl failed");

    // With one slot, completion order is discovery order
    let urls: Vec<String> = report.store.iter().map(|r| r.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/iaas/home.htm", base),
            format!("{}/iaas/a.htm", base),
            format!("{}/iaas/b.htm", base),
            format!("{}/iaas/c.htm", base),
        ]
    );
}

#[tokio::test]
async fn test_invalid_seed_makes_no_requests() {
    let server = MockServer::start().await;
    let base = server.uri();

    for seed in [
        format!("{}/blog/home.htm", base),
        format!("{}/iaas/home.htm#intro", base),
        format!("{}/iaas/guide.pdf", base),
        "https://elsewhere.example.com/iaas/home.htm".to_string(),
        "not a url".to_string(),
    ] {
        let result = crawl(create_test_config(2), &seed).await;
        assert!(
            matches!(result, Err(DocsMapperError::InvalidSeedUrl { .. })),
            "seed {} was accepted",
            seed
        );
    }

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_content_extraction_and_export() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/iaas/home.htm", page("Home", &["/iaas/a.htm"]), 1).await;
    mount_page(&server, "/iaas/a.htm", page("Alpha", &[]), 1).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(1);
    config.crawler.extract_content = true;
    config.output.directory = dir.path().to_string_lossy().into_owned();

    let report = Coordinator::new(config.clone())
        .unwrap()
        .run(&format!("{}/iaas/home.htm", base))
        .await
        .expect("crawl failed");

    let alpha = report.store.get(&format!("{}/iaas/a.htm", base)).unwrap();
    assert_eq!(alpha.content, "Alpha\nAbout Alpha.");

    let paths = export(&report.store, &config).unwrap();
    let markdown = std::fs::read_to_string(&paths.markdown).unwrap();
    assert!(markdown.contains("**Total URLs collected:** 2"));
    assert!(markdown.contains(&format!("## Root\n\n- [Home]({}/iaas/home.htm)", base)));
    assert!(markdown.contains(&format!(
        "## Level 1 (1 URLs)\n\n- [Alpha]({}/iaas/a.htm)\n\n  > Alpha\n  > About Alpha.\n",
        base
    )));

    let urls = std::fs::read_to_string(&paths.urls).unwrap();
    assert_eq!(
        urls,
        format!("{}/iaas/home.htm\n{}/iaas/a.htm\n", base, base)
    );
}
