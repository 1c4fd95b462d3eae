//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use deep_crawl::config::{Config, CrawlerConfig, NonHtmlPolicy};
use deep_crawl::report::{report_filename, write_report, CrawlCompletion, CrawlReport};
use deep_crawl::state::PageState;
use deep_crawl::{
    run_crawl, Coordinator, CrawlError, CrawlOutcome, CrawlRequest, CrawlResponse,
};
use std::collections::HashSet;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts
fn create_test_config() -> Config {
    Config {
        crawler: CrawlerConfig {
            request_timeout_secs: 5,
            concurrency: 4,
            ..CrawlerConfig::default()
        },
        ..Config::default()
    }
}

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ),
        "text/html",
    )
}

/// Mounts an HTML page expected to be fetched `times` times
async fn mount_page(server: &MockServer, page_path: &str, title: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html_page(title, body))
        .expect(times)
        .mount(server)
        .await;
}

async fn crawl(config: Config, server: &MockServer, depth: u32) -> CrawlOutcome {
    let request = CrawlRequest::new(server.uri()).with_max_depth(depth);
    run_crawl(config, request).await.expect("crawl should succeed")
}

fn page_urls(report: &CrawlReport) -> Vec<String> {
    report
        .detailed_pages
        .values()
        .map(|page| page.url.clone())
        .collect()
}

fn assert_summary_consistent(report: &CrawlReport) {
    let summary = &report.crawl_summary;
    let pages: Vec<_> = report.detailed_pages.values().collect();

    assert_eq!(summary.total_pages_crawled, pages.len());
    assert_eq!(
        summary.total_words_extracted,
        pages.iter().map(|p| p.text_content.total_word_count).sum::<usize>()
    );
    assert_eq!(
        summary.total_links_found,
        pages.iter().map(|p| p.links_found).sum::<usize>()
    );
    assert_eq!(
        summary.total_images_found,
        pages.iter().map(|p| p.images_found).sum::<usize>()
    );
    assert_eq!(
        summary.total_tables_found,
        pages.iter().map(|p| p.tables_found).sum::<usize>()
    );

    let unique: HashSet<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(unique.len(), pages.len(), "a URL appears twice in the report");
}

const THREE_LINKS: &str = r#"
    <p>Welcome to the test site home page.</p>
    <a href="/page1">Page 1</a>
    <a href="/page2">Page 2</a>
    <a href="/page3">Page 3</a>
"#;

#[tokio::test]
async fn test_depth_zero_crawls_only_seed() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", THREE_LINKS, 1).await;
    for child in ["/page1", "/page2", "/page3"] {
        mount_page(&server, child, "Child", "", 0).await;
    }

    let outcome = crawl(create_test_config(), &server, 0).await;
    let report = &outcome.report;

    assert_eq!(report.detailed_pages.len(), 1);
    let seed = report.detailed_pages.values().next().unwrap();
    assert_eq!(seed.title, "Home");
    assert_eq!(seed.links_found, 3);
    assert_eq!(report.crawl_summary.max_depth_reached, 0);
    assert_eq!(report.crawl_summary.completion, CrawlCompletion::Exhausted);
    assert_summary_consistent(report);
}

#[tokio::test]
async fn test_depth_one_crawls_seed_and_children() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", THREE_LINKS, 1).await;
    for (i, child) in ["/page1", "/page2", "/page3"].iter().enumerate() {
        let body = format!(
            r#"<p>Child page number {} content.</p><a href="/deep{}">Deeper</a><img src="/img{}.png">"#,
            i, i, i
        );
        mount_page(&server, child, &format!("Page {}", i + 1), &body, 1).await;
    }
    for deep in ["/deep0", "/deep1", "/deep2"] {
        mount_page(&server, deep, "Deep", "", 0).await;
    }

    let outcome = crawl(create_test_config(), &server, 1).await;
    let report = &outcome.report;

    assert_eq!(report.detailed_pages.len(), 4);
    assert_eq!(report.pages_by_depth[&0].len(), 1);
    assert_eq!(report.pages_by_depth[&1].len(), 3);
    assert_eq!(report.crawl_summary.total_links_found, 6);
    assert_eq!(report.crawl_summary.total_images_found, 3);
    assert_eq!(report.crawl_summary.max_depth_reached, 1);
    assert_eq!(outcome.page_states[&PageState::Processed], 4);

    // visitation order is frontier order
    let urls = page_urls(report);
    let base = server.uri();
    assert_eq!(
        urls,
        vec![
            format!("{}/", base),
            format!("{}/page1", base),
            format!("{}/page2", base),
            format!("{}/page3", base),
        ]
    );
    assert_eq!(
        report.site_structure.page_titles,
        vec!["Home", "Page 1", "Page 2", "Page 3"]
    );
    assert_summary_consistent(report);
}

#[tokio::test]
async fn test_dead_child_is_absent() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", THREE_LINKS, 1).await;
    mount_page(&server, "/page1", "Page 1", "<p>First child page text.</p>", 1).await;
    mount_page(&server, "/page3", "Page 3", "<p>Third child page text.</p>", 1).await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = crawl(create_test_config(), &server, 1).await;
    assert_eq!(outcome.page_states[&PageState::DeadLink], 1);

    let report = outcome.report.clone();
    assert_eq!(report.detailed_pages.len(), 3);
    assert!(!page_urls(&report).iter().any(|u| u.ends_with("/page2")));
    assert_summary_consistent(&report);

    let response = CrawlResponse::from(Ok::<_, CrawlError>(outcome));
    assert!(response.success);
    assert!(response.error.is_none());
}

#[tokio::test]
async fn test_malformed_seed_fails() {
    let result = run_crawl(create_test_config(), CrawlRequest::new("not a url")).await;
    let response = CrawlResponse::from(result);

    assert!(!response.success);
    assert!(response.report.is_none());
    assert!(response.error.unwrap().contains("not a url"));
}

#[tokio::test]
async fn test_dead_seed_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = run_crawl(create_test_config(), CrawlRequest::new(server.uri())).await;
    let value = serde_json::to_value(CrawlResponse::from(result)).unwrap();
    assert_eq!(value["success"], false);
    assert!(value["error"].as_str().unwrap().contains("500"));
    assert!(value.get("report").is_none());
}

#[tokio::test]
async fn test_cyclic_links_visited_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "A", r#"<a href="/b">B</a><a href="/">Self</a>"#, 1).await;
    mount_page(
        &server,
        "/b",
        "B",
        r#"<a href="/">A</a><a href="/c/">C</a><a href="/b#top">B</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/c", "C", r#"<a href="/">A</a><a href="/b">B</a>"#, 1).await;

    let outcome = crawl(create_test_config(), &server, 3).await;
    let report = &outcome.report;

    assert_eq!(report.detailed_pages.len(), 3);
    assert_eq!(report.crawl_summary.max_depth_reached, 2);
    assert_summary_consistent(report);
}

#[tokio::test]
async fn test_rerun_is_deterministic() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", THREE_LINKS, 2).await;
    for child in ["/page1", "/page2", "/page3"] {
        let body = r#"<p>Shared child content for determinism.</p><a href="/">Home</a><a href="/page1">One</a>"#;
        mount_page(&server, child, "Child", body, 2).await;
    }

    let first = crawl(create_test_config(), &server, 2).await.report;
    let second = crawl(create_test_config(), &server, 2).await.report;

    let counts = |r: &CrawlReport| {
        let s = &r.crawl_summary;
        (
            s.total_pages_crawled,
            s.total_links_found,
            s.total_images_found,
            s.total_tables_found,
            s.total_words_extracted,
        )
    };
    assert_eq!(counts(&first), counts(&second));
    assert_eq!(
        first.detailed_pages.keys().collect::<Vec<_>>(),
        second.detailed_pages.keys().collect::<Vec<_>>()
    );
    assert_eq!(first.pages_by_depth, second.pages_by_depth);
}

async fn mount_non_html_site(server: &MockServer) {
    mount_page(
        server,
        "/",
        "Home",
        r#"<a href="/data">Data</a><a href="/about">About</a>"#,
        1,
    )
    .await;
    mount_page(server, "/about", "About", "<p>All about this test site.</p>", 1).await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"not": "html"}"#, "application/json"),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_non_html_skipped_by_default() {
    let server = MockServer::start().await;
    mount_non_html_site(&server).await;

    let outcome = crawl(create_test_config(), &server, 1).await;
    assert_eq!(outcome.report.detailed_pages.len(), 2);
    assert_eq!(outcome.page_states[&PageState::ContentMismatch], 1);
    assert_eq!(
        outcome.report.crawl_summary.non_html_policy,
        NonHtmlPolicy::Skip
    );
}

#[tokio::test]
async fn test_non_html_recorded_empty() {
    let server = MockServer::start().await;
    mount_non_html_site(&server).await;

    let mut config = create_test_config();
    config.crawler.non_html = NonHtmlPolicy::RecordEmpty;
    let outcome = crawl(config, &server, 1).await;
    let report = &outcome.report;

    assert_eq!(report.detailed_pages.len(), 3);
    assert_eq!(outcome.page_states[&PageState::RecordedEmpty], 1);
    assert_eq!(report.crawl_summary.non_html_policy, NonHtmlPolicy::RecordEmpty);

    let data = report
        .detailed_pages
        .values()
        .find(|p| p.url.ends_with("/data"))
        .unwrap();
    assert_eq!(data.title, "");
    assert_eq!(data.links_found, 0);
    assert_eq!(data.text_content.total_word_count, 0);
    assert_summary_consistent(report);
}

#[tokio::test]
async fn test_out_of_scope_links_not_fetched() {
    let server = MockServer::start().await;
    let port = url::Url::parse(&server.uri()).unwrap().port().unwrap();
    // same server, different host name
    let body = format!(
        r#"<a href="http://localhost:{}/elsewhere">Elsewhere</a><a href="/inside">Inside</a>"#,
        port
    );
    mount_page(&server, "/", "Home", &body, 1).await;
    mount_page(&server, "/inside", "Inside", "", 1).await;
    mount_page(&server, "/elsewhere", "Elsewhere", "", 0).await;

    let outcome = crawl(create_test_config(), &server, 1).await;
    let report = &outcome.report;

    assert_eq!(report.detailed_pages.len(), 2);
    assert_eq!(
        report.site_structure.unique_domains_linked,
        vec![format!("localhost:{}", port)]
    );
}

#[tokio::test]
async fn test_other_port_is_out_of_scope() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let body = format!(
        r#"<a href="{}/elsewhere">Elsewhere</a><a href="/inside">Inside</a>"#,
        other.uri()
    );
    mount_page(&server, "/", "Home", &body, 1).await;
    mount_page(&server, "/inside", "Inside", "", 1).await;
    mount_page(&other, "/elsewhere", "Elsewhere", "", 0).await;

    let outcome = crawl(create_test_config(), &server, 1).await;
    assert_eq!(outcome.report.detailed_pages.len(), 2);
}

fn redirect_to(location: &str) -> ResponseTemplate {
    ResponseTemplate::new(302).insert_header("location", location)
}

#[tokio::test]
async fn test_redirect_out_of_scope_dropped() {
    let server = MockServer::start().await;
    let foreign = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "Home",
        r#"<p>Welcome to the home page.</p><a href="/go">Go</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(redirect_to(&format!("{}/landing", foreign.uri())))
        .expect(1)
        .mount(&server)
        .await;
    // the redirect is followed, the landing page never reaches the report
    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(html_page(
            "Foreign",
            r#"<p>Foreign site content here.</p><a href="/more">More</a>"#,
        ))
        .mount(&foreign)
        .await;
    mount_page(&foreign, "/more", "More", "", 0).await;

    let outcome = crawl(create_test_config(), &server, 2).await;
    let report = &outcome.report;

    assert_eq!(report.detailed_pages.len(), 1);
    assert!(!page_urls(report).iter().any(|u| u.ends_with("/go")));
    assert_eq!(outcome.page_states[&PageState::Redirected], 1);
    assert!(report
        .detailed_pages
        .values()
        .all(|page| page.title != "Foreign"));
    assert_summary_consistent(report);
}

#[tokio::test]
async fn test_redirect_to_visited_page_not_counted_twice() {
    let server = MockServer::start().await;
    // fetched once as the seed and once through the redirect
    mount_page(
        &server,
        "/",
        "Home",
        r#"<p>Welcome to the home page.</p><a href="/old">Old</a>"#,
        2,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(redirect_to("/"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = crawl(create_test_config(), &server, 1).await;
    let report = &outcome.report;

    assert_eq!(report.detailed_pages.len(), 1);
    assert_eq!(report.crawl_summary.total_words_extracted, 5);
    assert_eq!(outcome.page_states[&PageState::Redirected], 1);
    assert_summary_consistent(report);
}

#[tokio::test]
async fn test_redirect_within_scope_kept() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", r#"<a href="/moved">Moved</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(redirect_to("/new"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/new",
        "New",
        r#"<p>The page now lives here.</p><a href="/new">Self</a>"#,
        1,
    )
    .await;

    let outcome = crawl(create_test_config(), &server, 2).await;
    let report = &outcome.report;

    assert_eq!(report.detailed_pages.len(), 2);
    let moved = report
        .detailed_pages
        .find_by_url(&format!("{}/moved", server.uri()))
        .map(|(_, page)| page)
        .unwrap();
    assert_eq!(moved.title, "New");
    assert_summary_consistent(report);
}

#[tokio::test]
async fn test_page_cap_respected() {
    let server = MockServer::start().await;
    let links: String = (1..=5)
        .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", "Home", &links, 1).await;
    mount_page(&server, "/p1", "P1", "", 1).await;
    mount_page(&server, "/p2", "P2", "", 1).await;
    for i in 3..=5 {
        mount_page(&server, &format!("/p{}", i), "P", "", 0).await;
    }

    let mut config = create_test_config();
    config.crawler.max_total_pages = 3;
    let outcome = crawl(config, &server, 1).await;
    let report = &outcome.report;

    assert_eq!(report.detailed_pages.len(), 3);
    assert_eq!(report.crawl_summary.completion, CrawlCompletion::PageLimit);
    assert_eq!(outcome.page_states[&PageState::PageLimitHit], 3);
    assert!(page_urls(report).iter().any(|u| u.ends_with("/p2")));
    assert_summary_consistent(report);
}

#[tokio::test]
async fn test_links_per_page_limit() {
    let server = MockServer::start().await;
    let links: String = (1..=4)
        .map(|i| format!(r#"<a href="/l{}">L{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", "Home", &links, 1).await;
    mount_page(&server, "/l1", "L1", "", 1).await;
    mount_page(&server, "/l2", "L2", "", 1).await;
    mount_page(&server, "/l3", "L3", "", 0).await;
    mount_page(&server, "/l4", "L4", "", 0).await;

    let mut config = create_test_config();
    config.crawler.max_links_per_page = 2;
    let outcome = crawl(config, &server, 1).await;

    assert_eq!(outcome.report.detailed_pages.len(), 3);
    // every link is still reported on the page
    assert_eq!(outcome.report.crawl_summary.total_links_found, 4);
}

#[tokio::test]
async fn test_crawl_deadline_keeps_partial_report() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", r#"<a href="/slow">Slow</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            html_page("Slow", r#"<a href="/after">After</a>"#).set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/after", "After", "", 0).await;

    let mut config = create_test_config();
    config.crawler.crawl_timeout_secs = 1;
    let outcome = crawl(config, &server, 2).await;
    let report = &outcome.report;

    // the in-flight fetch finishes, nothing new is dispatched
    assert_eq!(report.detailed_pages.len(), 2);
    assert_eq!(report.crawl_summary.completion, CrawlCompletion::Cancelled);
    assert_summary_consistent(report);
}

#[tokio::test]
async fn test_explicit_cancellation() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", r#"<a href="/slow">Slow</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            html_page("Slow", r#"<a href="/after">After</a>"#)
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/after", "After", "", 0).await;

    let coordinator = Coordinator::new(create_test_config()).unwrap();
    let token = coordinator.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        token.cancel();
    });

    let request = CrawlRequest::new(server.uri()).with_max_depth(2);
    let outcome = coordinator.run(request).await.unwrap();
    assert_eq!(
        outcome.report.crawl_summary.completion,
        CrawlCompletion::Cancelled
    );
    assert!(outcome.report.detailed_pages.len() <= 2);
}

#[tokio::test]
async fn test_export_writes_domain_file() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", "<p>Exported page content here.</p>", 1).await;

    let port = url::Url::parse(&server.uri()).unwrap().port().unwrap();
    let outcome = crawl(create_test_config(), &server, 0).await;
    assert_eq!(outcome.domain, format!("127.0.0.1:{}", port));

    let dir = tempfile::TempDir::new().unwrap();
    let path = write_report(&outcome.report, &outcome.domain, dir.path(), true).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        format!("crawl_report_127.0.0.1_{}.json", port)
    );
    assert_eq!(report_filename("127.0.0.1"), "crawl_report_127.0.0.1.json");

    let written: CrawlReport =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, outcome.report);

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    for field in [
        "total_pages_crawled",
        "total_links_found",
        "total_images_found",
        "total_tables_found",
        "total_words_extracted",
        "crawl_duration_seconds",
    ] {
        assert!(value["crawl_summary"].get(field).is_some(), "missing {}", field);
    }
    let page = value["detailed_pages"].as_object().unwrap().values().next().unwrap();
    assert_eq!(page["text_content"]["paragraphs"][0], "Exported page content here.");
    assert_eq!(page["text_content"]["total_word_count"], 4);
}
