//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, down to the mirrored files on disk.

use path_mirror::config::Config;
use path_mirror::crawler::Coordinator;
use path_mirror::{run_crawl, MirrorError};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `{base_url}/cn/` into `save_dir`
fn create_test_config(base_url: &str, save_dir: &Path, max_depth: u32, workers: usize) -> Config {
    let mut config = Config::for_seed(format!("{}/cn/", base_url), save_dir.to_path_buf());
    config.crawler.max_depth = max_depth;
    config.crawler.worker_count = workers;
    config.crawler.request_delay = 0; // No courtesy delay against a local mock
    config.crawler.idle_poll = 20;
    config.crawler.fetch_timeout = 2_000;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

fn html_with_links(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

/// Mounts a GET mock serving `body` at `route`, expected `times` times
async fn mount_page(server: &MockServer, route: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

fn read_page(save_dir: &Path, relative: &str) -> String {
    std::fs::read_to_string(save_dir.join(relative))
        .unwrap_or_else(|e| panic!("missing page {}: {}", relative, e))
}

#[tokio::test]
async fn test_seed_and_in_scope_child_are_mirrored() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let save_dir = tmp.path().join("pages");

    let seed_body = html_with_links(&["/cn/a", "/en/b", "/cn/"]);
    mount_page(&mock_server, "/cn/", seed_body.clone(), 1).await;
    mount_page(&mock_server, "/cn/a", "<html>A</html>".to_string(), 1).await;
    mount_page(&mock_server, "/en/b", "<html>B</html>".to_string(), 0).await;

    let config = create_test_config(&mock_server.uri(), &save_dir, 2, 4);
    let stats = run_crawl(config).await.unwrap();

    assert_eq!(stats.visited_count, 2);
    assert_eq!(stats.failed_count, 0);
    assert_eq!(read_page(&save_dir, "index.html"), seed_body);
    assert_eq!(read_page(&save_dir, "a.html"), "<html>A</html>");
    assert!(!save_dir.join("b.html").exists());
    assert!(!save_dir.join("en").exists());
}

#[tokio::test]
async fn test_timed_out_page_is_skipped_and_crawl_completes() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let save_dir = tmp.path().join("pages");

    mount_page(
        &mock_server,
        "/cn/",
        html_with_links(&["/cn/slow", "/cn/ok"]),
        1,
    )
    .await;
    mount_page(&mock_server, "/cn/ok", "<html>ok</html>".to_string(), 1).await;
    Mock::given(method("GET"))
        .and(path("/cn/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html>too late</html>")
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), &save_dir, 2, 4);
    config.crawler.fetch_timeout = 300;

    let stats = tokio::time::timeout(Duration::from_secs(20), run_crawl(config))
        .await
        .expect("crawl did not terminate")
        .unwrap();

    assert_eq!(stats.claimed_count, 3);
    assert_eq!(stats.failed_count, 1);
    assert_eq!(stats.visited_count, 2);
    assert!(save_dir.join("ok.html").exists());
    assert!(!save_dir.join("slow.html").exists());
    assert!(stats.failures[0].url.ends_with("/cn/slow"));
}

#[tokio::test]
async fn test_error_status_is_not_saved() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let save_dir = tmp.path().join("pages");

    mount_page(&mock_server, "/cn/", html_with_links(&["/cn/gone"]), 1).await;
    Mock::given(method("GET"))
        .and(path("/cn/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &save_dir, 3, 2);
    let stats = run_crawl(config).await.unwrap();

    assert_eq!(stats.visited_count, 1);
    assert_eq!(stats.failures.len(), 1);
    assert!(stats.failures[0].reason.contains("404"));
    assert!(!save_dir.join("gone.html").exists());
}

#[tokio::test]
async fn test_depth_limit_stops_link_following() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let save_dir = tmp.path().join("pages");

    mount_page(&mock_server, "/cn/", html_with_links(&["/cn/d2"]), 1).await;
    mount_page(&mock_server, "/cn/d2", html_with_links(&["/cn/d3"]), 1).await;
    mount_page(&mock_server, "/cn/d3", html_with_links(&[]), 0).await;

    let config = create_test_config(&mock_server.uri(), &save_dir, 2, 4);
    let stats = run_crawl(config).await.unwrap();

    assert_eq!(stats.visited_count, 2);
    assert_eq!(stats.depth_breakdown.get(&1), Some(&1));
    assert_eq!(stats.depth_breakdown.get(&2), Some(&1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cross_linked_pages_fetched_exactly_once() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let save_dir = tmp.path().join("pages");

    let routes = ["/cn/", "/cn/p1", "/cn/p2", "/cn/p3", "/cn/p4", "/cn/p5", "/cn/p6"];
    for route in routes {
        // Every page links to every page, including itself and the seed
        mount_page(&mock_server, route, html_with_links(&routes), 1).await;
    }

    let config = create_test_config(&mock_server.uri(), &save_dir, 4, 8);
    let stats = run_crawl(config).await.unwrap();

    assert_eq!(stats.visited_count, routes.len());
    assert_eq!(stats.saved_count, routes.len());
    for name in ["index.html", "p1.html", "p6.html"] {
        assert!(save_dir.join(name).exists(), "{} not saved", name);
    }
}

#[tokio::test]
async fn test_nested_paths_and_fragments() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let save_dir = tmp.path().join("pages");

    mount_page(
        &mock_server,
        "/cn/",
        html_with_links(&["/cn/guide/intro", "/cn/guide/intro#part-2", "guide/intro"]),
        1,
    )
    .await;
    mount_page(&mock_server, "/cn/guide/intro", "<p>intro</p>".to_string(), 1).await;

    let config = create_test_config(&mock_server.uri(), &save_dir, 3, 3);
    let stats = run_crawl(config).await.unwrap();

    assert_eq!(stats.visited_count, 2);
    assert_eq!(read_page(&save_dir, "guide/intro.html"), "<p>intro</p>");
}

#[tokio::test]
async fn test_coordinator_reports_absolute_output_dir() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let save_dir = tmp.path().join("pages");

    mount_page(&mock_server, "/cn/", html_with_links(&[]), 1).await;

    let config = create_test_config(&mock_server.uri(), &save_dir, 1, 1);
    let coordinator = Coordinator::new(config).unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.visited_count, 1);
    assert!(coordinator.output_dir().is_absolute());
    assert!(coordinator.output_dir().join("index.html").exists());
}

#[tokio::test]
async fn test_unusable_save_directory_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let config = create_test_config("http://127.0.0.1:9", &blocker.join("pages"), 2, 1);
    let result = run_crawl(config).await;

    assert!(matches!(result, Err(MirrorError::Storage(_))));
}
