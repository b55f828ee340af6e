//! HTTP fetcher and title task against mock servers

use crate::support::engine_config;
use crawl_engine::config::UserAgentConfig;
use crawl_engine::tasks::{title_task, TITLE_FIELD};
use crawl_engine::{
    Engine, FetchError, Fetcher, HttpFetcher, MemorySink, Request, Task, TaskOptions,
    TaskRegistry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

fn html_page(title: &str, links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{href}">link</a>"#))
        .collect();
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{title}</title></head><body>{anchors}</body></html>"
        ))
        .insert_header("content-type", "text/html")
}

fn title_request(base_url: &str, page: &str, options: TaskOptions) -> Request {
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&user_agent()).unwrap());
    let task = Arc::new(title_task("titles", Vec::new(), options, false, fetcher));
    Request::new(task, format!("{base_url}{page}"), "parse_title")
}

#[tokio::test]
async fn test_fetch_sends_user_agent_and_returns_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact; test@example.com)",
        ))
        .respond_with(html_page("Hello", &[]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = title_request(&mock_server.uri(), "/page", TaskOptions::default());
    let body = request.task.fetcher.get(&request).await.unwrap();

    assert!(String::from_utf8(body).unwrap().contains("<title>Hello</title>"));
}

#[tokio::test]
async fn test_fetch_non_success_status_is_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let request = title_request(&mock_server.uri(), "/missing", TaskOptions::default());
    let err = request.task.fetcher.get(&request).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_fetch_unreachable_host_is_error() {
    let request = title_request("http://127.0.0.1:1", "/", TaskOptions::default());
    let err = request.task.fetcher.get(&request).await.unwrap_err();

    assert!(matches!(err, FetchError::Http { .. }));
}

#[tokio::test]
async fn test_wait_time_spaces_requests_of_a_task() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_page("Spaced", &[]))
        .mount(&mock_server)
        .await;

    let options = TaskOptions {
        wait_time: Duration::from_millis(50),
        ..TaskOptions::default()
    };
    let request = title_request(&mock_server.uri(), "/", options);

    let start = Instant::now();
    for _ in 0..3 {
        request.task.fetcher.get(&request).await.unwrap();
    }
    assert!(start.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_title_crawl_follows_links_and_retries_failures() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Home", &["/about", "/broken", "mailto:me@example.com"]))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html_page("About", &["/", "/deeper"]))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/deeper"))
        .respond_with(html_page("Too deep", &[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    let options = TaskOptions {
        max_depth: 1,
        ..TaskOptions::default()
    };
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&user_agent()).unwrap());
    let mut registry = TaskRegistry::new();
    registry
        .register(title_task(
            "titles",
            vec![format!("{base_url}/")],
            options,
            true,
            fetcher,
        ))
        .unwrap();

    let sink = Arc::new(MemorySink::new());
    let engine = Engine::new(engine_config(2), Arc::new(registry), sink.clone());
    let stats = tokio::time::timeout(Duration::from_secs(10), engine.run())
        .await
        .expect("crawl should go idle")
        .unwrap();

    let mut titles: Vec<String> = sink
        .items()
        .iter()
        .map(|item| item.field(TITLE_FIELD).unwrap().to_string())
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["About", "Home"]);

    assert_eq!(stats.fetch_failures, 2);
    assert_eq!(stats.retries, 1);
    assert_eq!(stats.abandoned, 1);
    assert_eq!(stats.invalid, 2);
}

#[tokio::test]
async fn test_short_bodies_count_as_failures() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Tiny", &[]))
        .expect(2)
        .mount(&mock_server)
        .await;

    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&user_agent()).unwrap());
    let task: Task = title_task(
        "titles",
        vec![format!("{}/", mock_server.uri())],
        TaskOptions::default(),
        false,
        fetcher,
    );
    let mut registry = TaskRegistry::new();
    registry.register(task).unwrap();

    let mut config = engine_config(1);
    config.min_body_length = 6000;
    let sink = Arc::new(MemorySink::new());
    let engine = Engine::new(config, Arc::new(registry), sink.clone());
    let stats = tokio::time::timeout(Duration::from_secs(10), engine.run())
        .await
        .unwrap()
        .unwrap();

    assert!(sink.is_empty());
    assert_eq!(stats.fetch_failures, 2);
    assert_eq!(stats.abandoned, 1);
}
