//! Configuration files driving real crawls

use crawl_engine::config::{load_config, load_config_with_hash};
use crawl_engine::tasks::{title_task, TITLE_FIELD};
use crawl_engine::{ConfigError, Engine, EngineConfig, Fetcher, HttpFetcher, MemorySink, TaskRegistry};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn config_text(seed: &str) -> String {
    format!(
        r#"
[engine]
worker-count = 2
min-body-length = 0

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[[task]]
name = "titles"
seeds = ["{seed}"]
max-depth = 0
"#
    )
}

#[tokio::test]
async fn test_config_file_drives_crawl() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><title>Configured</title></head><body><a href="/next">n</a></body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let file = write_config(&config_text(&format!("{}/", mock_server.uri())));
    let (config, hash) = load_config_with_hash(file.path()).unwrap();
    assert_eq!(hash.len(), 64);
    assert_eq!(config.engine.worker_count, 2);

    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.user_agent).unwrap());
    let mut registry = TaskRegistry::new();
    for entry in &config.tasks {
        registry
            .register(title_task(
                entry.name.clone(),
                entry.seeds.clone(),
                entry.options(),
                entry.follow_links,
                Arc::clone(&fetcher),
            ))
            .unwrap();
    }

    let sink = Arc::new(MemorySink::new());
    let engine = Engine::new(config.engine, Arc::new(registry), sink.clone());
    let stats = tokio::time::timeout(Duration::from_secs(10), engine.run())
        .await
        .unwrap()
        .unwrap();

    let items = sink.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].field(TITLE_FIELD), Some("Configured"));
    assert_eq!(items[0].task, "titles");
    // The link on the page is one level past max depth
    assert_eq!(stats.invalid, 1);
}

#[test]
fn test_defaults_apply_to_missing_engine_section() {
    let file = write_config(
        r#"
[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[[task]]
name = "titles"
seeds = ["https://example.com/"]
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.engine, EngineConfig::default());

    let entry = &config.tasks[0];
    assert!(!entry.reload);
    assert!(entry.follow_links);
    assert_eq!(entry.options().max_depth, 3);
}

#[test]
fn test_invalid_seed_is_rejected() {
    let file = write_config(&config_text("ftp://example.com/"));
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}
