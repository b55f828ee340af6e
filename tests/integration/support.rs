//! Fixtures shared by the integration tests

use async_trait::async_trait;
use crawl_engine::{
    Engine, EngineConfig, FetchError, Fetcher, Item, MemorySink, ParseResult, Request, Rule,
    RuleTree, StatsSnapshot, Task, TaskOptions, TaskRegistry,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct FetchLog {
    calls: Vec<String>,
    in_flight: HashMap<String, usize>,
    max_in_flight: usize,
}

/// In-memory fetcher with per-URL bodies, failures and an optional delay
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    delay: Duration,
    log: Mutex<FetchLog>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body served for `url`; unknown URLs get an empty page
    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    /// Every fetch of `url` fails
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|u| *u == url)
            .count()
    }

    /// Highest number of simultaneous fetches seen for any single URL
    pub fn max_in_flight_per_url(&self) -> usize {
        self.log.lock().unwrap().max_in_flight
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn get(&self, request: &Request) -> Result<Vec<u8>, FetchError> {
        {
            let mut log = self.log.lock().unwrap();
            log.calls.push(request.url.clone());
            let current = log.in_flight.entry(request.url.clone()).or_insert(0);
            *current += 1;
            let current = *current;
            log.max_in_flight = log.max_in_flight.max(current);
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        {
            let mut log = self.log.lock().unwrap();
            if let Some(current) = log.in_flight.get_mut(&request.url) {
                *current -= 1;
            }
        }

        if self.failing.contains(&request.url) {
            return Err(FetchError::Failed {
                url: request.url.clone(),
                message: "scripted failure".to_string(),
            });
        }

        Ok(self
            .pages
            .get(&request.url)
            .cloned()
            .unwrap_or_default()
            .into_bytes())
    }
}

/// Rule "page": one item per page, and every body line starting with
/// "http" is followed with the same rule
pub fn page_rule() -> Rule {
    Rule::new(["url"], |ctx| {
        let mut result = ParseResult::new();
        result.add_item(ctx.output([("url", ctx.request.url.clone())]));
        for line in ctx.text().lines().map(str::trim) {
            if line.starts_with("http") {
                result.add_request(ctx.follow(line, "page"));
            }
        }
        Ok(result)
    })
}

/// Task whose roots are `(url, priority)` pairs handled by [`page_rule`]
pub fn task(
    name: &str,
    fetcher: Arc<dyn Fetcher>,
    roots: &[(&str, i32)],
    options: TaskOptions,
) -> Task {
    let roots: Vec<(String, i32)> = roots.iter().map(|(u, p)| (u.to_string(), *p)).collect();
    let rules = RuleTree::new(move |task: &Arc<Task>| {
        Ok(roots
            .iter()
            .map(|(url, priority)| {
                Request::new(Arc::clone(task), url.clone(), "page").with_priority(*priority)
            })
            .collect())
    })
    .with_rule("page", page_rule());

    Task::new(name, fetcher, rules).with_options(options)
}

pub fn engine_config(worker_count: usize) -> EngineConfig {
    EngineConfig {
        worker_count,
        min_body_length: 0,
        ..EngineConfig::default()
    }
}

/// Runs every task to idle and returns the stats and collected items
pub async fn crawl(config: EngineConfig, tasks: Vec<Task>) -> (StatsSnapshot, Vec<Item>) {
    let mut registry = TaskRegistry::new();
    for task in tasks {
        registry.register(task).unwrap();
    }

    let sink = Arc::new(MemorySink::new());
    let engine = Engine::new(config, Arc::new(registry), sink.clone());
    let stats = tokio::time::timeout(Duration::from_secs(10), engine.run())
        .await
        .expect("crawl should go idle")
        .expect("crawl should start");

    (stats, sink.items())
}
