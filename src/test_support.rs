//! Shared fixtures for unit tests

use crate::crawler::Fetcher;
use crate::model::{ParseResult, Request, Rule, RuleTree, Task, TaskOptions};
use crate::FetchError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Fetcher that answers from a script and records every call
pub(crate) struct ScriptedFetcher {
    body: Vec<u8>,
    failures: Mutex<HashMap<String, usize>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            body: b"<html><head><title>ok</title></head></html>".to_vec(),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_body(mut self, body: &[u8]) -> Self {
        self.body = body.to_vec();
        self
    }

    /// The next `times` fetches of `url` fail
    pub fn fail_times(self, url: &str, times: usize) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(url.to_string(), times);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn get(&self, request: &Request) -> Result<Vec<u8>, FetchError> {
        self.calls.lock().unwrap().push(request.url.clone());

        let mut failures = self.failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(&request.url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(FetchError::Failed {
                    url: request.url.clone(),
                    message: "scripted failure".to_string(),
                });
            }
        }

        Ok(self.body.clone())
    }
}

/// Rule named "page" that emits one item holding the body text
pub(crate) fn page_rules() -> RuleTree {
    RuleTree::new(|_| Ok(Vec::new())).with_rule(
        "page",
        Rule::new(["body"], |ctx| {
            let mut result = ParseResult::new();
            result.add_item(ctx.output([("body", ctx.text().into_owned())]));
            Ok(result)
        }),
    )
}

pub(crate) fn task(name: &str) -> Arc<Task> {
    task_with_options(name, TaskOptions::default())
}

pub(crate) fn task_with_options(name: &str, options: TaskOptions) -> Arc<Task> {
    task_with_fetcher(name, Arc::new(ScriptedFetcher::new()), options)
}

pub(crate) fn task_with_fetcher(
    name: &str,
    fetcher: Arc<dyn Fetcher>,
    options: TaskOptions,
) -> Arc<Task> {
    Arc::new(Task::new(name, fetcher, page_rules()).with_options(options))
}
