//! Fetchers
//!
//! This module handles turning a request into page content:
//! - The `Fetcher` trait every task fetches through
//! - Building HTTP clients with proper user agent strings
//! - `HttpFetcher`, the reqwest implementation
//! - Per-task spacing of requests (a task's `wait_time`)
//!
//! Every failure a fetcher reports is treated the same way by the engine,
//! whatever its cause.

use crate::config::UserAgentConfig;
use crate::model::Request;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Produces the raw content for a request
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, request: &Request) -> Result<Vec<u8>, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Example
///
/// ```no_run
/// use crawl_engine::config::UserAgentConfig;
/// use crawl_engine::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "CrawlEngine".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Spaces out requests that share a key
///
/// Each caller reserves the next free slot under the lock and sleeps
/// outside it, so concurrent callers line up `interval` apart.
#[derive(Debug, Default)]
pub struct TaskRateLimiter {
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl TaskRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time the caller has to wait before its request may start
    fn reserve(&self, key: &str, interval: Duration) -> Duration {
        let now = Instant::now();
        let mut slots = self
            .next_slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let slot = slots.entry(key.to_string()).or_insert(now);
        let start = (*slot).max(now);
        *slot = start + interval;
        start - now
    }

    /// Waits for the caller's turn under `key`
    pub async fn wait_turn(&self, key: &str, interval: Duration) {
        if interval.is_zero() {
            return;
        }

        let wait = self.reserve(key, interval);
        if !wait.is_zero() {
            tracing::trace!("Waiting {:?} before next request of {}", wait, key);
            tokio::time::sleep(wait).await;
        }
    }
}

/// Fetches pages over HTTP with reqwest
///
/// Non-2xx responses are failures. Requests of the same task are spaced by
/// that task's `wait_time`.
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    limiter: TaskRateLimiter,
}

impl HttpFetcher {
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::from_client(build_http_client(config)?))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            limiter: TaskRateLimiter::new(),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, request: &Request) -> Result<Vec<u8>, FetchError> {
        self.limiter
            .wait_turn(&request.task.name, request.task.options.wait_time)
            .await;

        let response = self
            .client
            .request(request.method.clone(), &request.url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: request.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: request.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Http {
            url: request.url.clone(),
            source,
        })?;

        tracing::trace!("Fetched {} bytes from {}", body.len(), request.url);
        Ok(body.to_vec())
    }
}
