use crate::model::TaskOptions;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the crawl engine
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskEntry>,
}

/// Engine sizing and behaviour
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Number of concurrent workers
    #[serde(rename = "worker-count", default = "default_worker_count")]
    pub worker_count: usize,

    /// Bodies shorter than this (bytes) are treated as failed fetches
    #[serde(rename = "min-body-length", default = "default_min_body_length")]
    pub min_body_length: usize,

    /// Capacity of the scheduler's push channel
    #[serde(rename = "push-buffer", default = "default_push_buffer")]
    pub push_buffer: usize,

    /// Capacity of the results channel between workers and the collector
    #[serde(rename = "result-buffer", default = "default_result_buffer")]
    pub result_buffer: usize,

    /// Stop once nothing is queued, in flight, or being pushed
    #[serde(rename = "exit-when-idle", default = "default_true")]
    pub exit_when_idle: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            min_body_length: default_min_body_length(),
            push_buffer: default_push_buffer(),
            result_buffer: default_result_buffer(),
            exit_when_idle: true,
        }
    }
}

fn default_worker_count() -> usize {
    4
}

fn default_min_body_length() -> usize {
    6000
}

fn default_push_buffer() -> usize {
    64
}

fn default_result_buffer() -> usize {
    16
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> u32 {
    TaskOptions::default().max_depth
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn user_agent(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// A page-title task and the URLs it starts from
#[derive(Debug, Clone, Deserialize)]
pub struct TaskEntry {
    /// Unique task name
    pub name: String,

    /// Root URLs
    pub seeds: Vec<String>,

    /// Fetch every request even if its URL was already visited
    #[serde(default)]
    pub reload: bool,

    /// Minimum time between two requests of this task (milliseconds)
    #[serde(rename = "wait-time", default)]
    pub wait_time: u64,

    /// Maximum link depth from a seed
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Queue links discovered on fetched pages
    #[serde(rename = "follow-links", default = "default_true")]
    pub follow_links: bool,
}

impl TaskEntry {
    pub fn options(&self) -> TaskOptions {
        TaskOptions {
            reload: self.reload,
            wait_time: Duration::from_millis(self.wait_time),
            max_depth: self.max_depth,
        }
    }
}
