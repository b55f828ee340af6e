//! Crawl Engine: a concurrent request scheduler for web crawls
//!
//! This crate dispatches fetch requests to a bounded pool of workers,
//! enforcing priority ordering, per-URL deduplication, and a single retry
//! for failed fetches. Fetching, parsing rules, and item storage are
//! pluggable behaviour supplied by callers.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod registry;
pub mod state;
pub mod tasks;

#[cfg(test)]
pub(crate) mod test_support;

use thiserror::Error;

/// Main error type for engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Root requests for task '{task}' could not be generated: {source}")]
    RootGeneration { task: String, source: ParseError },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Reasons a request is rejected before it is fetched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Max depth {max_depth} exceeded by {url} (depth {depth})")]
    DepthExceeded {
        url: String,
        depth: u32,
        max_depth: u32,
    },

    #[error("Failed to parse URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Unsupported scheme '{scheme}' in {url}")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("Missing host in {url}")]
    MissingHost { url: String },

    #[error("Unsupported method {method} for {url}")]
    UnsupportedMethod { url: String, method: String },

    #[error("Task '{task}' has no rule named '{rule}'")]
    MissingRule { task: String, rule: String },
}

/// Errors reported by a fetcher
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Fetch failed for {url}: {message}")]
    Failed { url: String, message: String },
}

/// Errors reported by a parsing rule or a root-request generator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Malformed document: {0}")]
    Document(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("{0}")]
    Other(String),
}

/// Task registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("Unknown task '{0}'")]
    UnknownTask(String),
}

/// Scheduler errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("Scheduler stopped, {rejected} request(s) not accepted")]
    Closed { rejected: usize },
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, EngineConfig};
pub use crawler::{Engine, Fetcher, HttpFetcher, Scheduler, Seed, Shutdown};
pub use model::{Context, Fingerprint, Item, ParseResult, Request, Rule, RuleTree, Task, TaskOptions};
pub use output::{ItemSink, LogSink, MemorySink, StatsSnapshot};
pub use registry::TaskRegistry;
pub use state::{FailureTracker, VisitedTracker};
