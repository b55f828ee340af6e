//! Crawler module: scheduling, workers and engine wiring
//!
//! This module contains the concurrent core of the engine:
//! - The scheduler and its single-owner dispatch loop
//! - Workers that pull, fetch, parse and feed results back
//! - The result collector that forwards items to a sink
//! - The engine that owns the shared lifecycle
//!
//! It also ships the pluggable pieces a real crawl needs: the `Fetcher`
//! trait with a reqwest implementation, and HTML helpers for rules.

mod collector;
mod coordinator;
mod fetcher;
mod parser;
mod progress;
mod scheduler;
mod shutdown;
mod worker;

pub use collector::ResultCollector;
pub use coordinator::{Engine, Seed};
pub use fetcher::{build_http_client, Fetcher, HttpFetcher, TaskRateLimiter};
pub use parser::{parse_html, ParsedPage};
pub use progress::WorkTracker;
pub use scheduler::{DispatchLoop, RequestQueues, Scheduler};
pub use shutdown::{Shutdown, ShutdownSignal};
pub use worker::{RequestOutcome, Worker, WorkerContext};
