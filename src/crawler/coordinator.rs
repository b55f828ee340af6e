//! Engine - crawl orchestration
//!
//! This module wires the concurrent pieces together for one run:
//! - Resolving seeds against the task registry and generating root requests
//! - Starting the dispatch loop, the worker pool and the result collector
//! - Deciding when the crawl is over (idle or shutdown)
//! - Draining everything already produced before returning statistics

use crate::config::{validate_engine_config, EngineConfig};
use crate::crawler::{
    Fetcher, ResultCollector, Scheduler, Shutdown, WorkTracker, Worker, WorkerContext,
};
use crate::model::{Request, Task};
use crate::output::{CrawlStats, ItemSink, StatsSnapshot};
use crate::registry::TaskRegistry;
use crate::state::{FailureTracker, VisitedTracker};
use crate::{EngineError, SchedulerError};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::Instrument;

/// A task to start, optionally with its own fetcher
#[derive(Clone)]
pub struct Seed {
    pub task: String,
    pub fetcher: Option<Arc<dyn Fetcher>>,
}

impl Seed {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            fetcher: None,
        }
    }

    /// Runs the task through `fetcher` instead of the registered one
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }
}

/// Top-level crawl runner
///
/// An engine is consumed by [`Engine::run`]; visited and failure state live
/// for exactly one run.
pub struct Engine {
    config: EngineConfig,
    registry: Arc<TaskRegistry>,
    sink: Arc<dyn ItemSink>,
    seeds: Vec<Seed>,
    shutdown: Shutdown,
}

impl Engine {
    pub fn new(config: EngineConfig, registry: Arc<TaskRegistry>, sink: Arc<dyn ItemSink>) -> Self {
        Self {
            config,
            registry,
            sink,
            seeds: Vec::new(),
            shutdown: Shutdown::new(),
        }
    }

    /// Tasks to start; without seeds every registered task is started
    pub fn with_seeds<I>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = Seed>,
    {
        self.seeds.extend(seeds);
        self
    }

    /// Handle that stops the run when triggered
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Resolves seeds and collects their root requests in seed order
    fn seed_requests(&self) -> Result<Vec<Request>, EngineError> {
        let tasks: Vec<Arc<Task>> = if self.seeds.is_empty() {
            self.registry.tasks().to_vec()
        } else {
            self.seeds
                .iter()
                .map(|seed| -> Result<Arc<Task>, EngineError> {
                    let task = self.registry.lookup(&seed.task)?;
                    Ok(match &seed.fetcher {
                        Some(fetcher) => Arc::new(task.with_fetcher(Arc::clone(fetcher))),
                        None => task,
                    })
                })
                .collect::<Result<_, _>>()?
        };

        let mut roots = Vec::new();
        for task in &tasks {
            let requests =
                Task::root_requests(task).map_err(|source| EngineError::RootGeneration {
                    task: task.name.clone(),
                    source,
                })?;
            tracing::debug!("Task '{}' produced {} root request(s)", task.name, requests.len());
            roots.extend(requests);
        }

        Ok(roots)
    }

    /// Runs the crawl to completion
    ///
    /// Returns once the crawl is idle (when `exit_when_idle` is set) or the
    /// shutdown handle is triggered. Fails only on startup errors.
    pub async fn run(self) -> Result<StatsSnapshot, EngineError> {
        validate_engine_config(&self.config)?;
        let roots = self.seed_requests()?;
        let start_time = Instant::now();

        tracing::info!(
            "Starting crawl: {} root request(s), {} worker(s)",
            roots.len(),
            self.config.worker_count
        );

        let stats = Arc::new(CrawlStats::new());
        let failures = Arc::new(FailureTracker::new());
        let work = Arc::new(WorkTracker::new());
        let (scheduler, dispatch) = Scheduler::new(self.config.push_buffer);
        let (results_tx, results_rx) = mpsc::channel(self.config.result_buffer);

        let dispatch_handle = tokio::spawn(dispatch.run(self.shutdown.subscribe()));
        let collector = ResultCollector::new(results_rx, Arc::clone(&self.sink), Arc::clone(&stats));
        let collector_handle = tokio::spawn(collector.run());

        let ctx = WorkerContext {
            scheduler: scheduler.clone(),
            visited: Arc::new(VisitedTracker::new()),
            failures: Arc::clone(&failures),
            results: results_tx,
            stats: Arc::clone(&stats),
            work: Arc::clone(&work),
            min_body_length: self.config.min_body_length,
        };

        let workers: Vec<_> = (0..self.config.worker_count)
            .map(|worker_id| {
                let worker = Worker::new(worker_id, ctx.clone());
                let span = tracing::info_span!("worker", worker_id);
                tokio::spawn(worker.run(self.shutdown.subscribe()).instrument(span))
            })
            .collect();
        // Workers hold the only result senders from here on
        drop(ctx);

        work.add(roots.len());
        if let Err(SchedulerError::Closed { rejected }) = scheduler.push(roots).await {
            tracing::warn!("Scheduler stopped before {} root request(s) were queued", rejected);
            work.complete(rejected);
        }

        let mut signal = self.shutdown.subscribe();
        if self.config.exit_when_idle {
            tokio::select! {
                _ = work.wait_idle() => tracing::info!("No work left, stopping crawl"),
                _ = signal.wait() => tracing::info!("Shutdown requested, stopping crawl"),
            }
        } else {
            signal.wait().await;
            tracing::info!("Shutdown requested, stopping crawl");
        }

        self.shutdown.trigger();
        for (worker_id, handle) in workers.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!("Worker {} ended abnormally: {}", worker_id, e);
            }
        }
        drop(scheduler);

        if let Err(e) = dispatch_handle.await {
            tracing::error!("Dispatch loop ended abnormally: {}", e);
        }
        match collector_handle.await {
            Ok(forwarded) => tracing::debug!("{} item(s) forwarded to sink", forwarded),
            Err(e) => tracing::error!("Result collector ended abnormally: {}", e),
        }

        if failures.abandoned_count() > 0 {
            tracing::warn!("{} URL(s) abandoned after retry", failures.abandoned_count());
            for url in failures.abandoned_urls() {
                tracing::warn!("  Abandoned: {}", url);
            }
        }

        let snapshot = stats.snapshot();
        tracing::info!(
            "Crawl completed: {} fetched, {} item(s) in {:?}",
            snapshot.fetched,
            snapshot.items,
            start_time.elapsed()
        );

        Ok(snapshot)
    }
}
