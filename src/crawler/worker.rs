//! Crawl workers
//!
//! A worker pulls one request at a time and walks it through:
//! validation, abandoned/visited checks, fetch, body check, rule parsing,
//! then hands the items to the collector and the discovered requests back
//! to the scheduler.

use crate::crawler::{Scheduler, ShutdownSignal, WorkTracker};
use crate::model::{Context, ParseResult, Request};
use crate::output::CrawlStats;
use crate::state::{FailureTracker, VisitedTracker};
use crate::{RequestError, SchedulerError};
use reqwest::Method;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Terminal state a pulled request reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Rejected by validation
    Invalid,
    /// Fingerprint was given up after a failed retry
    SkippedAbandoned,
    /// Fingerprint already visited
    Duplicate,
    /// Fetch failed for the first time, request re-pushed
    Retried,
    /// Fetch failed again, fingerprint given up
    Abandoned,
    /// Rule returned an error or panicked
    ParseFailed,
    /// Parse result handed to the collector
    Delivered,
}

/// Shared state every worker needs
#[derive(Clone)]
pub struct WorkerContext {
    pub scheduler: Scheduler,
    pub visited: Arc<VisitedTracker>,
    pub failures: Arc<FailureTracker>,
    pub results: mpsc::Sender<ParseResult>,
    pub stats: Arc<CrawlStats>,
    pub work: Arc<WorkTracker>,
    /// Bodies shorter than this count as failed fetches
    pub min_body_length: usize,
}

pub struct Worker {
    id: usize,
    ctx: WorkerContext,
}

/// Marks a pulled request finished even if processing unwinds
struct PulledRequest<'a> {
    work: &'a WorkTracker,
}

impl Drop for PulledRequest<'_> {
    fn drop(&mut self) {
        self.work.done();
    }
}

impl Worker {
    pub fn new(id: usize, ctx: WorkerContext) -> Self {
        Self { id, ctx }
    }

    /// Pulls and processes requests until shutdown or the scheduler stops
    ///
    /// A request already being processed when shutdown fires is finished.
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        tracing::debug!("Worker {} started", self.id);
        let mut processed = 0usize;

        loop {
            let request = tokio::select! {
                biased;

                _ = shutdown.wait() => break,

                next = self.ctx.scheduler.pull() => match next {
                    Some(request) => request,
                    None => break,
                },
            };

            let _pulled = PulledRequest { work: &self.ctx.work };
            let url = request.url.clone();
            let outcome = self.process(request).await;
            tracing::trace!(?outcome, "Finished {}", url);

            processed += 1;
        }

        tracing::debug!("Worker {} stopped after {} request(s)", self.id, processed);
    }

    /// Takes one request to its terminal state
    pub async fn process(&self, request: Request) -> RequestOutcome {
        let ctx = &self.ctx;

        if let Err(e) = request.check() {
            ctx.stats.record_invalid();
            match e {
                RequestError::DepthExceeded { .. } => tracing::debug!("{}", e),
                RequestError::MissingRule { .. } => tracing::error!("{}", e),
                _ => tracing::warn!("{}", e),
            }
            return RequestOutcome::Invalid;
        }

        let fingerprint = request.fingerprint();
        if ctx.failures.is_abandoned(&fingerprint) {
            ctx.stats.record_skipped_abandoned();
            tracing::debug!("Skipping abandoned {}", request.url);
            return RequestOutcome::SkippedAbandoned;
        }

        if !request.is_reload() && !ctx.visited.check_and_mark(&fingerprint) {
            ctx.stats.record_duplicate();
            tracing::debug!("Already visited {}", request.url);
            return RequestOutcome::Duplicate;
        }

        ctx.stats.record_dispatched();
        tracing::debug!(
            task = %request.task.name,
            depth = request.depth,
            retried = request.retried,
            "Fetching {}",
            request.url
        );

        // HEAD responses carry no body
        let bodyless = request.method == Method::HEAD;
        let body = match request.task.fetcher.get(&request).await {
            Ok(body) if bodyless || body.len() >= ctx.min_body_length => body,
            Ok(body) => {
                tracing::warn!(
                    "Body of {} too short ({} < {} bytes)",
                    request.url,
                    body.len(),
                    ctx.min_body_length
                );
                return self.handle_failure(request).await;
            }
            Err(e) => {
                tracing::warn!("Fetch failed: {}", e);
                return self.handle_failure(request).await;
            }
        };
        ctx.stats.record_fetched();

        let Some(rule) = request.task.rules.rule(&request.rule_name) else {
            ctx.stats.record_invalid();
            tracing::error!(
                "Task '{}' has no rule named '{}'",
                request.task.name,
                request.rule_name
            );
            return RequestOutcome::Invalid;
        };

        let parsed = panic::catch_unwind(AssertUnwindSafe(|| {
            rule.parse(&Context::new(&body, &request))
        }));
        let mut result = match parsed {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                ctx.stats.record_parse_error();
                tracing::warn!(
                    "Rule '{}' failed on {}: {}",
                    request.rule_name,
                    request.url,
                    e
                );
                return RequestOutcome::ParseFailed;
            }
            Err(_) => {
                ctx.stats.record_parse_error();
                tracing::error!("Rule '{}' panicked on {}", request.rule_name, request.url);
                return RequestOutcome::ParseFailed;
            }
        };

        let discovered = mem::take(&mut result.requests);
        if !discovered.is_empty() {
            self.push_discovered(discovered);
        }

        ctx.stats.record_result();
        if ctx.results.send(result).await.is_err() {
            tracing::warn!("Result collector stopped, dropping result of {}", request.url);
        }

        RequestOutcome::Delivered
    }

    /// Pushes discovered requests without holding up this worker
    fn push_discovered(&self, requests: Vec<Request>) {
        let count = requests.len();
        self.ctx.stats.record_discovered(count);
        self.ctx.work.add(count);

        let scheduler = self.ctx.scheduler.clone();
        let work = Arc::clone(&self.ctx.work);
        tokio::spawn(async move {
            if let Err(SchedulerError::Closed { rejected }) = scheduler.push(requests).await {
                tracing::debug!("Scheduler stopped, {} discovered request(s) dropped", rejected);
                work.complete(rejected);
            }
        });
    }

    /// First failure of a fingerprint re-pushes it, the second gives up
    async fn handle_failure(&self, request: Request) -> RequestOutcome {
        let ctx = &self.ctx;
        ctx.stats.record_fetch_failure();

        if !ctx.failures.record_failure(&request) {
            ctx.stats.record_abandoned();
            tracing::error!("Giving up on {} after retry", request.url);
            return RequestOutcome::Abandoned;
        }

        if !request.is_reload() {
            ctx.visited.unmark(&request.fingerprint());
        }
        ctx.stats.record_retry();
        tracing::info!("Retrying {}", request.url);

        ctx.work.add(1);
        if ctx.scheduler.push([request.into_retry()]).await.is_err() {
            tracing::debug!("Scheduler stopped, retry dropped");
            ctx.work.done();
        }

        RequestOutcome::Retried
    }
}
