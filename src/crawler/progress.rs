use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Counts requests that are queued, in flight, or being pushed
///
/// Every push is preceded by `add`, and every pulled request calls `done`
/// once it reaches a terminal state (after any re-push it caused has been
/// added). The count therefore only reaches zero when the crawl has nothing
/// left to do.
#[derive(Debug, Default)]
pub struct WorkTracker {
    outstanding: AtomicUsize,
    idle: Notify,
}

impl WorkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, n: usize) {
        self.outstanding.fetch_add(n, Ordering::SeqCst);
    }

    pub fn done(&self) {
        self.complete(1);
    }

    /// Marks `n` units finished, waking idle waiters when the count hits zero
    pub fn complete(&self, n: usize) {
        if n == 0 {
            return;
        }

        let previous = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_sub(n))
            })
            .unwrap_or_else(|current| current);

        if previous < n {
            tracing::warn!(previous, n, "Work tracker completed more than it added");
        }
        if previous <= n {
            self.idle.notify_waiters();
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Resolves once no work is outstanding
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }
}
