use crate::model::ParseResult;
use crate::output::{CrawlStats, ItemSink};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Drains parse results and forwards their items to the sink
///
/// Items of one result keep their order. The collector finishes once every
/// result sender is dropped and the channel is empty, so nothing a worker
/// managed to send is lost.
pub struct ResultCollector {
    results: mpsc::Receiver<ParseResult>,
    sink: Arc<dyn ItemSink>,
    stats: Arc<CrawlStats>,
}

impl ResultCollector {
    pub fn new(
        results: mpsc::Receiver<ParseResult>,
        sink: Arc<dyn ItemSink>,
        stats: Arc<CrawlStats>,
    ) -> Self {
        Self {
            results,
            sink,
            stats,
        }
    }

    /// Runs until the channel closes; returns how many items were forwarded
    pub async fn run(mut self) -> usize {
        let mut forwarded = 0;

        while let Some(result) = self.results.recv().await {
            let count = result.items.len();
            for item in result.items {
                tracing::debug!(task = %item.task, rule = %item.rule, "Collected item from {}", item.url);
                self.sink.accept(item);
            }
            self.stats.record_items(count);
            forwarded += count;
        }

        tracing::debug!("Result collector finished with {} item(s)", forwarded);
        forwarded
    }
}
