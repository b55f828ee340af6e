//! Crawl statistics
//!
//! Workers and the collector bump these counters as requests move through
//! their state machine; `snapshot` freezes them for reporting.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by every engine component
#[derive(Debug, Default)]
pub struct CrawlStats {
    dispatched: AtomicU64,
    fetched: AtomicU64,
    duplicates: AtomicU64,
    invalid: AtomicU64,
    skipped_abandoned: AtomicU64,
    fetch_failures: AtomicU64,
    retries: AtomicU64,
    abandoned: AtomicU64,
    parse_errors: AtomicU64,
    discovered: AtomicU64,
    results: AtomicU64,
    items: AtomicU64,
}

/// Point-in-time copy of `CrawlStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Requests handed to a fetcher
    pub dispatched: u64,
    /// Fetches that returned a usable body
    pub fetched: u64,
    /// Requests dropped because their fingerprint was already visited
    pub duplicates: u64,
    /// Requests that failed validation
    pub invalid: u64,
    /// Requests dropped because their fingerprint was abandoned
    pub skipped_abandoned: u64,
    /// Failed fetches, including undersized bodies
    pub fetch_failures: u64,
    /// Automatic re-pushes after a first failure
    pub retries: u64,
    /// Fingerprints given up after their retry failed
    pub abandoned: u64,
    /// Rule invocations that returned an error
    pub parse_errors: u64,
    /// Requests discovered by rules
    pub discovered: u64,
    /// Parse results handed to the collector
    pub results: u64,
    /// Items forwarded to the sink
    pub items: u64,
}

fn bump(counter: &AtomicU64, n: u64) {
    counter.fetch_add(n, Ordering::Relaxed);
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dispatched(&self) {
        bump(&self.dispatched, 1);
    }

    pub fn record_fetched(&self) {
        bump(&self.fetched, 1);
    }

    pub fn record_duplicate(&self) {
        bump(&self.duplicates, 1);
    }

    pub fn record_invalid(&self) {
        bump(&self.invalid, 1);
    }

    pub fn record_skipped_abandoned(&self) {
        bump(&self.skipped_abandoned, 1);
    }

    pub fn record_fetch_failure(&self) {
        bump(&self.fetch_failures, 1);
    }

    pub fn record_retry(&self) {
        bump(&self.retries, 1);
    }

    pub fn record_abandoned(&self) {
        bump(&self.abandoned, 1);
    }

    pub fn record_parse_error(&self) {
        bump(&self.parse_errors, 1);
    }

    pub fn record_discovered(&self, n: usize) {
        bump(&self.discovered, n as u64);
    }

    pub fn record_result(&self) {
        bump(&self.results, 1);
    }

    pub fn record_items(&self, n: usize) {
        bump(&self.items, n as u64);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        StatsSnapshot {
            dispatched: load(&self.dispatched),
            fetched: load(&self.fetched),
            duplicates: load(&self.duplicates),
            invalid: load(&self.invalid),
            skipped_abandoned: load(&self.skipped_abandoned),
            fetch_failures: load(&self.fetch_failures),
            retries: load(&self.retries),
            abandoned: load(&self.abandoned),
            parse_errors: load(&self.parse_errors),
            discovered: load(&self.discovered),
            results: load(&self.results),
            items: load(&self.items),
        }
    }
}

impl StatsSnapshot {
    /// Share of dispatched requests that produced a body, in percent
    pub fn success_rate(&self) -> f64 {
        if self.dispatched == 0 {
            0.0
        } else {
            (self.fetched as f64 / self.dispatched as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StatsSnapshot) {
    println!("=== Crawl Statistics ===\n");

    println!("Requests:");
    println!("  Dispatched: {}", stats.dispatched);
    println!("  Fetched: {}", stats.fetched);
    println!("  Discovered: {}", stats.discovered);
    println!();

    println!("Skipped:");
    println!("  Duplicates: {}", stats.duplicates);
    println!("  Invalid: {}", stats.invalid);
    println!("  Previously abandoned: {}", stats.skipped_abandoned);
    println!();

    if stats.fetch_failures > 0 || stats.parse_errors > 0 {
        println!("Error Summary:");
        println!("  Fetch failures: {}", stats.fetch_failures);
        println!("  Retries: {}", stats.retries);
        println!("  Abandoned: {}", stats.abandoned);
        println!("  Parse errors: {}", stats.parse_errors);
        println!();
    }

    println!("Output:");
    println!("  Results: {}", stats.results);
    println!("  Items: {}", stats.items);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} requests fetched)",
        stats.success_rate(),
        stats.fetched,
        stats.dispatched
    );
}
