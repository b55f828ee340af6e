//! Output module: where items go and what a run reports
//!
//! # Components
//!
//! - Item sinks: the boundary callback the result collector forwards items to
//! - Statistics: counters updated by workers and printed at the end of a run

mod sink;
mod stats;

pub use sink::{ChannelSink, ItemSink, LogSink, MemorySink};
pub use stats::{print_statistics, CrawlStats, StatsSnapshot};
