//! Shared crawl state touched directly by every worker
//!
//! # Components
//!
//! - `VisitedTracker`: fingerprints already dispatched, for at-most-once fetching
//! - `FailureTracker`: fingerprints that failed, for the single automatic retry

mod failures;
mod visited;

pub use failures::FailureTracker;
pub use visited::VisitedTracker;
