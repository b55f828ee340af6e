use crate::model::Fingerprint;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Set of fingerprints that have been dispatched to a worker
///
/// Every operation is a single critical section, so a mark is visible to
/// all workers as soon as the call returns. Requests of reload tasks never
/// go through this tracker.
#[derive(Debug, Default)]
pub struct VisitedTracker {
    visited: Mutex<HashSet<Fingerprint>>,
}

impl VisitedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, HashSet<Fingerprint>> {
        self.visited.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn has_visited(&self, fingerprint: &Fingerprint) -> bool {
        self.guard().contains(fingerprint)
    }

    pub fn mark_visited<I>(&self, fingerprints: I)
    where
        I: IntoIterator<Item = Fingerprint>,
    {
        self.guard().extend(fingerprints);
    }

    /// Marks `fingerprint` and reports whether it was unvisited before
    ///
    /// Workers use this instead of `has_visited` followed by `mark_visited`:
    /// exactly one concurrent caller gets `true` for a given fingerprint.
    pub fn check_and_mark(&self, fingerprint: &Fingerprint) -> bool {
        self.guard().insert(fingerprint.clone())
    }

    /// Removes the mark so the fingerprint can be dispatched again
    pub fn unmark(&self, fingerprint: &Fingerprint) -> bool {
        self.guard().remove(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}
