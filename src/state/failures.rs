use crate::model::{Fingerprint, Request};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct FailureLedger {
    /// First failed request per fingerprint
    failures: HashMap<Fingerprint, Request>,

    /// Fingerprints whose retry failed as well
    abandoned: HashSet<Fingerprint>,
}

/// Allows exactly one retry per fingerprint
///
/// Entries are never evicted: the ledger grows with the number of distinct
/// failing fingerprints for the lifetime of the engine.
#[derive(Debug, Default)]
pub struct FailureTracker {
    ledger: Mutex<FailureLedger>,
}

impl FailureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, FailureLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a failed fetch of `request`
    ///
    /// # Returns
    ///
    /// * `true` - First failure for this fingerprint; re-push it once
    /// * `false` - The fingerprint already failed once; it is now abandoned
    pub fn record_failure(&self, request: &Request) -> bool {
        let fingerprint = request.fingerprint();
        let mut ledger = self.guard();

        if ledger.failures.contains_key(&fingerprint) {
            ledger.abandoned.insert(fingerprint);
            false
        } else {
            ledger.failures.insert(fingerprint, request.clone());
            true
        }
    }

    /// Whether the fingerprint exhausted its retry
    pub fn is_abandoned(&self, fingerprint: &Fingerprint) -> bool {
        self.guard().abandoned.contains(fingerprint)
    }

    /// Number of fingerprints with at least one failure
    pub fn len(&self) -> usize {
        self.guard().failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().failures.is_empty()
    }

    pub fn abandoned_count(&self) -> usize {
        self.guard().abandoned.len()
    }

    /// URLs of every abandoned fingerprint, sorted
    pub fn abandoned_urls(&self) -> Vec<String> {
        let ledger = self.guard();
        let mut urls: Vec<String> = ledger
            .abandoned
            .iter()
            .filter_map(|fingerprint| ledger.failures.get(fingerprint))
            .map(|request| request.url.clone())
            .collect();
        urls.sort();
        urls
    }
}
