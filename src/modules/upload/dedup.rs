use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::hash::Fingerprint;

/// Process-lifetime set of fingerprints that have already been admitted.
///
/// The only mutating entry point is the atomic [`check_and_mark`]; there is no
/// separate "mark" so callers cannot reintroduce a check-then-mark gap.
///
/// [`check_and_mark`]: DuplicateDetector::check_and_mark
#[derive(Clone, Default)]
pub struct DuplicateDetector {
    seen: Arc<Mutex<HashSet<Fingerprint>>>,
}

impl DuplicateDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `fingerprint`, returning `true` if it was not present before.
    pub fn check_and_mark(&self, fingerprint: Fingerprint) -> bool {
        self.seen.lock().insert(fingerprint)
    }

    /// Marks `fingerprint` provisionally. The mark is withdrawn when the returned
    /// claim is dropped without [`FingerprintClaim::commit`], so an upload that is
    /// turned away later (queue full) can be retried.
    pub fn claim(&self, fingerprint: Fingerprint) -> Option<FingerprintClaim> {
        self.check_and_mark(fingerprint).then(|| FingerprintClaim {
            detector: self.clone(),
            fingerprint,
            committed: false,
        })
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.seen.lock().contains(fingerprint)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.seen.lock().len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}

pub struct FingerprintClaim {
    detector: DuplicateDetector,
    fingerprint: Fingerprint,
    committed: bool,
}

impl FingerprintClaim {
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for FingerprintClaim {
    fn drop(&mut self) {
        if !self.committed {
            self.detector.seen.lock().remove(&self.fingerprint);
        }
    }
}
