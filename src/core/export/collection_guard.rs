// At most one collection (history or member dump) runs process-wide. A
// failed begin() means the caller replies "please wait"; requests are never
// queued.

use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

pub struct CollectionGuard {
    slot: Arc<Mutex<()>>,
}

/// Held for the duration of one collection; dropping it frees the slot.
pub struct CollectionPermit {
    _guard: OwnedMutexGuard<()>,
}

impl CollectionGuard {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(())),
        }
    }

    /// Claim the collection slot, or None if another collection holds it.
    pub fn begin(&self) -> Option<CollectionPermit> {
        self.slot
            .clone()
            .try_lock_owned()
            .ok()
            .map(|guard| CollectionPermit { _guard: guard })
    }
}

impl Default for CollectionGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_collection_is_rejected_while_one_runs() {
        let guard = CollectionGuard::new();

        let permit = guard.begin().expect("first collection should start");
        assert!(guard.begin().is_none(), "second must be told to wait");

        drop(permit);
        assert!(guard.begin().is_some(), "slot frees up after completion");
    }
}
