//! Per-proposal mutual exclusion.
//!
//! Every read-modify-write sequence against one proposal (vote admission and
//! tally recompute, activation, lazy finalization) runs inside
//! [`ProposalLocks::with_lock`] for that proposal's id. Work on different
//! proposals proceeds in parallel. The guarded closures must not re-enter the
//! lock of the same proposal.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use agora_types::ProposalId;

#[derive(Default)]
pub struct ProposalLocks {
    table: Mutex<HashMap<ProposalId, Arc<Mutex<()>>>>,
}

/// The guarded data is `()`, so a poisoned lock carries no broken state.
fn recover<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ProposalLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the exclusive lock for `id`. The table entry is
    /// released even if `f` panics.
    pub fn with_lock<R>(&self, id: &ProposalId, f: impl FnOnce() -> R) -> R {
        let release = SlotRelease {
            locks: self,
            id: *id,
            slot: Arc::clone(recover(&self.table).entry(*id).or_default()),
        };
        // Declared after `release` so the slot is unlocked before cleanup.
        let _guard = recover(release.slot.as_ref());
        f()
    }

    /// Number of proposals with a lock currently held or awaited.
    pub fn in_use(&self) -> usize {
        recover(&self.table).len()
    }
}

/// Drops a table entry once its last user is done with it.
struct SlotRelease<'a> {
    locks: &'a ProposalLocks,
    id: ProposalId,
    slot: Arc<Mutex<()>>,
}

impl Drop for SlotRelease<'_> {
    fn drop(&mut self) {
        // Clones are only taken under the table lock, so a count of two
        // (table + ours) means nobody else holds or waits for this slot.
        let mut table = recover(&self.locks.table);
        if Arc::strong_count(&self.slot) == 2 {
            table.remove(&self.id);
        }
    }
}
