use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::catalog::SlotLabel;

/// One async mutex per (date, slot).
///
/// Serializes the check-then-write section of bookings and reactivations
/// within this process. The storage uniqueness constraint covers other
/// processes.
#[derive(Clone, Default)]
pub struct SlotLocks {
    locks: Arc<DashMap<(NaiveDate, SlotLabel), Arc<Mutex<()>>>>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, date: NaiveDate, slot: SlotLabel) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry((date, slot)).or_default().clone();
        lock.lock_owned().await
    }

    /// Drops idle locks for dates before `date`.
    pub fn prune_before(&self, date: NaiveDate) {
        self.locks
            .retain(|(day, _), lock| *day >= date || Arc::strong_count(lock) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
