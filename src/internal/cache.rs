//! Instance cache shared by the registry and providers.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::{Mutex, ReentrantMutex};

use super::{dispose_in_order, DisposalList, Map, Teardown};
use crate::error::{DiError, DiResult};
use crate::instance::InstanceRecord;
use crate::key::Key;

/// One cached contract. The cell is read without locking; `build` serializes
/// construction of this key only.
#[derive(Default)]
struct Slot {
    cell: OnceCell<Arc<InstanceRecord>>,
    build: ReentrantMutex<()>,
}

#[derive(Default)]
struct CacheState {
    slots: Map<Key, Arc<Slot>>,
    owned: DisposalList,
    closed: bool,
}

/// Instance cache plus the disposal list of the container that owns it.
///
/// The state lock covers slot lookup and bookkeeping only and is never held
/// across a build. Each key has its own re-entrant build lock: building an
/// instance may resolve the same key again on the same thread, while builds
/// of other keys proceed independently.
pub(crate) struct InstanceCache {
    owner: &'static str,
    state: Mutex<CacheState>,
}

impl InstanceCache {
    pub(crate) fn new(owner: &'static str) -> Self {
        Self {
            owner,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub(crate) fn get(&self, key: &Key) -> Option<Arc<InstanceRecord>> {
        let slot = self.state.lock().slots.get(key).cloned()?;
        slot.cell.get().cloned()
    }

    fn slot(&self, key: &Key) -> DiResult<Arc<Slot>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(DiError::Disposed(self.owner));
        }
        Ok(state.slots.entry(*key).or_default().clone())
    }

    /// Returns the cached record for `key`, building and caching it at most once.
    ///
    /// Concurrent callers for the same key serialize on its build lock, so
    /// only one of them runs `build`; the rest observe its record.
    pub(crate) fn get_or_create<F>(&self, key: &Key, build: F) -> DiResult<Arc<InstanceRecord>>
    where
        F: FnOnce() -> DiResult<InstanceRecord>,
    {
        let slot = self.slot(key)?;
        if let Some(record) = slot.cell.get() {
            return Ok(record.clone());
        }

        let _building = slot.build.lock();
        if let Some(record) = slot.cell.get() {
            return Ok(record.clone());
        }

        let record = Arc::new(build()?);
        // A re-entrant build of the same key may have finished first. The
        // first record stays cached; this one is still owned and tracked.
        let cached = match slot.cell.try_insert(record.clone()) {
            Ok(cached) => cached.clone(),
            Err((existing, _)) => existing.clone(),
        };
        self.track(&record)?;
        Ok(cached)
    }

    /// Tracks a record for disposal at teardown.
    ///
    /// After teardown the record is disposed at once and `Disposed` is returned.
    pub(crate) fn track(&self, record: &Arc<InstanceRecord>) -> DiResult<()> {
        let mut state = self.state.lock();
        if state.closed {
            drop(state);
            record.dispose();
            return Err(DiError::Disposed(self.owner));
        }
        state.owned.track(record);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.state
            .lock()
            .slots
            .values()
            .filter(|slot| slot.cell.get().is_some())
            .count()
    }

    pub(crate) fn tracked(&self) -> usize {
        self.state.lock().owned.len()
    }

    /// Closes the cache and disposes every owned record in construction order.
    pub(crate) fn teardown(&self) -> Teardown {
        let (records, slots) = {
            let mut state = self.state.lock();
            state.closed = true;
            (state.owned.take(), std::mem::take(&mut state.slots))
        };
        let teardown = dispose_in_order(records);
        drop(slots);
        teardown
    }
}
