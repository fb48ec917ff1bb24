//! Internal disposal list for owned instance records.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::instance::InstanceRecord;

/// Panic payload captured while running a disposer.
pub(crate) type PanicPayload = Box<dyn Any + Send>;

/// Owned, disposable records in construction order.
///
/// Teardown runs first-in, first-out. A panicking disposer does not stop the
/// remaining records from being disposed; the first payload is handed back
/// to the caller.
#[derive(Default)]
pub(crate) struct DisposalList {
    records: Vec<Arc<InstanceRecord>>,
}

impl DisposalList {
    /// Tracks a record if its container owns its disposal.
    pub(crate) fn track(&mut self, record: &Arc<InstanceRecord>) -> bool {
        if record.is_owned() {
            self.records.push(record.clone());
            true
        } else {
            false
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drains the list, returning the records in construction order.
    pub(crate) fn take(&mut self) -> Vec<Arc<InstanceRecord>> {
        std::mem::take(&mut self.records)
    }
}

/// Outcome of disposing a batch of records.
#[derive(Default)]
pub(crate) struct Teardown {
    pub(crate) disposed: Vec<Arc<InstanceRecord>>,
    pub(crate) panic: Option<PanicPayload>,
}

/// Disposes `records` in order, continuing past panicking disposers.
pub(crate) fn dispose_in_order(records: Vec<Arc<InstanceRecord>>) -> Teardown {
    let mut teardown = Teardown::default();
    for record in records {
        match catch_unwind(AssertUnwindSafe(|| record.dispose())) {
            Ok(true) => teardown.disposed.push(record),
            Ok(false) => {}
            Err(payload) => {
                tracing::warn!(contract = %record.key(), "disposer panicked during teardown");
                if teardown.panic.is_none() {
                    teardown.panic = Some(payload);
                }
            }
        }
    }
    teardown
}
