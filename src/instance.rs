//! Instance records: produced objects paired with their ownership metadata.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::descriptors::Activation;
use crate::key::Key;
use crate::lifetime::{Binding, Lifetime};
use crate::registration::AnyArc;
use crate::traits::Dispose;

/// A produced object plus the lifetime and binding of the descriptor that
/// built it.
///
/// Disposability is fixed when the record is created. The record moves from
/// active to disposed at most once, and only through its owning container's
/// teardown.
pub struct InstanceRecord {
    key: Key,
    instance: AnyArc,
    lifetime: Lifetime,
    binding: Binding,
    disposer: Option<Arc<dyn Dispose>>,
    disposed: AtomicBool,
}

impl InstanceRecord {
    pub(crate) fn new(key: Key, lifetime: Lifetime, binding: Binding, activation: Activation) -> Self {
        Self {
            key,
            instance: activation.instance,
            lifetime,
            binding,
            disposer: activation.disposer,
            disposed: AtomicBool::new(false),
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The produced object, type-erased.
    pub fn instance(&self) -> AnyArc {
        self.instance.clone()
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    /// Whether the produced object exposes disposal.
    pub fn is_disposable(&self) -> bool {
        self.disposer.is_some()
    }

    /// Whether the owning container must dispose this record at teardown.
    pub fn is_owned(&self) -> bool {
        self.binding == Binding::Bound && self.is_disposable()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Disposes the produced object if owned and still active.
    ///
    /// Returns `true` only for the call that actually performed disposal.
    pub(crate) fn dispose(&self) -> bool {
        if !self.is_owned() || self.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }
        if let Some(disposer) = &self.disposer {
            disposer.dispose();
        }
        true
    }
}

impl std::fmt::Debug for InstanceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceRecord")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("binding", &self.binding)
            .field("disposable", &self.is_disposable())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
