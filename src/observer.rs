//! Diagnostic observers for resolution and teardown events.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::key::Key;
use crate::lifetime::Lifetime;

/// Observer trait for resolution and disposal events.
///
/// Observer calls are made synchronously on the resolving thread. Keep
/// implementations lightweight.
///
/// # Examples
///
/// ```
/// use ferrous_deps::{DiError, DiObserver, Key, Lifetime, Registry};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct CountingObserver {
///     resolved: AtomicUsize,
/// }
///
/// impl DiObserver for CountingObserver {
///     fn resolved(&self, _key: &Key, _lifetime: Lifetime, _duration: Duration) {
///         self.resolved.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// let mut registry = Registry::new();
/// registry.add_observer(Arc::new(CountingObserver::default()));
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before a contract is looked up and built.
    fn resolving(&self, _key: &Key) {}

    /// Called after a contract resolved successfully.
    fn resolved(&self, _key: &Key, _lifetime: Lifetime, _duration: Duration) {}

    /// Called when resolution failed; the error still propagates to the caller.
    fn resolution_failed(&self, _key: &Key, _error: &DiError) {}

    /// Called after an owned instance was disposed at teardown.
    fn disposed(&self, _key: &Key, _lifetime: Lifetime) {}
}

/// Registered observers; empty by default.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn resolving(&self, key: &Key) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    pub(crate) fn resolved(&self, key: &Key, lifetime: Lifetime, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, lifetime, duration);
        }
    }

    pub(crate) fn resolution_failed(&self, key: &Key, error: &DiError) {
        for observer in &self.observers {
            observer.resolution_failed(key, error);
        }
    }

    pub(crate) fn disposed(&self, key: &Key, lifetime: Lifetime) {
        for observer in &self.observers {
            observer.disposed(key, lifetime);
        }
    }
}

/// Built-in observer that forwards events to `tracing`.
///
/// Resolutions and disposals are emitted at `debug`, failures at `warn`,
/// all under the `ferrous_deps` target.
///
/// # Examples
///
/// ```
/// use ferrous_deps::{LoggingObserver, Registry};
/// use std::sync::Arc;
///
/// let mut registry = Registry::new();
/// registry.add_observer(Arc::new(LoggingObserver::new()));
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self {
            prefix: "[ferrous-deps]".to_string(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, key: &Key) {
        tracing::trace!(target: "ferrous_deps", prefix = %self.prefix, contract = %key, "resolving");
    }

    fn resolved(&self, key: &Key, lifetime: Lifetime, duration: Duration) {
        tracing::debug!(
            target: "ferrous_deps",
            prefix = %self.prefix,
            contract = %key,
            ?lifetime,
            ?duration,
            "resolved"
        );
    }

    fn resolution_failed(&self, key: &Key, error: &DiError) {
        tracing::warn!(target: "ferrous_deps", prefix = %self.prefix, contract = %key, %error, "resolution failed");
    }

    fn disposed(&self, key: &Key, lifetime: Lifetime) {
        tracing::debug!(target: "ferrous_deps", prefix = %self.prefix, contract = %key, ?lifetime, "disposed");
    }
}
