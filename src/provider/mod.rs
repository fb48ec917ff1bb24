//! Provider module for dependency injection.
//!
//! This module contains the [`Provider`] type: a resolution scope borrowed
//! from a [`Registry`], holding scoped instances and tracking the disposable
//! objects it owns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::collection::Registry;
use crate::descriptors::Descriptor;
use crate::error::{DiError, DiResult};
use crate::instance::InstanceRecord;
use crate::internal::{InstanceCache, PanicPayload};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registration::AnyArc;
use crate::traits::ResolverCore;

/// A resolution scope over a [`Registry`].
///
/// Singletons come from the registry's cache and belong to the registry.
/// Scoped instances are built once per provider and cached here. Transient
/// instances are built on every request. Every owned (bound and disposable)
/// instance the provider itself builds is disposed when the provider is
/// disposed or dropped, in construction order.
///
/// A provider is `Sync`: it can be shared by reference across threads, and
/// concurrent first requests for a scoped contract build it exactly once.
///
/// # Examples
///
/// ```
/// use ferrous_deps::{Binding, Dependency, Dispose, Lifetime, Registry, Resolver};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Connection { closed: AtomicBool }
///
/// impl Dispose for Connection {
///     fn dispose(&self) {
///         self.closed.store(true, Ordering::SeqCst);
///     }
/// }
///
/// let mut registry = Registry::new();
/// registry
///     .add_dependency(
///         Dependency::factory(|| Arc::new(Connection::default())).disposable(),
///         Lifetime::Scoped,
///         Binding::Bound,
///     )
///     .unwrap();
///
/// let provider = registry.build_provider();
/// let conn = provider.resolve::<Connection>().unwrap();
/// assert!(!conn.closed.load(Ordering::SeqCst));
///
/// provider.dispose();
/// assert!(conn.closed.load(Ordering::SeqCst));
/// ```
pub struct Provider<'r> {
    registry: &'r Registry,
    scope: InstanceCache,
    disposed: AtomicBool,
}

impl<'r> Provider<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            scope: InstanceCache::new("provider"),
            disposed: AtomicBool::new(false),
        }
    }

    /// The registry this provider resolves from.
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Number of scoped instances cached by this provider.
    pub fn scoped_count(&self) -> usize {
        self.scope.len()
    }

    /// Number of owned instances this provider will dispose at teardown.
    pub fn tracked_disposables(&self) -> usize {
        self.scope.tracked()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn ensure_active(&self) -> DiResult<()> {
        if self.is_disposed() {
            return Err(DiError::Disposed("provider"));
        }
        Ok(())
    }

    fn resolve_record(&self, key: &Key) -> DiResult<Arc<InstanceRecord>> {
        self.ensure_active()?;
        if let Some(record) = self.scope.get(key) {
            return Ok(record);
        }
        let descriptor = self.registry.descriptor(key)?;
        self.activate(descriptor)
    }

    /// Produces an instance for `descriptor` according to its lifetime.
    fn activate(&self, descriptor: &Descriptor) -> DiResult<Arc<InstanceRecord>> {
        match descriptor.lifetime() {
            Lifetime::Singleton => self.registry.get_or_create_singleton(descriptor, self),
            Lifetime::Scoped => self
                .scope
                .get_or_create(descriptor.key(), || descriptor.get_instance(self)),
            Lifetime::Transient => {
                let record = Arc::new(descriptor.get_instance(self)?);
                self.scope.track(&record)?;
                Ok(record)
            }
        }
    }

    // ----- Teardown -----

    /// Disposes every owned instance this provider built, in construction
    /// order, and clears the scoped cache.
    ///
    /// Idempotent. Every owned instance is disposed even if an earlier
    /// disposer panics; the first panic is then resumed on the caller.
    /// Singletons are left to the registry.
    pub fn dispose(&self) {
        if let Some(payload) = self.teardown() {
            std::panic::resume_unwind(payload);
        }
    }

    fn teardown(&self) -> Option<PanicPayload> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return None;
        }
        let teardown = self.scope.teardown();
        let observers = self.registry.observers();
        for record in &teardown.disposed {
            observers.disposed(record.key(), record.lifetime());
        }
        tracing::debug!(disposed = teardown.disposed.len(), "provider disposed");
        teardown.panic
    }
}

impl Provider<'_> {
    /// Runs `resolve` for `key`, reporting it to any observers.
    fn observed(
        &self,
        key: &Key,
        resolve: impl FnOnce() -> DiResult<Arc<InstanceRecord>>,
    ) -> DiResult<Arc<InstanceRecord>> {
        let observers = self.registry.observers();
        if !observers.has_observers() {
            return resolve();
        }

        observers.resolving(key);
        let start = Instant::now();
        match resolve() {
            Ok(record) => {
                observers.resolved(key, record.lifetime(), start.elapsed());
                Ok(record)
            }
            Err(error) => {
                observers.resolution_failed(key, &error);
                Err(error)
            }
        }
    }
}

impl ResolverCore for Provider<'_> {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.observed(key, || self.resolve_record(key))
            .map(|record| record.instance())
    }

    fn resolve_all_any(&self, capability: &Key) -> DiResult<Vec<AnyArc>> {
        self.ensure_active()?;
        let descriptors = self.registry.descriptors_for(capability);
        let mut instances = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let Some(cast) = descriptor.capability(capability) else {
                continue;
            };
            let record = self.observed(descriptor.key(), || match self.scope.get(descriptor.key()) {
                Some(record) => Ok(record),
                None => self.activate(descriptor),
            })?;
            instances.push(cast.apply(&record.instance())?);
        }
        Ok(instances)
    }

    fn has_key(&self, key: &Key) -> bool {
        self.registry.contains_key(key)
    }
}

impl Drop for Provider<'_> {
    fn drop(&mut self) {
        if self.teardown().is_some() {
            tracing::error!("disposer panicked while dropping provider");
        }
    }
}

impl std::fmt::Debug for Provider<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("scoped", &self.scoped_count())
            .field("tracked", &self.tracked_disposables())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
