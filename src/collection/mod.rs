//! Registry module for dependency injection.
//!
//! This module contains the [`Registry`] type: the set of descriptors, the
//! singleton cache, and the entry point for building providers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::descriptors::{Descriptor, DescriptorInfo};
use crate::error::{DiError, DiResult};
use crate::instance::InstanceRecord;
use crate::internal::{InstanceCache, Map, PanicPayload};
use crate::key::{key_of, Key};
use crate::lifetime::{Binding, Lifetime};
use crate::observer::{DiObserver, Observers};
use crate::provider::Provider;
use crate::registration::Dependency;

mod shortcuts;

/// The set of registered descriptors plus the singleton cache.
///
/// Registration needs `&mut self`; resolution goes through providers, which
/// borrow the registry shared. The borrow checker therefore rules out
/// registering while a provider is alive, and guarantees every provider is
/// dropped before the registry it came from.
///
/// Registering a contract that is already present replaces its descriptor in
/// place, keeping its original position in registration order.
///
/// # Examples
///
/// ```
/// use ferrous_deps::{Binding, Dependency, Lifetime, Registry, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut registry = Registry::new();
/// registry
///     .add_dependency(
///         Dependency::instance(Arc::new(Database { url: "postgres://localhost".into() })),
///         Lifetime::Singleton,
///         Binding::Unbound,
///     )
///     .unwrap()
///     .add_dependency(
///         Dependency::provider_factory(|provider| {
///             Ok(Arc::new(UserService { db: provider.resolve::<Database>()? }))
///         }),
///         Lifetime::Transient,
///         Binding::Bound,
///     )
///     .unwrap();
///
/// let provider = registry.build_provider();
/// let users = provider.resolve::<UserService>().unwrap();
/// assert_eq!(users.db.url, "postgres://localhost");
/// ```
pub struct Registry {
    entries: Vec<Descriptor>,
    index: Map<Key, usize>,
    singletons: InstanceCache,
    observers: Observers,
    disposed: AtomicBool,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: Map::default(),
            singletons: InstanceCache::new("registry"),
            observers: Observers::default(),
            disposed: AtomicBool::new(false),
        }
    }

    // ----- Registration -----

    /// Registers contract `T`, replacing any existing registration for it.
    ///
    /// Returns the registry for chaining. Fails with
    /// [`DiError::InvalidArgument`] when the dependency is malformed (a
    /// capability declared twice, an implementation constructor that takes
    /// its own contract, or a pre-built instance with a non-singleton
    /// lifetime), and with [`DiError::Disposed`] once the registry has been
    /// torn down. A failed call leaves the registry unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_deps::{Binding, DiError, Dependency, Lifetime, Registry};
    /// use std::sync::Arc;
    ///
    /// let mut registry = Registry::new();
    /// let err = registry
    ///     .add_dependency(Dependency::instance(Arc::new(1u8)), Lifetime::Scoped, Binding::Bound)
    ///     .err()
    ///     .unwrap();
    /// assert!(matches!(err, DiError::InvalidArgument(_)));
    /// assert!(registry.is_empty());
    /// ```
    pub fn add_dependency<T>(
        &mut self,
        dependency: Dependency<T>,
        lifetime: Lifetime,
        binding: Binding,
    ) -> DiResult<&mut Self>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let descriptor = self.prepare(dependency, lifetime, binding)?;
        self.insert(descriptor);
        Ok(self)
    }

    /// Registers contract `T` only if it is not registered yet.
    ///
    /// Returns `Ok(false)` and leaves the existing descriptor untouched when
    /// `T` is already present. Malformed dependencies still fail, even when
    /// nothing would have been inserted.
    pub fn try_add_dependency<T>(
        &mut self,
        dependency: Dependency<T>,
        lifetime: Lifetime,
        binding: Binding,
    ) -> DiResult<bool>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let descriptor = self.prepare(dependency, lifetime, binding)?;
        if self.index.contains_key(descriptor.key()) {
            return Ok(false);
        }
        self.insert(descriptor);
        Ok(true)
    }

    fn prepare<T>(&self, dependency: Dependency<T>, lifetime: Lifetime, binding: Binding) -> DiResult<Descriptor>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if self.is_disposed() {
            return Err(DiError::Disposed("registry"));
        }
        let key = key_of::<T>();
        dependency.validate(&key)?;
        if dependency.is_instance() && lifetime != Lifetime::Singleton {
            return Err(DiError::InvalidArgument(format!(
                "pre-built instance of {} must be registered as Singleton, not {:?}",
                key, lifetime
            )));
        }
        let (strategy, capabilities) = dependency.into_parts();
        Ok(Descriptor::new(key, lifetime, binding, strategy, capabilities))
    }

    fn insert(&mut self, descriptor: Descriptor) {
        let key = *descriptor.key();
        match self.index.get(&key) {
            Some(&slot) => {
                tracing::debug!(contract = %key, lifetime = ?descriptor.lifetime(), "replacing registration");
                self.entries[slot] = descriptor;
            }
            None => {
                tracing::trace!(contract = %key, lifetime = ?descriptor.lifetime(), "registered");
                self.index.insert(key, self.entries.len());
                self.entries.push(descriptor);
            }
        }
    }

    /// Adds an observer notified of every resolution and disposal.
    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    // ----- Lookup -----

    /// Whether contract `T` is registered.
    pub fn has_dependency<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.contains_key(&key_of::<T>())
    }

    /// Whether the contract named by `key` is registered.
    pub fn contains_key(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    /// Descriptor registered for contract `T`.
    pub fn get_descriptor<T>(&self) -> DiResult<&Descriptor>
    where
        T: ?Sized + 'static,
    {
        self.descriptor(&key_of::<T>())
    }

    /// Descriptor registered for `key`, or [`DiError::DependencyNotFound`].
    pub fn descriptor(&self, key: &Key) -> DiResult<&Descriptor> {
        self.index
            .get(key)
            .map(|&slot| &self.entries[slot])
            .ok_or(DiError::DependencyNotFound(key.display_name()))
    }

    /// Descriptors whose contracts satisfy capability `C`, in registration order.
    ///
    /// Empty when nothing satisfies `C`; that is not an error.
    pub fn get_descriptors_for_capability<C>(&self) -> Vec<&Descriptor>
    where
        C: ?Sized + 'static,
    {
        self.descriptors_for(&key_of::<C>())
    }

    /// Descriptors satisfying the capability named by `capability`.
    pub fn descriptors_for(&self, capability: &Key) -> Vec<&Descriptor> {
        self.entries.iter().filter(|d| d.satisfies(capability)).collect()
    }

    /// Snapshots of every descriptor, in registration order.
    pub fn descriptors(&self) -> Vec<DescriptorInfo> {
        self.entries.iter().map(Descriptor::info).collect()
    }

    /// Number of registered contracts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ----- Resolution -----

    /// Returns the singleton record for `descriptor`, building it on first use.
    ///
    /// The build runs under this contract's build lock, so concurrent first
    /// requests construct the instance exactly once. Other singletons stay
    /// available while it builds. `provider` only supplies
    /// sub-dependencies; the record is owned by the registry.
    pub fn get_or_create_singleton(
        &self,
        descriptor: &Descriptor,
        provider: &Provider<'_>,
    ) -> DiResult<Arc<InstanceRecord>> {
        self.singletons
            .get_or_create(descriptor.key(), || descriptor.get_instance(provider))
    }

    /// Number of singletons built so far.
    pub fn singleton_count(&self) -> usize {
        self.singletons.len()
    }

    /// Creates a new provider with an empty scope.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_deps::{Binding, Dependency, Lifetime, Registry, Resolver};
    /// use std::sync::Arc;
    ///
    /// struct RequestId(u32);
    ///
    /// let mut registry = Registry::new();
    /// registry
    ///     .add_dependency(Dependency::factory(|| Arc::new(RequestId(1))), Lifetime::Scoped, Binding::Bound)
    ///     .unwrap();
    ///
    /// let first = registry.build_provider();
    /// let second = registry.build_provider();
    ///
    /// let a = first.resolve::<RequestId>().unwrap();
    /// let b = first.resolve::<RequestId>().unwrap();
    /// let c = second.resolve::<RequestId>().unwrap();
    ///
    /// assert!(Arc::ptr_eq(&a, &b));
    /// assert!(!Arc::ptr_eq(&a, &c));
    /// ```
    pub fn build_provider(&self) -> Provider<'_> {
        Provider::new(self)
    }

    /// Runs `f` with a fresh provider and disposes the provider afterwards,
    /// even when `f` panics.
    ///
    /// Disposal happens when the provider is dropped. A panicking disposer is
    /// logged and swallowed there instead of being resumed as
    /// [`Provider::dispose`] does. Call `dispose` inside `f` to see it.
    pub fn with_provider<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Provider<'_>) -> R,
    {
        let provider = self.build_provider();
        f(&provider)
    }

    pub(crate) fn observers(&self) -> &Observers {
        &self.observers
    }

    // ----- Teardown -----

    /// Disposes every owned singleton in construction order.
    ///
    /// Idempotent. Every owned singleton is disposed even if an earlier
    /// disposer panics; the first panic is then resumed on the caller.
    /// Afterwards the registry rejects new registrations and resolutions
    /// with [`DiError::Disposed`].
    pub fn dispose(&self) {
        if let Some(payload) = self.teardown() {
            std::panic::resume_unwind(payload);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn teardown(&self) -> Option<PanicPayload> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return None;
        }
        let teardown = self.singletons.teardown();
        for record in &teardown.disposed {
            self.observers.disposed(record.key(), record.lifetime());
        }
        tracing::debug!(disposed = teardown.disposed.len(), "registry disposed");
        teardown.panic
    }

    /// Human-readable dump of every registration.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "Registry ({} registrations)", self.entries.len());
        for info in self.descriptors() {
            let _ = write!(
                out,
                "  {} [{:?}, {:?}] via {:?}",
                info.contract, info.lifetime, info.binding, info.strategy
            );
            if !info.capabilities.is_empty() {
                let _ = write!(out, " satisfies {}", info.capabilities.join(", "));
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones the registrations and observers. The clone starts with an empty
/// singleton cache and is not disposed.
impl Clone for Registry {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            index: self.index.clone(),
            singletons: InstanceCache::new("registry"),
            observers: self.observers.clone(),
            disposed: AtomicBool::new(false),
        }
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        if self.teardown().is_some() {
            tracing::error!("singleton disposer panicked while dropping registry");
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries)
            .field("singletons", &self.singletons.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Resolver;

    struct Counter(u32);

    #[test]
    fn overwrite_keeps_position() {
        let mut registry = Registry::new();
        registry
            .add_dependency(Dependency::factory(|| Arc::new(Counter(1))), Lifetime::Singleton, Binding::Bound)
            .unwrap()
            .add_dependency(Dependency::factory(|| Arc::new(7u8)), Lifetime::Transient, Binding::Bound)
            .unwrap()
            .add_dependency(Dependency::factory(|| Arc::new(Counter(2))), Lifetime::Scoped, Binding::Bound)
            .unwrap();

        assert_eq!(registry.len(), 2);
        let infos = registry.descriptors();
        assert_eq!(infos[0].lifetime, Lifetime::Scoped);
        assert_eq!(infos[1].contract, "u8");

        let provider = registry.build_provider();
        assert_eq!(provider.resolve::<Counter>().unwrap().0, 2);
    }

    #[test]
    fn try_add_never_overwrites() {
        let mut registry = Registry::new();
        assert!(registry
            .try_add_dependency(Dependency::factory(|| Arc::new(Counter(1))), Lifetime::Singleton, Binding::Bound)
            .unwrap());
        assert!(!registry
            .try_add_dependency(Dependency::factory(|| Arc::new(Counter(2))), Lifetime::Transient, Binding::Bound)
            .unwrap());

        let descriptor = registry.get_descriptor::<Counter>().unwrap();
        assert_eq!(descriptor.lifetime(), Lifetime::Singleton);
    }

    #[test]
    fn missing_descriptor_is_not_found() {
        let registry = Registry::new();
        assert_eq!(
            registry.get_descriptor::<Counter>().unwrap_err(),
            DiError::DependencyNotFound(std::any::type_name::<Counter>())
        );
    }

    #[test]
    fn clone_starts_with_fresh_singletons() {
        let mut registry = Registry::new();
        registry
            .add_dependency(Dependency::factory(|| Arc::new(Counter(1))), Lifetime::Singleton, Binding::Bound)
            .unwrap();

        let original = registry.with_provider(|p| p.resolve::<Counter>().unwrap());
        let copy = registry.clone();
        let cloned = copy.with_provider(|p| p.resolve::<Counter>().unwrap());

        assert!(!Arc::ptr_eq(&original, &cloned));
        assert_eq!(registry.singleton_count(), 1);
        assert_eq!(copy.singleton_count(), 1);
    }

    #[test]
    fn disposed_registry_rejects_registration() {
        let mut registry = Registry::new();
        registry.dispose();
        registry.dispose();

        let err = registry
            .add_dependency(Dependency::factory(|| Arc::new(Counter(1))), Lifetime::Singleton, Binding::Bound)
            .err()
            .unwrap();
        assert_eq!(err, DiError::Disposed("registry"));
        assert!(registry.is_empty());
    }
}
