//! Disposal trait for resource cleanup.

use std::sync::Arc;

/// Trait for synchronous resource disposal.
///
/// Implement this for dependencies that need structured teardown (flushing
/// buffers, closing connections). The owning container calls `dispose`
/// exactly once, during its teardown, for every Bound instance it owns.
///
/// # Examples
///
/// ```
/// use ferrous_deps::{Binding, Dependency, Dispose, Lifetime, Registry, Resolver};
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// struct Cache {
///     flushed: AtomicBool,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         self.flushed.store(true, Ordering::SeqCst);
///     }
/// }
///
/// let mut registry = Registry::new();
/// registry
///     .add_dependency(
///         Dependency::factory(|| Arc::new(Cache { flushed: AtomicBool::new(false) })).disposable(),
///         Lifetime::Scoped,
///         Binding::Bound,
///     )
///     .unwrap();
///
/// let cache = registry.with_provider(|provider| provider.resolve::<Cache>().unwrap());
/// assert!(cache.flushed.load(Ordering::SeqCst));
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self);
}

/// Adapts an `Arc<T>` of any disposable contract, sized or `dyn`, to `Arc<dyn Dispose>`.
pub(crate) struct DisposeVia<T: ?Sized>(pub(crate) Arc<T>);

impl<T> Dispose for DisposeVia<T>
where
    T: ?Sized + Dispose,
{
    fn dispose(&self) {
        self.0.dispose();
    }
}

/// Erases a disposable instance into the handle stored on its instance record.
pub fn disposer_of<T>(instance: &Arc<T>) -> Arc<dyn Dispose>
where
    T: ?Sized + Dispose,
{
    Arc::new(DisposeVia(instance.clone()))
}
