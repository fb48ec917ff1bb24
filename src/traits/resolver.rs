//! Resolver traits for dependency resolution.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::{key_of, Key};
use crate::registration::AnyArc;

/// Core resolver trait for object-safe resolution.
///
/// Works on type-erased instances keyed by [`Key`]. Most callers use
/// [`Resolver`] instead, which adds typed generic methods on top.
pub trait ResolverCore: Send + Sync {
    /// Resolves one contract, honouring its lifetime.
    ///
    /// The returned value wraps an `Arc<T>` for the contract `T` the key names.
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc>;

    /// Resolves every contract that declared `capability`, in registration order.
    ///
    /// Each returned value wraps an `Arc<C>` for the capability `C`.
    fn resolve_all_any(&self, capability: &Key) -> DiResult<Vec<AnyArc>>;

    /// Whether the contract is registered.
    fn has_key(&self, key: &Key) -> bool;
}

/// Typed resolution interface.
///
/// Implemented for every [`ResolverCore`], so a [`Provider`](crate::Provider)
/// and the provider handed to provider-aware factories expose the same surface.
///
/// # Examples
///
/// ```
/// use ferrous_deps::{Binding, Dependency, Lifetime, Registry, Resolver};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str) -> String;
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) -> String {
///         format!("LOG: {}", msg)
///     }
/// }
///
/// let mut registry = Registry::new();
/// registry
///     .add_dependency(
///         Dependency::<dyn Logger>::factory(|| Arc::new(ConsoleLogger)),
///         Lifetime::Singleton,
///         Binding::Bound,
///     )
///     .unwrap();
///
/// let provider = registry.build_provider();
/// let logger = provider.resolve::<dyn Logger>().unwrap();
/// assert_eq!(logger.log("hi"), "LOG: hi");
/// assert!(provider.try_resolve::<String>().unwrap().is_none());
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves contract `T`.
    ///
    /// Fails with [`DiError::DependencyNotFound`] when `T` is not registered.
    fn resolve<T>(&self) -> DiResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let any = self.resolve_any(&key_of::<T>())?;
        downcast::<T>(&any)
    }

    /// Resolves contract `T`, reporting absence as `None` instead of an error.
    ///
    /// Only the not-found case is converted; every other failure still
    /// propagates. Nothing is built or cached when `T` is absent.
    fn try_resolve<T>(&self) -> DiResult<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if !self.has_dependency::<T>() {
            return Ok(None);
        }
        self.resolve::<T>().map(Some)
    }

    /// Resolves every registered contract that satisfies capability `C`.
    fn resolve_all<C>(&self) -> DiResult<Vec<Arc<C>>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.resolve_all_any(&key_of::<C>())?
            .iter()
            .map(downcast::<C>)
            .collect()
    }

    /// Whether contract `T` is registered.
    fn has_dependency<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.has_key(&key_of::<T>())
    }
}

impl<R> Resolver for R where R: ResolverCore + ?Sized {}

pub(crate) fn downcast<T>(any: &AnyArc) -> DiResult<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    any.downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or(DiError::TypeMismatch(std::any::type_name::<T>()))
}
