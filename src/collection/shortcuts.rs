//! Lifetime-specific registration shortcuts.

use std::sync::Arc;

use super::Registry;
use crate::error::DiResult;
use crate::lifetime::{Binding, Lifetime};
use crate::registration::Dependency;

impl Registry {
    /// Registers a bound singleton.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_deps::{Dependency, Registry, Resolver};
    /// use std::sync::Arc;
    ///
    /// struct Config { port: u16 }
    ///
    /// let mut registry = Registry::new();
    /// registry
    ///     .add_singleton(Dependency::factory(|| Arc::new(Config { port: 8080 })))
    ///     .unwrap();
    ///
    /// let provider = registry.build_provider();
    /// assert_eq!(provider.resolve::<Config>().unwrap().port, 8080);
    /// ```
    pub fn add_singleton<T>(&mut self, dependency: Dependency<T>) -> DiResult<&mut Self>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.add_dependency(dependency, Lifetime::Singleton, Binding::Bound)
    }

    /// Registers a bound scoped contract.
    pub fn add_scoped<T>(&mut self, dependency: Dependency<T>) -> DiResult<&mut Self>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.add_dependency(dependency, Lifetime::Scoped, Binding::Bound)
    }

    /// Registers a bound transient contract.
    pub fn add_transient<T>(&mut self, dependency: Dependency<T>) -> DiResult<&mut Self>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.add_dependency(dependency, Lifetime::Transient, Binding::Bound)
    }

    /// Registers a pre-built singleton whose disposal stays with the caller.
    pub fn add_instance<T>(&mut self, value: Arc<T>) -> DiResult<&mut Self>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.add_dependency(Dependency::instance(value), Lifetime::Singleton, Binding::Unbound)
    }

    pub fn try_add_singleton<T>(&mut self, dependency: Dependency<T>) -> DiResult<bool>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.try_add_dependency(dependency, Lifetime::Singleton, Binding::Bound)
    }

    pub fn try_add_scoped<T>(&mut self, dependency: Dependency<T>) -> DiResult<bool>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.try_add_dependency(dependency, Lifetime::Scoped, Binding::Bound)
    }

    pub fn try_add_transient<T>(&mut self, dependency: Dependency<T>) -> DiResult<bool>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.try_add_dependency(dependency, Lifetime::Transient, Binding::Bound)
    }
}
