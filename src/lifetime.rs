//! Lifetime and binding definitions.

/// Lifetimes controlling which cache, if any, holds a produced instance.
///
/// The lifetime is fixed at registration and never transitions.
///
/// # Examples
///
/// ```rust
/// use ferrous_deps::{Binding, Dependency, Lifetime, Registry, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct RequestModel { id: u32 }
///
/// let mut registry = Registry::new();
/// registry
///     .add_dependency(
///         Dependency::factory(|| Arc::new(Database { url: "postgres://localhost".into() })),
///         Lifetime::Singleton,
///         Binding::Bound,
///     )
///     .unwrap()
///     .add_dependency(
///         Dependency::factory(|| Arc::new(RequestModel { id: 7 })),
///         Lifetime::Transient,
///         Binding::Bound,
///     )
///     .unwrap();
///
/// let first = registry.build_provider();
/// let second = registry.build_provider();
///
/// // Singleton: the same instance across providers
/// let db1 = first.resolve::<Database>().unwrap();
/// let db2 = second.resolve::<Database>().unwrap();
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// // Transient: always a fresh instance
/// let m1 = first.resolve::<RequestModel>().unwrap();
/// let m2 = first.resolve::<RequestModel>().unwrap();
/// assert!(!Arc::ptr_eq(&m1, &m2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Lifetime {
    /// One instance per registry, shared by every provider built from it.
    ///
    /// The registry owns the instance and disposes it on registry teardown.
    Singleton,
    /// One instance per provider, reused for the rest of that provider's scope.
    Scoped,
    /// A new instance on every resolution, never cached.
    Transient,
}

/// Whether the resolver owns disposal of the instances it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Binding {
    /// The owning container disposes the instance at teardown.
    #[default]
    Bound,
    /// The caller owns disposal; the container never disposes it.
    Unbound,
}
