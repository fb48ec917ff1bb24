//! Error types for the dependency registry and providers.

use thiserror::Error;

/// Dependency resolution errors
///
/// Every failure propagates unchanged to the immediate caller; nothing in the
/// registry or provider catches or masks these.
///
/// # Examples
///
/// ```rust
/// use ferrous_deps::{DiError, Registry, Resolver};
///
/// let registry = Registry::new();
/// let provider = registry.build_provider();
/// match provider.resolve::<String>() {
///     Err(DiError::DependencyNotFound(name)) => {
///         assert_eq!(name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiError {
    /// Contract not registered
    #[error("Dependency not found: {0}")]
    DependencyNotFound(&'static str),
    /// Implementation does not expose exactly one constructor
    #[error("Ambiguous constructor: {implementation} exposes {count} constructors, expected exactly one")]
    AmbiguousConstructor {
        implementation: &'static str,
        count: usize,
    },
    /// Registration rejected before any state was changed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Stored instance or constructor argument is not of the requested type
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Operation attempted on a container that has been torn down
    #[error("Object disposed: {0}")]
    Disposed(&'static str),
}

/// Result type for registry and provider operations
pub type DiResult<T> = Result<T, DiError>;
