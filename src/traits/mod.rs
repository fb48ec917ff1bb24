//! Core traits for the dependency registry.

mod dispose;
mod resolver;

pub use dispose::{disposer_of, Dispose};
pub(crate) use resolver::downcast;
pub use resolver::{Resolver, ResolverCore};
