//! # ferrous-deps
//!
//! A small, explicit dependency container: a [`Registry`] of descriptors,
//! [`Provider`] resolution scopes borrowed from it, and deterministic disposal
//! of the instances each of them owns.
//!
//! ## Features
//!
//! - **Three lifetimes**: Singleton (one per registry), Scoped (one per provider), Transient
//! - **Bound and Unbound instances**: the container disposes what it owns, nothing else
//! - **Trait contracts**: register and resolve `dyn Trait` directly
//! - **Capabilities**: resolve every contract that can act as a given trait
//! - **Auto-wiring without reflection**: [`Injectable`] types list their constructors
//! - **Thread-safe**: singletons and scoped instances are built exactly once under contention
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_deps::{Binding, Dependency, Lifetime, Registry, Resolver};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut registry = Registry::new();
//! registry
//!     .add_dependency(
//!         Dependency::factory(|| {
//!             Arc::new(Database { connection_string: "postgres://localhost".to_string() })
//!         }),
//!         Lifetime::Singleton,
//!         Binding::Bound,
//!     )
//!     .unwrap()
//!     .add_dependency(
//!         Dependency::provider_factory(|provider| {
//!             Ok(Arc::new(UserService { db: provider.resolve::<Database>()? }))
//!         }),
//!         Lifetime::Transient,
//!         Binding::Bound,
//!     )
//!     .unwrap();
//!
//! let provider = registry.build_provider();
//! let user_service = provider.resolve::<UserService>().unwrap();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Lifetimes
//!
//! - **Singleton**: created once per registry and shared by every provider
//! - **Scoped**: created once per provider
//! - **Transient**: created fresh on every resolution
//!
//! ## Trait Resolution
//!
//! ```rust
//! use ferrous_deps::{Dependency, Registry, Resolver};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String {
//!         format!("[LOG] {}", message)
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry
//!     .add_singleton(Dependency::<dyn Logger>::factory(|| Arc::new(ConsoleLogger)))
//!     .unwrap();
//!
//! let provider = registry.build_provider();
//! let logger = provider.resolve::<dyn Logger>().unwrap();
//! assert_eq!(logger.log("Hello, World!"), "[LOG] Hello, World!");
//! ```
//!
//! ## Capabilities
//!
//! ```rust
//! use ferrous_deps::{Dependency, Registry, Resolver};
//! use std::sync::Arc;
//!
//! trait Plugin: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//!
//! struct Auth;
//! impl Plugin for Auth {
//!     fn name(&self) -> &'static str { "auth" }
//! }
//!
//! struct Audit;
//! impl Plugin for Audit {
//!     fn name(&self) -> &'static str { "audit" }
//! }
//!
//! let mut registry = Registry::new();
//! registry
//!     .add_singleton(Dependency::factory(|| Arc::new(Auth)).satisfies::<dyn Plugin, _>(|a| a))
//!     .unwrap()
//!     .add_singleton(Dependency::factory(|| Arc::new(Audit)).satisfies::<dyn Plugin, _>(|a| a))
//!     .unwrap();
//!
//! let provider = registry.build_provider();
//! let names: Vec<_> = provider
//!     .resolve_all::<dyn Plugin>()
//!     .unwrap()
//!     .iter()
//!     .map(|p| p.name())
//!     .collect();
//! assert_eq!(names, vec!["auth", "audit"]);
//! ```

// Module declarations
pub mod collection;
pub mod descriptors;
pub mod error;
pub mod instance;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod provider;
pub mod traits;

// Internal modules
mod internal;
mod registration;

pub use collection::Registry;
pub use descriptors::{Descriptor, DescriptorInfo, StrategyKind};
pub use error::{DiError, DiResult};
pub use instance::InstanceRecord;
pub use key::{key_of, Key};
pub use lifetime::{Binding, Lifetime};
pub use observer::{DiObserver, LoggingObserver};
pub use provider::Provider;
pub use registration::{AnyArc, Arguments, Constructor, Dependency, Injectable};
pub use traits::{disposer_of, Dispose, Resolver, ResolverCore};
