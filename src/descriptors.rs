//! Dependency descriptors: immutable records of how to build one contract.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::instance::InstanceRecord;
use crate::key::Key;
use crate::lifetime::{Binding, Lifetime};
use crate::provider::Provider;
use crate::registration::{AnyArc, Arguments};
use crate::traits::{Dispose, ResolverCore};

/// A freshly produced object and its disposal capability.
pub(crate) struct Activation {
    pub(crate) instance: AnyArc,
    pub(crate) disposer: Option<Arc<dyn Dispose>>,
}

pub(crate) type ActivationFn = Arc<dyn Fn() -> Activation + Send + Sync>;
pub(crate) type ProviderActivationFn = Arc<dyn Fn(&Provider<'_>) -> DiResult<Activation> + Send + Sync>;
pub(crate) type ConstructorFn = Arc<dyn Fn(&mut Arguments) -> DiResult<Activation> + Send + Sync>;
pub(crate) type CastFn = Arc<dyn Fn(&AnyArc) -> Option<AnyArc> + Send + Sync>;

#[derive(Clone)]
pub(crate) struct ErasedConstructor {
    parameters: Vec<Key>,
    build: ConstructorFn,
}

impl ErasedConstructor {
    pub(crate) fn new(parameters: Vec<Key>, build: ConstructorFn) -> Self {
        Self { parameters, build }
    }
}

/// Type-erased construction strategy, set once when the descriptor is created.
#[derive(Clone)]
pub(crate) enum Strategy {
    Factory(ActivationFn),
    ProviderFactory(ProviderActivationFn),
    Implementation {
        type_name: &'static str,
        constructors: Vec<ErasedConstructor>,
    },
}

/// Converts a resolved contract instance into one of its declared capabilities.
#[derive(Clone)]
pub(crate) struct CapabilityCast {
    key: Key,
    cast: CastFn,
}

impl CapabilityCast {
    pub(crate) fn new(key: Key, cast: CastFn) -> Self {
        Self { key, cast }
    }

    pub(crate) fn key(&self) -> Key {
        self.key
    }

    pub(crate) fn apply(&self, instance: &AnyArc) -> DiResult<AnyArc> {
        (self.cast)(instance).ok_or(DiError::TypeMismatch(self.key.display_name()))
    }
}

/// Which construction strategy a descriptor holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StrategyKind {
    /// Zero-argument factory (including pre-built instances)
    Factory,
    /// Factory receiving the active provider
    ProviderFactory,
    /// Auto-wired implementation type, by name
    Implementation(&'static str),
}

/// Registration record for one contract.
///
/// Immutable once created: re-registering a contract replaces the whole
/// descriptor rather than mutating it.
#[derive(Clone)]
pub struct Descriptor {
    key: Key,
    lifetime: Lifetime,
    binding: Binding,
    strategy: Strategy,
    capabilities: Vec<CapabilityCast>,
}

impl Descriptor {
    pub(crate) fn new(
        key: Key,
        lifetime: Lifetime,
        binding: Binding,
        strategy: Strategy,
        capabilities: Vec<CapabilityCast>,
    ) -> Self {
        Self {
            key,
            lifetime,
            binding,
            strategy,
            capabilities,
        }
    }

    /// The registered contract.
    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    pub fn strategy_kind(&self) -> StrategyKind {
        match &self.strategy {
            Strategy::Factory(_) => StrategyKind::Factory,
            Strategy::ProviderFactory(_) => StrategyKind::ProviderFactory,
            Strategy::Implementation { type_name, .. } => StrategyKind::Implementation(*type_name),
        }
    }

    /// Capability identities this contract satisfies, in declaration order.
    pub fn capabilities(&self) -> impl Iterator<Item = &Key> + '_ {
        self.capabilities.iter().map(|c| &c.key)
    }

    pub fn satisfies(&self, capability: &Key) -> bool {
        self.capabilities.iter().any(|c| &c.key == capability)
    }

    pub(crate) fn capability(&self, capability: &Key) -> Option<&CapabilityCast> {
        self.capabilities.iter().find(|c| &c.key == capability)
    }

    /// Builds a fresh instance record.
    ///
    /// Implementations are auto-wired here: exactly one constructor must
    /// exist, and each of its parameters is resolved through `provider`.
    /// Construction failures propagate unchanged.
    pub fn get_instance(&self, provider: &Provider<'_>) -> DiResult<InstanceRecord> {
        let activation = match &self.strategy {
            Strategy::Factory(factory) => factory(),
            Strategy::ProviderFactory(factory) => factory(provider)?,
            Strategy::Implementation { type_name, constructors } => {
                let constructor = match constructors.as_slice() {
                    [only] => only,
                    other => {
                        return Err(DiError::AmbiguousConstructor {
                            implementation: *type_name,
                            count: other.len(),
                        })
                    }
                };
                let mut values = Vec::with_capacity(constructor.parameters.len());
                for parameter in &constructor.parameters {
                    values.push((*parameter, provider.resolve_any(parameter)?));
                }
                (constructor.build)(&mut Arguments::new(*type_name, values))?
            }
        };
        Ok(InstanceRecord::new(self.key, self.lifetime, self.binding, activation))
    }

    /// Snapshot for introspection and diagnostics.
    pub fn info(&self) -> DescriptorInfo {
        DescriptorInfo {
            contract: self.key.display_name(),
            lifetime: self.lifetime,
            binding: self.binding,
            strategy: self.strategy_kind(),
            capabilities: self.capabilities().map(|k| k.display_name()).collect(),
        }
    }
}

impl std::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("binding", &self.binding)
            .field("strategy", &self.strategy_kind())
            .finish()
    }
}

/// Descriptor snapshot for introspection and diagnostics
///
/// # Examples
///
/// ```rust
/// use ferrous_deps::{Binding, Dependency, Lifetime, Registry, StrategyKind};
/// use std::sync::Arc;
///
/// let mut registry = Registry::new();
/// registry
///     .add_dependency(Dependency::factory(|| Arc::new(42u32)), Lifetime::Singleton, Binding::Unbound)
///     .unwrap();
///
/// let infos = registry.descriptors();
/// assert_eq!(infos.len(), 1);
/// assert_eq!(infos[0].contract, "u32");
/// assert_eq!(infos[0].lifetime, Lifetime::Singleton);
/// assert_eq!(infos[0].binding, Binding::Unbound);
/// assert_eq!(infos[0].strategy, StrategyKind::Factory);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DescriptorInfo {
    pub contract: &'static str,
    pub lifetime: Lifetime,
    pub binding: Binding,
    pub strategy: StrategyKind,
    pub capabilities: Vec<&'static str>,
}
