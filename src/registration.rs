//! Registration types: how a contract's instances get built.

use std::any::Any;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::descriptors::{Activation, CapabilityCast, ErasedConstructor, Strategy};
use crate::error::{DiError, DiResult};
use crate::key::{key_of, Key};
use crate::provider::Provider;
use crate::traits::{disposer_of, Dispose};

// Type-erased Arc for storage; always wraps an `Arc<T>` for the contract `T`
pub type AnyArc = Arc<dyn Any + Send + Sync>;

type ProbeFn<T> = Arc<dyn Fn(&Arc<T>) -> Option<Arc<dyn Dispose>> + Send + Sync>;
type FactoryFn<T> = Arc<dyn Fn() -> Arc<T> + Send + Sync>;
type ProviderFactoryFn<T> = Arc<dyn Fn(&Provider<'_>) -> DiResult<Arc<T>> + Send + Sync>;
type BuildFn<T> = Arc<dyn Fn(&mut Arguments) -> DiResult<T> + Send + Sync>;
type ActivateFn<T> =
    Arc<dyn Fn(&mut Arguments) -> DiResult<(Arc<T>, Option<Arc<dyn Dispose>>)> + Send + Sync>;

/// Implementation types that can be auto-wired from their constructors.
///
/// This is the explicit stand-in for constructor reflection: the type lists
/// its public constructors, each declaring the contracts it needs. Resolution
/// requires exactly one constructor and resolves every parameter through the
/// active provider before calling it.
///
/// # Examples
///
/// ```
/// use ferrous_deps::{Arguments, Binding, Constructor, Dependency, Injectable, Lifetime, Registry, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
///
/// struct UserRepository { db: Arc<Database> }
///
/// impl Injectable for UserRepository {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|args: &mut Arguments| {
///             Ok(UserRepository { db: args.next::<Database>()? })
///         })
///         .param::<Database>()]
///     }
/// }
///
/// let mut registry = Registry::new();
/// registry
///     .add_dependency(
///         Dependency::factory(|| Arc::new(Database { url: "postgres://localhost".into() })),
///         Lifetime::Singleton,
///         Binding::Bound,
///     )
///     .unwrap()
///     .add_dependency(Dependency::<UserRepository>::injectable(), Lifetime::Scoped, Binding::Bound)
///     .unwrap();
///
/// let provider = registry.build_provider();
/// let repo = provider.resolve::<UserRepository>().unwrap();
/// assert_eq!(repo.db.url, "postgres://localhost");
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Every public constructor of the implementation.
    fn constructors() -> Vec<Constructor<Self>>;

    /// Disposal capability of a freshly built instance, if it has one.
    fn disposer(_instance: &Arc<Self>) -> Option<Arc<dyn Dispose>> {
        None
    }
}

/// One constructor of an [`Injectable`] implementation.
///
/// Parameters are declared in the order the builder consumes them from
/// [`Arguments`].
pub struct Constructor<I> {
    parameters: Vec<Key>,
    build: BuildFn<I>,
}

impl<I> Constructor<I>
where
    I: Send + Sync + 'static,
{
    /// Creates a constructor from the closure that assembles the implementation.
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&mut Arguments) -> DiResult<I> + Send + Sync + 'static,
    {
        Self {
            parameters: Vec::new(),
            build: Arc::new(build),
        }
    }

    /// Declares the next constructor parameter.
    pub fn param<D>(mut self) -> Self
    where
        D: ?Sized + 'static,
    {
        self.parameters.push(key_of::<D>());
        self
    }

    /// Declared parameter contracts, in order.
    pub fn parameters(&self) -> &[Key] {
        &self.parameters
    }
}

impl<I> Clone for Constructor<I> {
    fn clone(&self) -> Self {
        Self {
            parameters: self.parameters.clone(),
            build: self.build.clone(),
        }
    }
}

/// Resolved constructor arguments, consumed in declaration order.
pub struct Arguments {
    implementation: &'static str,
    values: std::vec::IntoIter<(Key, AnyArc)>,
}

impl Arguments {
    pub(crate) fn new(implementation: &'static str, values: Vec<(Key, AnyArc)>) -> Self {
        Self {
            implementation,
            values: values.into_iter(),
        }
    }

    /// Takes the next argument as contract `D`.
    ///
    /// Fails with [`DiError::TypeMismatch`] when the declared parameter at this
    /// position is not `D`, or when every declared argument was already taken.
    pub fn next<D>(&mut self) -> DiResult<Arc<D>>
    where
        D: ?Sized + Send + Sync + 'static,
    {
        let requested = key_of::<D>();
        match self.values.next() {
            Some((key, value)) if key == requested => crate::traits::downcast::<D>(&value),
            _ => Err(DiError::TypeMismatch(requested.display_name())),
        }
    }

    /// Arguments not yet taken.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// The implementation being constructed.
    pub fn implementation(&self) -> &'static str {
        self.implementation
    }
}

enum Source<T: ?Sized> {
    Instance(Arc<T>),
    Factory(FactoryFn<T>),
    ProviderFactory(ProviderFactoryFn<T>),
    Implementation {
        type_name: &'static str,
        constructors: Vec<(Vec<Key>, ActivateFn<T>)>,
    },
}

/// Registration builder describing how to construct contract `T`.
///
/// Holds exactly one construction strategy, fixed at creation, plus the
/// optional disposal probe and the capabilities the contract satisfies.
/// Pass it to [`Registry::add_dependency`](crate::Registry::add_dependency).
pub struct Dependency<T: ?Sized> {
    source: Source<T>,
    probe: Option<ProbeFn<T>>,
    capabilities: Vec<CapabilityCast>,
    _contract: PhantomData<fn() -> Arc<T>>,
}

impl<T> Dependency<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn from_source(source: Source<T>) -> Self {
        Self {
            source,
            probe: None,
            capabilities: Vec::new(),
            _contract: PhantomData,
        }
    }

    /// Zero-argument factory.
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        Self::from_source(Source::Factory(Arc::new(factory)))
    }

    /// Factory receiving the active provider, for resolving sub-dependencies.
    pub fn provider_factory<F>(factory: F) -> Self
    where
        F: Fn(&Provider<'_>) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        Self::from_source(Source::ProviderFactory(Arc::new(factory)))
    }

    /// Pre-built instance. Only valid with [`Lifetime::Singleton`](crate::Lifetime::Singleton).
    pub fn instance(value: Arc<T>) -> Self {
        Self::from_source(Source::Instance(value))
    }

    /// Auto-wired implementation `I`, viewed as `T` through `cast`.
    ///
    /// Constructors are read from `I` now; the single-constructor rule is
    /// checked when the contract is first resolved.
    pub fn implementation<I, C>(cast: C) -> Self
    where
        I: Injectable,
        C: Fn(Arc<I>) -> Arc<T> + Send + Sync + 'static,
    {
        let cast = Arc::new(cast);
        let constructors = I::constructors()
            .into_iter()
            .map(|ctor| {
                let cast = cast.clone();
                let build = ctor.build;
                let activate: ActivateFn<T> = Arc::new(move |args: &mut Arguments| {
                    let built = Arc::new(build(args)?);
                    let disposer = I::disposer(&built);
                    Ok((cast(built), disposer))
                });
                (ctor.parameters, activate)
            })
            .collect();
        Self::from_source(Source::Implementation {
            type_name: std::any::type_name::<I>(),
            constructors,
        })
    }

    /// Marks produced objects as disposable, using `probe` to inspect each one.
    pub fn dispose_with<P>(mut self, probe: P) -> Self
    where
        P: Fn(&Arc<T>) -> Option<Arc<dyn Dispose>> + Send + Sync + 'static,
    {
        self.probe = Some(Arc::new(probe));
        self
    }

    /// Declares that the contract can be viewed as capability `C`.
    ///
    /// [`Resolver::resolve_all`](crate::Resolver::resolve_all) for `C` returns
    /// this contract's instance, converted through `cast`.
    pub fn satisfies<C, F>(mut self, cast: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
    {
        let capability = key_of::<C>();
        self.capabilities.push(CapabilityCast::new(
            capability,
            Arc::new(move |any: &AnyArc| {
                let value = any.downcast_ref::<Arc<T>>()?.clone();
                Some(Arc::new(cast(value)) as AnyArc)
            }),
        ));
        self
    }

    pub(crate) fn is_instance(&self) -> bool {
        matches!(self.source, Source::Instance(_))
    }

    /// Checks the registration-time invariants for contract `key`.
    pub(crate) fn validate(&self, key: &Key) -> DiResult<()> {
        let mut seen = HashSet::new();
        for capability in &self.capabilities {
            if !seen.insert(capability.key()) {
                return Err(DiError::InvalidArgument(format!(
                    "{} declares capability {} more than once",
                    key,
                    capability.key()
                )));
            }
        }

        if let Source::Implementation { type_name, constructors } = &self.source {
            if constructors.iter().any(|(params, _)| params.contains(key)) {
                return Err(DiError::InvalidArgument(format!(
                    "constructor of {} takes its own contract {} as a parameter",
                    type_name, key
                )));
            }
        }
        Ok(())
    }

    /// Erases the contract type for storage in the registry.
    pub(crate) fn into_parts(self) -> (Strategy, Vec<CapabilityCast>) {
        let probe = self.probe;
        let strategy = match self.source {
            Source::Instance(value) => {
                Strategy::Factory(Arc::new(move || activation(value.clone(), None, probe.as_ref())))
            }
            Source::Factory(factory) => {
                Strategy::Factory(Arc::new(move || activation(factory(), None, probe.as_ref())))
            }
            Source::ProviderFactory(factory) => Strategy::ProviderFactory(Arc::new(
                move |provider: &Provider<'_>| Ok(activation(factory(provider)?, None, probe.as_ref())),
            )),
            Source::Implementation { type_name, constructors } => Strategy::Implementation {
                type_name,
                constructors: constructors
                    .into_iter()
                    .map(|(parameters, activate)| {
                        let probe = probe.clone();
                        ErasedConstructor::new(
                            parameters,
                            Arc::new(move |args: &mut Arguments| {
                                let (value, disposer) = activate(args)?;
                                Ok(activation(value, disposer, probe.as_ref()))
                            }),
                        )
                    })
                    .collect(),
            },
        };
        (strategy, self.capabilities)
    }
}

impl<T> Dependency<T>
where
    T: ?Sized + Dispose,
{
    /// Marks produced objects as disposable through the contract's own [`Dispose`].
    pub fn disposable(self) -> Self {
        self.dispose_with(|instance: &Arc<T>| Some(disposer_of(instance)))
    }
}

impl<I> Dependency<I>
where
    I: Injectable,
{
    /// Auto-wired implementation registered under its own type.
    pub fn injectable() -> Self {
        Self::implementation::<I, _>(|instance: Arc<I>| instance)
    }
}

fn activation<T>(
    value: Arc<T>,
    intrinsic: Option<Arc<dyn Dispose>>,
    probe: Option<&ProbeFn<T>>,
) -> Activation
where
    T: ?Sized + Send + Sync + 'static,
{
    let disposer = intrinsic.or_else(|| probe.and_then(|probe| probe(&value)));
    Activation {
        instance: Arc::new(value),
        disposer,
    }
}
