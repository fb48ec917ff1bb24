use ferrous_deps::{Binding, DiError, Dependency, Lifetime, Registry, Resolver, StrategyKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Config {
    name: String,
}

struct Greeter {
    tag: usize,
}

trait Logger: Send + Sync {
    fn log(&self, message: &str) -> String;
}

struct PrefixLogger {
    prefix: &'static str,
}

impl Logger for PrefixLogger {
    fn log(&self, message: &str) -> String {
        format!("{}{}", self.prefix, message)
    }
}

#[test]
fn singleton_is_shared_across_providers() {
    let mut registry = Registry::new();
    registry
        .add_dependency(
            Dependency::factory(|| Arc::new(Config { name: "app".into() })),
            Lifetime::Singleton,
            Binding::Bound,
        )
        .unwrap();

    let first = registry.build_provider();
    let second = registry.build_provider();
    let a = first.resolve::<Config>().unwrap();
    let b = second.resolve::<Config>().unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.name, "app");
    assert_eq!(registry.singleton_count(), 1);
}

#[test]
fn transient_resolutions_get_distinct_tags() {
    let counter = Arc::new(AtomicUsize::new(0));
    let tags = counter.clone();

    let mut registry = Registry::new();
    registry
        .add_dependency(
            Dependency::factory(move || Arc::new(Greeter { tag: tags.fetch_add(1, Ordering::SeqCst) })),
            Lifetime::Transient,
            Binding::Bound,
        )
        .unwrap();

    let provider = registry.build_provider();
    let resolved: Vec<usize> = (0..3)
        .map(|_| provider.resolve::<Greeter>().unwrap().tag)
        .collect();

    assert_eq!(resolved, vec![0, 1, 2]);
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[test]
fn trait_contract_resolves() {
    let mut registry = Registry::new();
    registry
        .add_singleton(Dependency::<dyn Logger>::factory(|| Arc::new(PrefixLogger { prefix: "> " })))
        .unwrap();

    let provider = registry.build_provider();
    let logger = provider.resolve::<dyn Logger>().unwrap();
    assert_eq!(logger.log("ready"), "> ready");
    assert!(!provider.has_dependency::<PrefixLogger>());
}

#[test]
fn provider_factory_resolves_sub_dependencies() {
    struct Banner {
        text: String,
    }

    let mut registry = Registry::new();
    registry
        .add_singleton(Dependency::factory(|| Arc::new(Config { name: "svc".into() })))
        .unwrap()
        .add_transient(Dependency::provider_factory(|provider| {
            let config = provider.resolve::<Config>()?;
            Ok(Arc::new(Banner { text: format!("welcome to {}", config.name) }))
        }))
        .unwrap();

    let provider = registry.build_provider();
    assert_eq!(provider.resolve::<Banner>().unwrap().text, "welcome to svc");
}

#[test]
fn provider_factory_propagates_missing_dependency() {
    struct NeedsConfig;

    let mut registry = Registry::new();
    registry
        .add_transient(Dependency::provider_factory(|provider| {
            provider.resolve::<Config>()?;
            Ok(Arc::new(NeedsConfig))
        }))
        .unwrap();

    let provider = registry.build_provider();
    let err = provider.resolve::<NeedsConfig>().err().unwrap();
    assert_eq!(err, DiError::DependencyNotFound(std::any::type_name::<Config>()));
}

#[test]
fn add_overwrites_and_try_add_keeps_existing() {
    let mut registry = Registry::new();
    registry.add_singleton(Dependency::factory(|| Arc::new(1u32))).unwrap();
    registry.add_singleton(Dependency::factory(|| Arc::new(2u32))).unwrap();

    assert!(!registry.try_add_singleton(Dependency::factory(|| Arc::new(3u32))).unwrap());
    assert!(registry.try_add_scoped(Dependency::factory(|| Arc::new(4u64))).unwrap());

    let provider = registry.build_provider();
    assert_eq!(*provider.resolve::<u32>().unwrap(), 2);
    assert_eq!(*provider.resolve::<u64>().unwrap(), 4);
    assert_eq!(registry.len(), 2);
}

#[test]
fn unregistered_contract_is_not_found() {
    let registry = Registry::new();
    let provider = registry.build_provider();

    assert_eq!(
        provider.resolve::<Config>().err().unwrap(),
        DiError::DependencyNotFound(std::any::type_name::<Config>())
    );
    assert!(provider.try_resolve::<Config>().unwrap().is_none());
    assert!(!registry.has_dependency::<Config>());
}

#[test]
fn try_resolve_still_propagates_other_failures() {
    struct Broken;

    let mut registry = Registry::new();
    registry
        .add_transient(Dependency::provider_factory(|provider| {
            provider.resolve::<Config>()?;
            Ok(Arc::new(Broken))
        }))
        .unwrap();

    let provider = registry.build_provider();
    assert!(provider.try_resolve::<Broken>().is_err());
}

#[test]
fn instance_requires_singleton_lifetime() {
    let mut registry = Registry::new();
    for lifetime in [Lifetime::Scoped, Lifetime::Transient] {
        let err = registry
            .add_dependency(Dependency::instance(Arc::new(Config { name: "x".into() })), lifetime, Binding::Bound)
            .err()
            .unwrap();
        assert!(matches!(err, DiError::InvalidArgument(_)));
    }
    assert!(registry.is_empty());

    let config = Arc::new(Config { name: "shared".into() });
    registry.add_instance(config.clone()).unwrap();
    let provider = registry.build_provider();
    assert!(Arc::ptr_eq(&provider.resolve::<Config>().unwrap(), &config));
}

#[test]
fn duplicate_capability_is_rejected() {
    let mut registry = Registry::new();
    let err = registry
        .add_singleton(
            Dependency::factory(|| Arc::new(PrefixLogger { prefix: "" }))
                .satisfies::<dyn Logger, _>(|l| l)
                .satisfies::<dyn Logger, _>(|l| l),
        )
        .err()
        .unwrap();

    assert!(matches!(err, DiError::InvalidArgument(_)));
    assert!(!registry.has_dependency::<PrefixLogger>());
}

#[test]
fn descriptor_introspection() {
    let mut registry = Registry::new();
    registry
        .add_dependency(
            Dependency::factory(|| Arc::new(PrefixLogger { prefix: "" })).satisfies::<dyn Logger, _>(|l| l),
            Lifetime::Scoped,
            Binding::Unbound,
        )
        .unwrap();

    let descriptor = registry.get_descriptor::<PrefixLogger>().unwrap();
    assert_eq!(descriptor.lifetime(), Lifetime::Scoped);
    assert_eq!(descriptor.binding(), Binding::Unbound);
    assert_eq!(descriptor.strategy_kind(), StrategyKind::Factory);

    let infos = registry.descriptors();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].capabilities.len(), 1);
    assert!(infos[0].capabilities[0].contains("Logger"));
}

#[test]
fn default_binding_is_bound() {
    assert_eq!(Binding::default(), Binding::Bound);
}
