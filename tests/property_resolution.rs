/// Property-based tests for registration and resolution
///
/// These tests verify that lifetime, binding, and registration-order rules
/// hold regardless of the concrete values and sequences involved.
use ferrous_deps::{Binding, Dependency, Dispose, Lifetime, Registry, Resolver};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Payload {
    value: String,
}

#[derive(Default)]
struct Resource {
    disposals: AtomicUsize,
}

impl Dispose for Resource {
    fn dispose(&self) {
        self.disposals.fetch_add(1, Ordering::SeqCst);
    }
}

fn lifetime_strategy() -> impl Strategy<Value = Lifetime> {
    prop_oneof![
        Just(Lifetime::Singleton),
        Just(Lifetime::Scoped),
        Just(Lifetime::Transient),
    ]
}

fn binding_strategy() -> impl Strategy<Value = Binding> {
    prop_oneof![Just(Binding::Bound), Just(Binding::Unbound)]
}

proptest! {
    #[test]
    fn singleton_resolution_consistency(value in "\\PC{0,50}", providers in 1usize..5) {
        let mut registry = Registry::new();
        let captured = value.clone();
        registry
            .add_singleton(Dependency::factory(move || Arc::new(Payload { value: captured.clone() })))
            .unwrap();

        let first = registry.with_provider(|p| p.resolve::<Payload>().unwrap());
        for _ in 0..providers {
            let next = registry.with_provider(|p| p.resolve::<Payload>().unwrap());
            prop_assert!(Arc::ptr_eq(&first, &next));
        }
        prop_assert_eq!(&first.value, &value);
    }
}

proptest! {
    #[test]
    fn optional_resolution_behavior(register in any::<bool>()) {
        let mut registry = Registry::new();
        if register {
            registry
                .add_transient(Dependency::factory(|| Arc::new(Payload { value: "x".into() })))
                .unwrap();
        }

        let provider = registry.build_provider();
        let resolved = provider.try_resolve::<Payload>().unwrap();
        prop_assert_eq!(resolved.is_some(), register);
        prop_assert_eq!(provider.resolve::<Payload>().is_ok(), register);
    }
}

proptest! {
    #[test]
    fn last_registration_wins(values in prop::collection::vec(any::<u32>(), 1..10)) {
        let mut registry = Registry::new();
        for &value in &values {
            registry.add_transient(Dependency::factory(move || Arc::new(value))).unwrap();
        }

        let provider = registry.build_provider();
        prop_assert_eq!(registry.len(), 1);
        prop_assert_eq!(*provider.resolve::<u32>().unwrap(), *values.last().unwrap());
    }
}

proptest! {
    #[test]
    fn try_add_keeps_first_registration(values in prop::collection::vec(any::<u32>(), 1..10)) {
        let mut registry = Registry::new();
        let inserted: Vec<bool> = values
            .iter()
            .map(|&value| registry.try_add_transient(Dependency::factory(move || Arc::new(value))).unwrap())
            .collect();

        prop_assert!(inserted[0]);
        prop_assert!(inserted[1..].iter().all(|&added| !added));

        let provider = registry.build_provider();
        prop_assert_eq!(*provider.resolve::<u32>().unwrap(), values[0]);
    }
}

proptest! {
    #[test]
    fn owned_instances_disposed_exactly_once(
        lifetime in lifetime_strategy(),
        binding in binding_strategy(),
        resolutions in 1usize..6,
    ) {
        let mut registry = Registry::new();
        registry
            .add_dependency(
                Dependency::factory(|| Arc::new(Resource::default())).disposable(),
                lifetime,
                binding,
            )
            .unwrap();

        let resources: Vec<Arc<Resource>> = registry.with_provider(|provider| {
            (0..resolutions).map(|_| provider.resolve::<Resource>().unwrap()).collect()
        });
        registry.dispose();

        let expected = usize::from(binding == Binding::Bound);
        for resource in &resources {
            prop_assert_eq!(resource.disposals.load(Ordering::SeqCst), expected);
        }
    }
}

proptest! {
    #[test]
    fn capability_order_matches_registration(order in Just(vec![0usize, 1, 2]).prop_shuffle()) {
        trait Tagged: Send + Sync {
            fn tag(&self) -> usize;
        }
        struct A;
        struct B;
        struct C;
        impl Tagged for A { fn tag(&self) -> usize { 0 } }
        impl Tagged for B { fn tag(&self) -> usize { 1 } }
        impl Tagged for C { fn tag(&self) -> usize { 2 } }

        let mut registry = Registry::new();
        for &which in &order {
            let added = match which {
                0 => registry.add_singleton(Dependency::factory(|| Arc::new(A)).satisfies::<dyn Tagged, _>(|a| a as Arc<dyn Tagged>)),
                1 => registry.add_scoped(Dependency::factory(|| Arc::new(B)).satisfies::<dyn Tagged, _>(|b| b as Arc<dyn Tagged>)),
                _ => registry.add_transient(Dependency::factory(|| Arc::new(C)).satisfies::<dyn Tagged, _>(|c| c as Arc<dyn Tagged>)),
            };
            prop_assert!(added.is_ok());
        }

        let provider = registry.build_provider();
        let tags: Vec<usize> = provider.resolve_all::<dyn Tagged>().unwrap().iter().map(|t| t.tag()).collect();
        prop_assert_eq!(tags, order);
    }
}
