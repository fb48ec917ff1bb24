use ferrous_deps::{Binding, DiError, Dependency, Lifetime, Registry, Resolver};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct RequestId(usize);

fn counting_registry(lifetime: Lifetime, builds: Arc<AtomicUsize>) -> Registry {
    let mut registry = Registry::new();
    registry
        .add_dependency(
            Dependency::factory(move || Arc::new(RequestId(builds.fetch_add(1, Ordering::SeqCst)))),
            lifetime,
            Binding::Bound,
        )
        .unwrap();
    registry
}

#[test]
fn scoped_is_cached_per_provider() {
    let builds = Arc::new(AtomicUsize::new(0));
    let registry = counting_registry(Lifetime::Scoped, builds.clone());

    let scope1 = registry.build_provider();
    let scope2 = registry.build_provider();

    let a = scope1.resolve::<RequestId>().unwrap();
    let b = scope1.resolve::<RequestId>().unwrap();
    let c = scope2.resolve::<RequestId>().unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
    assert_ne!(a.0, c.0);
    assert_eq!(builds.load(Ordering::SeqCst), 2);
    assert_eq!(scope1.scoped_count(), 1);
    assert_eq!(scope2.scoped_count(), 1);
}

#[test]
fn transient_is_never_cached() {
    let builds = Arc::new(AtomicUsize::new(0));
    let registry = counting_registry(Lifetime::Transient, builds.clone());

    let provider = registry.build_provider();
    let a = provider.resolve::<RequestId>().unwrap();
    let b = provider.resolve::<RequestId>().unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(builds.load(Ordering::SeqCst), 2);
    assert_eq!(provider.scoped_count(), 0);
}

#[test]
fn singleton_survives_provider_disposal() {
    let builds = Arc::new(AtomicUsize::new(0));
    let registry = counting_registry(Lifetime::Singleton, builds.clone());

    let first = registry.with_provider(|p| p.resolve::<RequestId>().unwrap());
    let second = registry.with_provider(|p| p.resolve::<RequestId>().unwrap());

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[test]
fn scoped_dependency_of_scoped_shares_instance() {
    struct Session {
        request: Arc<RequestId>,
    }

    let builds = Arc::new(AtomicUsize::new(0));
    let mut registry = counting_registry(Lifetime::Scoped, builds.clone());
    registry
        .add_scoped(Dependency::provider_factory(|provider| {
            Ok(Arc::new(Session { request: provider.resolve::<RequestId>()? }))
        }))
        .unwrap();

    let provider = registry.build_provider();
    let session = provider.resolve::<Session>().unwrap();
    let request = provider.resolve::<RequestId>().unwrap();

    assert!(Arc::ptr_eq(&session.request, &request));
    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert_eq!(provider.scoped_count(), 2);
}

#[test]
fn failed_scoped_build_is_not_cached() {
    struct Flaky;

    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    let mut registry = Registry::new();
    registry
        .add_scoped(Dependency::provider_factory(move |provider| {
            counter.fetch_add(1, Ordering::SeqCst);
            provider.resolve::<RequestId>()?;
            Ok(Arc::new(Flaky))
        }))
        .unwrap();

    let provider = registry.build_provider();
    assert!(provider.resolve::<Flaky>().is_err());
    assert!(provider.resolve::<Flaky>().is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(provider.scoped_count(), 0);
}

#[test]
fn disposed_provider_clears_scope() {
    let builds = Arc::new(AtomicUsize::new(0));
    let registry = counting_registry(Lifetime::Scoped, builds);

    let provider = registry.build_provider();
    provider.resolve::<RequestId>().unwrap();
    assert_eq!(provider.scoped_count(), 1);

    provider.dispose();
    assert_eq!(provider.scoped_count(), 0);
    assert_eq!(
        provider.resolve::<RequestId>().err().unwrap(),
        DiError::Disposed("provider")
    );
}

#[test]
fn disposed_registry_rejects_singleton_resolution() {
    let builds = Arc::new(AtomicUsize::new(0));
    let registry = counting_registry(Lifetime::Singleton, builds);

    registry.dispose();
    let provider = registry.build_provider();
    assert_eq!(
        provider.resolve::<RequestId>().err().unwrap(),
        DiError::Disposed("registry")
    );
}
