#![no_main]

use ferrous_deps::{Binding, Dependency, Dispose, Lifetime, Registry, Resolver};
use libfuzzer_sys::fuzz_target;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Tracked {
    value: u8,
    disposals: AtomicUsize,
}

impl Dispose for Tracked {
    fn dispose(&self) {
        self.disposals.fetch_add(1, Ordering::SeqCst);
    }
}

fn lifetime(byte: u8) -> Lifetime {
    match byte % 3 {
        0 => Lifetime::Singleton,
        1 => Lifetime::Scoped,
        _ => Lifetime::Transient,
    }
}

fn binding(byte: u8) -> Binding {
    if byte & 0x80 == 0 {
        Binding::Bound
    } else {
        Binding::Unbound
    }
}

// Each pair of bytes is one registration: (lifetime + binding, value).
// Whatever was registered last must resolve, and no instance may be
// disposed more than once.
fuzz_target!(|data: &[u8]| {
    let mut registry = Registry::new();
    let mut last = None;

    for pair in data.chunks_exact(2).take(32) {
        let (mode, value) = (pair[0], pair[1]);
        let dependency = Dependency::factory(move || {
            Arc::new(Tracked { value, disposals: AtomicUsize::new(0) })
        })
        .disposable();
        let result = if mode & 0x40 == 0 {
            registry.add_dependency(dependency, lifetime(mode), binding(mode)).map(|_| true)
        } else {
            registry.try_add_dependency(dependency, lifetime(mode), binding(mode))
        };
        if let Ok(true) = result {
            last = Some((value, lifetime(mode), binding(mode)));
        }
    }

    let mut resolved = Vec::new();
    {
        let provider = registry.build_provider();
        for _ in 0..3 {
            if let Ok(tracked) = provider.resolve::<Tracked>() {
                resolved.push(tracked);
            }
        }
    }
    registry.dispose();

    match last {
        Some((value, _, binding)) => {
            assert_eq!(resolved.len(), 3);
            for tracked in &resolved {
                assert_eq!(tracked.value, value);
                let expected = usize::from(binding == Binding::Bound);
                assert_eq!(tracked.disposals.load(Ordering::SeqCst), expected);
            }
        }
        None => assert!(resolved.is_empty()),
    }
});
