//! Internal implementation details.

pub(crate) mod cache;
pub(crate) mod dispose_bag;

pub(crate) use cache::InstanceCache;
pub(crate) use dispose_bag::{dispose_in_order, DisposalList, PanicPayload, Teardown};

#[cfg(feature = "ahash")]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;
