//! Contract identity keys for the dependency registry.

use std::any::TypeId;
use std::fmt;

/// Key identifying a registered contract.
///
/// A contract is any `'static` type a consumer asks the provider for: a
/// concrete struct, a primitive, or a trait object such as `dyn Logger`.
/// Keys carry the `TypeId` for lookup and the type name for diagnostics.
///
/// # Examples
///
/// ```rust
/// use ferrous_deps::{key_of, Key};
///
/// trait Logger: Send + Sync {}
///
/// let concrete = key_of::<String>();
/// let contract = key_of::<dyn Logger>();
///
/// assert_ne!(concrete, contract);
/// assert_eq!(concrete, key_of::<String>());
/// assert!(contract.display_name().contains("Logger"));
/// ```
#[derive(Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Get the type or trait name for display.
    ///
    /// This is the `std::any::type_name` result captured at registration.
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    /// The underlying `TypeId`.
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

// Identity is the TypeId alone; the name only feeds diagnostics.
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Creates the key for contract `T`, sized or not.
#[inline(always)]
pub fn key_of<T: ?Sized + 'static>() -> Key {
    Key {
        id: TypeId::of::<T>(),
        name: std::any::type_name::<T>(),
    }
}
