//! Service key types for the dependency injection container.

use std::any::TypeId;
use std::hash::{Hash, Hasher};

/// Key for service storage and lookup.
///
/// - **Type**: concrete types, looked up by `TypeId`
/// - **Trait**: a single trait binding, looked up by the trait's type name
/// - **MultiTrait**: one entry of a trait's multi-binding list
///
/// # Examples
///
/// ```rust
/// use service_lifetimes::{Key, key_of_type};
///
/// let key = key_of_type::<String>();
/// assert_eq!(key.display_name(), "alloc::string::String");
///
/// let entry = Key::MultiTrait("dyn demo::Worker", 2);
/// assert_eq!(entry.display_name(), "dyn demo::Worker");
/// assert_eq!(entry.index(), Some(2));
/// ```
#[derive(Debug, Clone)]
pub enum Key {
    /// Concrete type key with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// Single trait binding key
    Trait(&'static str),
    /// Multi-trait binding with registration index
    MultiTrait(&'static str, usize),
}

impl Key {
    /// Get the type or trait name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::Trait(name) => name,
            Key::MultiTrait(name, _) => name,
        }
    }

    /// Position within the multi-binding list, if this key names one
    pub fn index(&self) -> Option<usize> {
        match self {
            Key::MultiTrait(_, idx) => Some(*idx),
            _ => None,
        }
    }
}

// TypeId-only comparison for concrete types; the name is diagnostic
impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Trait(a), Key::Trait(b)) => a == b,
            (Key::MultiTrait(a, idx_a), Key::MultiTrait(b, idx_b)) => a == b && idx_a == idx_b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::Trait(name) => {
                1u8.hash(state);
                name.hash(state);
            }
            Key::MultiTrait(name, idx) => {
                2u8.hash(state);
                name.hash(state);
                idx.hash(state);
            }
        }
    }
}

/// Key for a concrete type.
#[inline]
pub fn key_of_type<T: 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

/// Key for a single trait binding.
#[inline]
pub fn key_of_trait<T: ?Sized + 'static>() -> Key {
    Key::Trait(std::any::type_name::<T>())
}
