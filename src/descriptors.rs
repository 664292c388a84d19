//! Service descriptors for introspection and diagnostics.

use crate::key::Key;
use crate::lifetime::Lifetime;

/// Read-only description of one registration
///
/// # Examples
///
/// ```rust
/// use service_lifetimes::{ServiceCollection, Lifetime};
///
/// struct Database { url: String }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Database { url: "postgres://localhost".to_string() });
/// services.add_scoped_factory::<String, _>(|_| "request".to_string());
///
/// let descriptors = services.get_service_descriptors();
/// assert_eq!(descriptors.len(), 2);
///
/// let db = descriptors.iter()
///     .find(|d| d.type_name().contains("Database"))
///     .unwrap();
/// assert_eq!(db.lifetime, Lifetime::Singleton);
/// assert!(!db.is_multi_binding());
/// ```
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// The service key
    pub key: Key,
    /// Service lifetime
    pub lifetime: Lifetime,
    /// Implementation type name (if known at registration)
    pub impl_type_name: Option<&'static str>,
}

impl ServiceDescriptor {
    /// Get the type/trait name the service is resolved by
    pub fn type_name(&self) -> &'static str {
        self.key.display_name()
    }

    /// True for entries of a trait's multi-binding list
    pub fn is_multi_binding(&self) -> bool {
        matches!(self.key, Key::MultiTrait(_, _))
    }
}
