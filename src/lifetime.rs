//! Service lifetime definitions.

use std::fmt;

/// Service lifetimes controlling instance caching behavior
///
/// The lifetime is metadata attached to a registration. The provider and its
/// scopes interpret it when a service is resolved.
///
/// # Examples
///
/// ```rust
/// use service_lifetimes::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Settings { name: &'static str }
/// struct RequestState { id: u32 }
/// struct Message { text: &'static str }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Settings { name: "demo" });
/// services.add_scoped_factory::<RequestState, _>(|_| RequestState { id: 7 });
/// services.add_transient_factory::<Message, _>(|_| Message { text: "hi" });
///
/// let provider = services.build();
///
/// // Singleton: same instance across scopes
/// let s1 = provider.get_required::<Settings>();
/// let scope1 = provider.create_scope();
/// let s2 = scope1.get_required::<Settings>();
/// assert!(Arc::ptr_eq(&s1, &s2));
/// assert_eq!(s1.name, "demo");
///
/// // Scoped: same within a scope, different across scopes
/// let r1a = scope1.get_required::<RequestState>();
/// let r1b = scope1.get_required::<RequestState>();
/// assert!(Arc::ptr_eq(&r1a, &r1b));
/// let scope2 = provider.create_scope();
/// let r2 = scope2.get_required::<RequestState>();
/// assert!(!Arc::ptr_eq(&r1a, &r2));
/// assert_eq!(r2.id, 7);
///
/// // Transient: always a new instance
/// let m1 = scope1.get_required::<Message>();
/// let m2 = scope1.get_required::<Message>();
/// assert!(!Arc::ptr_eq(&m1, &m2));
/// assert_eq!(m1.text, "hi");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// New instance per resolution, never cached
    Transient,
    /// Single instance per scope, cached for the scope's lifetime
    ///
    /// Scoped services cannot be resolved from the root provider.
    Scoped,
    /// Single instance per root provider, created on first request and
    /// shared by every scope until the provider is torn down
    Singleton,
}

impl Lifetime {
    /// Every lifetime, in the order the work services are registered.
    pub const ALL: [Lifetime; 3] = [Lifetime::Transient, Lifetime::Scoped, Lifetime::Singleton];

    /// Lowercase name used in logs and HTTP reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifetime::Transient => "transient",
            Lifetime::Scoped => "scoped",
            Lifetime::Singleton => "singleton",
        }
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
