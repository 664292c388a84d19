//! Resolver context handed to factory functions.

use crate::internal::BoxFutureUnit;
use crate::registration::AnyArc;
use crate::traits::{Resolver, ResolverCore};
use crate::{DiResult, Key};

/// Context passed to factory functions for resolving dependencies.
///
/// It wraps whichever resolver is constructing the service: the root provider
/// for singletons, the requesting scope for scoped and transient services.
/// Disposers registered through it belong to that resolver.
///
/// # Examples
///
/// ```
/// use service_lifetimes::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Config { port: u16 }
/// struct Server { config: Arc<Config> }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Config { port: 8080 });
/// services.add_transient_factory::<Server, _>(|resolver| Server {
///     config: resolver.get_required::<Config>(),
/// });
///
/// let provider = services.build();
/// assert_eq!(provider.get_required::<Server>().config.port, 8080);
/// ```
pub struct ResolverContext<'a> {
    resolver: &'a dyn ResolverCore,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new<T: ResolverCore>(resolver: &'a T) -> Self {
        Self { resolver }
    }
}

impl ResolverCore for ResolverContext<'_> {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.resolver.resolve_any(key)
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        self.resolver.resolve_many(key)
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.resolver.push_sync_disposer(f);
    }

    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.resolver.push_async_disposer(f);
    }
}

impl Resolver for ResolverContext<'_> {}
