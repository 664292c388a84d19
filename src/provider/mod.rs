//! Service provider module for dependency injection.
//!
//! The root [`ServiceProvider`] owns singletons and the registration table;
//! each [`Scope`] owns the scoped instances created inside it.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::internal::{run_async, run_sync, BoxFutureUnit, DisposeBag};
use crate::observer::Observers;
use crate::registration::{AnyArc, Registration, Registry};
use crate::traits::{Resolver, ResolverCore};
use crate::{DiError, DiResult, Key, Lifetime};

pub mod context;
pub mod scope;

pub use context::ResolverContext;
pub use scope::Scope;

/// Service provider for resolving dependencies from the DI container.
///
/// Cloning is cheap and every clone shares the same singletons. Singletons are
/// torn down by [`dispose_all`](Self::dispose_all), or when the last handle
/// (including those held by scopes) is dropped.
///
/// # Examples
///
/// ```
/// use service_lifetimes::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut collection = ServiceCollection::new();
/// collection.add_singleton(Database { url: "postgres://localhost".to_string() });
/// collection.add_transient_factory::<UserService, _>(|resolver| {
///     UserService { db: resolver.get_required::<Database>() }
/// });
///
/// let provider = collection.build();
/// let user_service = provider.get_required::<UserService>();
/// assert_eq!(user_service.db.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

pub(crate) struct ProviderInner {
    registry: Registry,
    root_disposers: Mutex<DisposeBag>,
    observers: Observers,
}

impl ServiceProvider {
    pub(crate) fn new(registry: Registry, observers: Observers) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                registry,
                root_disposers: Mutex::new(DisposeBag::default()),
                observers,
            }),
        }
    }

    #[inline]
    pub(crate) fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    #[inline]
    pub(crate) fn observers(&self) -> &Observers {
        &self.inner.observers
    }

    /// Creates a new scope for resolving scoped services.
    ///
    /// # Examples
    ///
    /// ```
    /// use service_lifetimes::{ServiceCollection, Resolver};
    /// use std::sync::atomic::{AtomicU32, Ordering};
    /// use std::sync::Arc;
    ///
    /// struct RequestId(u32);
    ///
    /// let next = Arc::new(AtomicU32::new(1));
    /// let mut collection = ServiceCollection::new();
    /// collection.add_scoped_factory::<RequestId, _>(move |_| {
    ///     RequestId(next.fetch_add(1, Ordering::SeqCst))
    /// });
    ///
    /// let provider = collection.build();
    /// let scope1 = provider.create_scope();
    /// let scope2 = provider.create_scope();
    ///
    /// let req1a = scope1.get_required::<RequestId>();
    /// let req1b = scope1.get_required::<RequestId>();
    /// let req2 = scope2.get_required::<RequestId>();
    ///
    /// assert!(Arc::ptr_eq(&req1a, &req1b));
    /// assert!(!Arc::ptr_eq(&req1a, &req2));
    /// assert_eq!((req1a.0, req2.0), (1, 2));
    /// ```
    pub fn create_scope(&self) -> Scope {
        Scope::new(self.clone())
    }

    /// Number of registrations, counting each multi-binding entry.
    pub fn registration_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Runs every root disposal hook: async hooks first, then sync hooks,
    /// each in LIFO order.
    ///
    /// Hooks registered while constructing singletons land here.
    pub async fn dispose_all(&self) {
        let asyncs = self.inner.root_disposers.lock().take_async_reverse();
        run_async(asyncs).await;
        let syncs = self.inner.root_disposers.lock().take_sync_reverse();
        run_sync(syncs);
    }

    /// Resolves a singleton, building it under the registration's own lock.
    pub(crate) fn resolve_singleton(&self, reg: &Registration) -> DiResult<AnyArc> {
        let Some(cell) = &reg.singleton else {
            return Err(DiError::WrongLifetime("Registration has no singleton cache"));
        };
        let mut slot = cell.lock();
        if let Some(value) = slot.as_ref() {
            return Ok(value.clone());
        }
        // Singletons always see the root, never the scope that asked first
        let ctx = ResolverContext::new(self);
        let value = (reg.ctor)(&ctx)?;
        *slot = Some(value.clone());
        Ok(value)
    }

    fn resolve_registration(&self, reg: &Registration) -> DiResult<AnyArc> {
        match reg.lifetime {
            Lifetime::Singleton => self.resolve_singleton(reg),
            Lifetime::Scoped => Err(DiError::WrongLifetime(
                "Cannot resolve scoped service from root provider",
            )),
            Lifetime::Transient => {
                let ctx = ResolverContext::new(self);
                (reg.ctor)(&ctx)
            }
        }
    }
}

impl ResolverCore for ServiceProvider {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.observers().observe(key, || {
            let (_, reg) = self
                .registry()
                .get_single(key)
                .ok_or(DiError::NotFound(key.display_name()))?;
            self.resolve_registration(reg)
        })
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        let Key::Trait(name) = key else {
            return Ok(Vec::new());
        };
        let Some(regs) = self.registry().many.get(name) else {
            return Ok(Vec::new());
        };
        self.observers().observe(key, || {
            regs.iter().map(|reg| self.resolve_registration(reg)).collect()
        })
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.inner.root_disposers.lock().push_sync(f);
    }

    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.inner.root_disposers.lock().push_async(f);
    }
}

impl Resolver for ServiceProvider {}

impl Drop for ProviderInner {
    fn drop(&mut self) {
        let bag = self.root_disposers.get_mut();
        if bag.async_len() > 0 {
            tracing::warn!(
                pending = bag.async_len(),
                "service provider dropped with undisposed async resources; call dispose_all().await before dropping"
            );
        }
        run_sync(bag.take_sync_reverse());
    }
}
