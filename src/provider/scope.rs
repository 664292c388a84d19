//! Scoped service resolution and lifecycle management.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::{ResolverContext, ServiceProvider};
use crate::internal::{run_async, run_sync, BoxFutureUnit, DisposeBag};
use crate::registration::{AnyArc, Registration};
use crate::traits::{Resolver, ResolverCore};
use crate::{DiError, DiResult, Key, Lifetime};

/// Scoped service container for request-scoped dependency resolution.
///
/// - **Singleton**: resolved and cached in the root provider
/// - **Scoped**: resolved and cached within this scope
/// - **Transient**: created fresh on every resolution
///
/// Dropping a scope ends it: its pending sync disposal hooks run in LIFO
/// order and its cached scoped instances are released.
///
/// # Examples
///
/// ```
/// use service_lifetimes::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Connection(&'static str);
/// struct Handler { conn: Arc<Connection> }
///
/// let mut collection = ServiceCollection::new();
/// collection.add_scoped_factory::<Connection, _>(|_| Connection("conn-1"));
/// collection.add_transient_factory::<Handler, _>(|r| Handler {
///     conn: r.get_required::<Connection>(),
/// });
///
/// let provider = collection.build();
/// let scope = provider.create_scope();
///
/// let h1 = scope.get_required::<Handler>();
/// let h2 = scope.get_required::<Handler>();
/// assert!(!Arc::ptr_eq(&h1, &h2));
/// assert!(Arc::ptr_eq(&h1.conn, &h2.conn));
/// ```
pub struct Scope {
    root: ServiceProvider,
    scoped: Mutex<HashMap<Key, AnyArc>>,
    disposers: Mutex<DisposeBag>,
}

impl Scope {
    pub(crate) fn new(root: ServiceProvider) -> Self {
        Self {
            root,
            scoped: Mutex::new(HashMap::new()),
            disposers: Mutex::new(DisposeBag::default()),
        }
    }

    /// The root provider this scope was created from.
    pub fn root(&self) -> &ServiceProvider {
        &self.root
    }

    /// Number of scoped instances cached in this scope.
    pub fn cached_count(&self) -> usize {
        self.scoped.lock().len()
    }

    /// Runs every disposal hook owned by this scope: async hooks first, then
    /// sync hooks, each in LIFO order.
    ///
    /// # Examples
    ///
    /// ```
    /// use service_lifetimes::{Dispose, ServiceCollection, Resolver};
    /// use std::sync::atomic::{AtomicBool, Ordering};
    /// use std::sync::Arc;
    ///
    /// struct Cache(Arc<AtomicBool>);
    /// impl Dispose for Cache {
    ///     fn dispose(&self) {
    ///         self.0.store(true, Ordering::SeqCst);
    ///     }
    /// }
    ///
    /// # async fn example() {
    /// let flushed = Arc::new(AtomicBool::new(false));
    /// let flag = flushed.clone();
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_scoped_trait_factory::<Cache, _>(move |r| {
    ///     let cache = Arc::new(Cache(flag.clone()));
    ///     r.register_disposer(cache.clone());
    ///     cache
    /// });
    ///
    /// let provider = services.build();
    /// let scope = provider.create_scope();
    /// scope.get_required_trait::<Cache>();
    /// scope.dispose_all().await;
    /// assert!(flushed.load(Ordering::SeqCst));
    /// # }
    /// ```
    pub async fn dispose_all(&self) {
        let asyncs = self.disposers.lock().take_async_reverse();
        run_async(asyncs).await;
        let syncs = self.disposers.lock().take_sync_reverse();
        run_sync(syncs);
    }

    /// Resolves a scoped service; the constructor runs without the cache
    /// lock held and the first stored instance wins.
    fn resolve_scoped(&self, key: &Key, reg: &Registration) -> DiResult<AnyArc> {
        if let Some(cached) = self.scoped.lock().get(key) {
            return Ok(cached.clone());
        }

        let ctx = ResolverContext::new(self);
        let value = (reg.ctor)(&ctx)?;

        let mut cache = self.scoped.lock();
        Ok(cache.entry(key.clone()).or_insert(value).clone())
    }

    fn resolve_registration(&self, key: &Key, reg: &Registration) -> DiResult<AnyArc> {
        match reg.lifetime {
            Lifetime::Singleton => self.root.resolve_singleton(reg),
            Lifetime::Scoped => self.resolve_scoped(key, reg),
            Lifetime::Transient => {
                let ctx = ResolverContext::new(self);
                (reg.ctor)(&ctx)
            }
        }
    }
}

impl ResolverCore for Scope {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.root.observers().observe(key, || {
            let (resolved_key, reg) = self
                .root
                .registry()
                .get_single(key)
                .ok_or(DiError::NotFound(key.display_name()))?;
            self.resolve_registration(&resolved_key, reg)
        })
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        let Key::Trait(name) = key else {
            return Ok(Vec::new());
        };
        let Some(regs) = self.root.registry().many.get(name) else {
            return Ok(Vec::new());
        };
        self.root.observers().observe(key, || {
            regs.iter()
                .enumerate()
                .map(|(idx, reg)| self.resolve_registration(&Key::MultiTrait(*name, idx), reg))
                .collect()
        })
    }

    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.disposers.lock().push_sync(f);
    }

    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.disposers.lock().push_async(f);
    }
}

impl Resolver for Scope {}

impl Drop for Scope {
    fn drop(&mut self) {
        let bag = self.disposers.get_mut();
        if !bag.is_empty() {
            if bag.async_len() > 0 {
                tracing::warn!(
                    pending = bag.async_len(),
                    "scope dropped with undisposed async resources; call dispose_all().await before dropping"
                );
            }
            run_sync(bag.take_sync_reverse());
        }
        self.scoped.get_mut().clear();
    }
}
