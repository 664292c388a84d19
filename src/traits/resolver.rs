//! Resolver traits for service resolution.

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::internal::BoxFutureUnit;
use crate::key::{key_of_trait, key_of_type, Key};
use crate::traits::{AsyncDispose, Dispose};

/// Core resolver trait for object-safe service resolution.
///
/// Most callers use [`Resolver`], which layers typed helpers on top of this.
pub trait ResolverCore: Send + Sync {
    /// Resolves a single service by key, honouring its lifetime.
    ///
    /// For a [`Key::Trait`] with no single binding, the last entry of the
    /// trait's multi-binding list is resolved instead.
    fn resolve_any(&self, key: &Key) -> DiResult<Arc<dyn Any + Send + Sync>>;

    /// Resolves every multi-binding entry for a trait key, in registration order.
    ///
    /// Returns an empty vector for keys with no multi-bindings.
    fn resolve_many(&self, key: &Key) -> DiResult<Vec<Arc<dyn Any + Send + Sync>>>;

    /// Registers a synchronous disposal hook with the owning scope or provider.
    fn push_sync_disposer(&self, f: Box<dyn FnOnce() + Send>);

    /// Registers an asynchronous disposal hook with the owning scope or provider.
    fn push_async_disposer(&self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>);
}

/// High-level resolver interface with generic methods for type-safe service resolution.
///
/// `ServiceProvider`, `Scope` and the `ResolverContext` handed to factories
/// all implement this trait.
///
/// # Examples
///
/// ```
/// use service_lifetimes::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> &'static str;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> &'static str { "hello" }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(42usize);
/// services.add_singleton_trait(Arc::new(English) as Arc<dyn Greeter>);
///
/// let provider = services.build();
/// assert_eq!(*provider.get_required::<usize>(), 42);
/// assert_eq!(provider.get_required_trait::<dyn Greeter>().greet(), "hello");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a concrete service type.
    fn get<T: 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&key_of_type::<T>())?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a single trait implementation.
    ///
    /// If the trait only has multi-bindings, the most recently registered one
    /// wins.
    fn get_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&key_of_trait::<T>())?;
        // Trait objects are stored as Arc<Arc<dyn Trait>> inside the Any
        any.downcast::<Arc<T>>()
            .map(|boxed| (*boxed).clone())
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves all registered implementations of a trait, in registration order.
    fn get_all_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Vec<Arc<T>>> {
        let anys = self.resolve_many(&key_of_trait::<T>())?;
        anys.into_iter()
            .map(|any| {
                any.downcast::<Arc<T>>()
                    .map(|boxed| (*boxed).clone())
                    .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
            })
            .collect()
    }

    /// Resolves a concrete service type, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if the service cannot be resolved.
    fn get_required<T: 'static + Send + Sync>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }

    /// Resolves a trait implementation, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if the trait cannot be resolved.
    fn get_required_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Arc<T> {
        self.get_trait::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve trait {}: {}", std::any::type_name::<T>(), e))
    }

    /// Registers a service for synchronous disposal.
    fn register_disposer<T: Dispose>(&self, service: Arc<T>) {
        self.push_sync_disposer(Box::new(move || service.dispose()));
    }

    /// Registers a service for asynchronous disposal.
    fn register_async_disposer<T: AsyncDispose>(&self, service: Arc<T>) {
        self.push_async_disposer(Box::new(move || -> BoxFutureUnit {
            Box::pin(async move {
                service.dispose().await;
            })
        }));
    }
}
