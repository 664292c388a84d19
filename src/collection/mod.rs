//! Service collection module for dependency injection.
//!
//! [`ServiceCollection`] is the registration half of the container: it records
//! `(service, implementation, lifetime)` bindings and turns them into a
//! [`ServiceProvider`] with [`build`](ServiceCollection::build).

use std::any::TypeId;
use std::sync::Arc;

use crate::descriptors::ServiceDescriptor;
use crate::observer::{DiObserver, Observers};
use crate::provider::{ResolverContext, ServiceProvider};
use crate::registration::{AnyArc, Registration, Registry};
use crate::{DiResult, Key, Lifetime};

pub mod module_system;
pub use module_system::*;

/// Registration table for services and their lifetimes.
#[derive(Default)]
pub struct ServiceCollection {
    registry: Registry,
    observers: Observers,
}

impl ServiceCollection {
    /// Creates a new empty service collection.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            observers: Observers::new(),
        }
    }

    // ----- Concrete Type Registrations -----

    /// Registers a singleton instance shared across the entire application.
    ///
    /// Registering the same type again replaces the earlier binding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use service_lifetimes::{ServiceCollection, Resolver};
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(1usize);
    /// services.add_singleton(2usize);
    ///
    /// let provider = services.build();
    /// assert_eq!(*provider.get_required::<usize>(), 2);
    /// ```
    pub fn add_singleton<T: 'static + Send + Sync>(&mut self, value: T) -> &mut Self {
        let arc: AnyArc = Arc::new(value);
        let ctor = move |_: &ResolverContext| -> DiResult<AnyArc> { Ok(arc.clone()) };
        self.registry.insert(
            Key::Type(TypeId::of::<T>(), std::any::type_name::<T>()),
            Registration::new(Lifetime::Singleton, Arc::new(ctor), Some(std::any::type_name::<T>())),
        );
        self
    }

    /// Registers a singleton factory, run once on first request.
    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Singleton, factory)
    }

    /// Registers a scoped factory, run once per scope.
    pub fn add_scoped_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Scoped, factory)
    }

    /// Registers a transient factory, run on every resolution.
    pub fn add_transient_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Transient, factory)
    }

    fn add_factory<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        let ctor = move |r: &ResolverContext| -> DiResult<AnyArc> { Ok(Arc::new(factory(r))) };
        self.registry.insert(
            Key::Type(TypeId::of::<T>(), std::any::type_name::<T>()),
            Registration::new(lifetime, Arc::new(ctor), Some(std::any::type_name::<T>())),
        );
        self
    }

    // ----- Trait Single-Binding Registrations -----

    /// Registers an existing trait implementation as a singleton.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use service_lifetimes::{ServiceCollection, Resolver};
    /// # use std::sync::Arc;
    /// trait Clock: Send + Sync {
    ///     fn now(&self) -> u64;
    /// }
    ///
    /// struct FixedClock;
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> u64 { 1_700_000_000 }
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton_trait(Arc::new(FixedClock) as Arc<dyn Clock>);
    ///
    /// let provider = services.build();
    /// assert_eq!(provider.get_required_trait::<dyn Clock>().now(), 1_700_000_000);
    /// ```
    pub fn add_singleton_trait<T>(&mut self, value: Arc<T>) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
    {
        // Stored as Arc<Arc<dyn Trait>> inside the Any
        let any_arc: AnyArc = Arc::new(value);
        let ctor = move |_: &ResolverContext| -> DiResult<AnyArc> { Ok(any_arc.clone()) };
        self.registry.insert(
            Key::Trait(std::any::type_name::<T>()),
            Registration::new(Lifetime::Singleton, Arc::new(ctor), None),
        );
        self
    }

    /// Registers a singleton trait factory.
    pub fn add_singleton_trait_factory<Trait, F>(&mut self, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.add_trait_factory_impl(Lifetime::Singleton, factory)
    }

    /// Registers a scoped trait factory.
    pub fn add_scoped_trait_factory<Trait, F>(&mut self, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.add_trait_factory_impl(Lifetime::Scoped, factory)
    }

    /// Registers a transient trait factory.
    pub fn add_transient_trait_factory<Trait, F>(&mut self, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.add_trait_factory_impl(Lifetime::Transient, factory)
    }

    fn add_trait_factory_impl<Trait, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        let ctor = move |r: &ResolverContext| -> DiResult<AnyArc> { Ok(Arc::new(factory(r))) };
        self.registry.insert(
            Key::Trait(std::any::type_name::<Trait>()),
            Registration::new(lifetime, Arc::new(ctor), None),
        );
        self
    }

    // ----- Trait Multi-Binding Registrations -----

    /// Appends an existing trait implementation to the trait's multi-binding list.
    pub fn add_trait_implementation<T>(&mut self, value: Arc<T>, lifetime: Lifetime) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
    {
        let any_arc: AnyArc = Arc::new(value);
        let ctor = move |_: &ResolverContext| -> DiResult<AnyArc> { Ok(any_arc.clone()) };
        self.registry.push_many(
            std::any::type_name::<T>(),
            Registration::new(lifetime, Arc::new(ctor), None),
        );
        self
    }

    /// Appends a trait factory to the trait's multi-binding list.
    ///
    /// Every entry keeps its own lifetime. `get_all_trait` resolves them all in
    /// registration order; `get_trait` resolves the last one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use service_lifetimes::{ServiceCollection, Resolver, Lifetime};
    /// # use std::sync::Arc;
    /// trait Step: Send + Sync {
    ///     fn name(&self) -> &'static str;
    /// }
    ///
    /// struct Parse;
    /// impl Step for Parse {
    ///     fn name(&self) -> &'static str { "parse" }
    /// }
    ///
    /// struct Render;
    /// impl Step for Render {
    ///     fn name(&self) -> &'static str { "render" }
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_trait_factory::<dyn Step, _>(Lifetime::Transient, |_| Arc::new(Parse) as Arc<dyn Step>);
    /// services.add_trait_factory::<dyn Step, _>(Lifetime::Singleton, |_| Arc::new(Render) as Arc<dyn Step>);
    ///
    /// let provider = services.build();
    /// let names: Vec<_> = provider.get_all_trait::<dyn Step>().unwrap()
    ///     .iter()
    ///     .map(|s| s.name())
    ///     .collect();
    /// assert_eq!(names, ["parse", "render"]);
    /// assert_eq!(provider.get_required_trait::<dyn Step>().name(), "render");
    /// ```
    pub fn add_trait_factory<Trait, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.add_trait_factory_as::<Trait, F>(lifetime, None, factory)
    }

    /// Like [`add_trait_factory`](Self::add_trait_factory), recording the
    /// implementation type name for descriptors.
    pub fn add_trait_factory_as<Trait, F>(
        &mut self,
        lifetime: Lifetime,
        impl_name: Option<&'static str>,
        factory: F,
    ) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        let ctor = move |r: &ResolverContext| -> DiResult<AnyArc> { Ok(Arc::new(factory(r))) };
        let index = self.registry.push_many(
            std::any::type_name::<Trait>(),
            Registration::new(lifetime, Arc::new(ctor), impl_name),
        );
        tracing::debug!(
            service = std::any::type_name::<Trait>(),
            implementation = impl_name.unwrap_or("<factory>"),
            %lifetime,
            index,
            "registered"
        );
        self
    }

    // ----- Introspection -----

    /// Get all service descriptors for introspection and diagnostics.
    ///
    /// Single bindings come first (in no particular order), followed by every
    /// multi-binding entry in registration order per trait.
    pub fn get_service_descriptors(&self) -> Vec<ServiceDescriptor> {
        self.registry
            .iter()
            .map(|(key, reg)| ServiceDescriptor {
                key,
                lifetime: reg.lifetime,
                impl_type_name: reg.impl_name,
            })
            .collect()
    }

    /// Number of registrations, counting each multi-binding entry.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attaches an observer notified around every resolution.
    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    /// Freezes the registrations into a provider.
    pub fn build(self) -> ServiceProvider {
        tracing::debug!(registrations = self.registry.len(), "building service provider");
        ServiceProvider::new(self.registry, self.observers)
    }
}
