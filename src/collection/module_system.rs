//! Service module system for modular registration.

use crate::{DiResult, ServiceCollection};

/// A bundle of registrations that can be applied to a [`ServiceCollection`].
///
/// # Example
///
/// ```rust
/// use service_lifetimes::{ServiceCollection, ServiceModule, ServiceCollectionExt, DiResult, Resolver};
///
/// struct Greeting(&'static str);
///
/// struct GreetingModule;
///
/// impl ServiceModule for GreetingModule {
///     fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
///         services.add_scoped_factory::<Greeting, _>(|_| Greeting("hello"));
///         Ok(())
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let provider = ServiceCollection::new().add_module(GreetingModule)?.build();
/// let scope = provider.create_scope();
/// assert_eq!(scope.get_required::<Greeting>().0, "hello");
/// # Ok(())
/// # }
/// ```
pub trait ServiceModule {
    /// Register this module's services with the ServiceCollection.
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()>;
}

/// Builder-style module registration that consumes and returns the collection.
pub trait ServiceCollectionExt {
    fn add_module<M: ServiceModule>(self, module: M) -> DiResult<Self>
    where
        Self: Sized;
}

impl ServiceCollectionExt for ServiceCollection {
    fn add_module<M: ServiceModule>(mut self, module: M) -> DiResult<Self> {
        module.register_services(&mut self)?;
        Ok(self)
    }
}

/// In-place module registration matching the `&mut Self` registration methods.
pub trait ServiceCollectionModuleExt {
    fn add_module_mut<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self>;
}

impl ServiceCollectionModuleExt for ServiceCollection {
    fn add_module_mut<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self> {
        module.register_services(self)?;
        Ok(self)
    }
}
