//! Registration of the work services.

use std::sync::Arc;

use crate::collection::{ServiceCollection, ServiceModule};
use crate::provider::{ResolverContext, ServiceProvider};
use crate::traits::Resolver;
use crate::work::{
    ConsoleOutput, MemoryOutput, ScopedService, SingletonService, TransientService, WorkOutput,
    WorkService,
};
use crate::{DiResult, Lifetime};

/// Registers `dyn WorkService` three times, once per lifetime.
///
/// The registrations coexist: `get_all_trait::<dyn WorkService>()` yields the
/// transient, scoped and singleton services in that order, while
/// `get_trait::<dyn WorkService>()` yields the singleton, registered last.
///
/// # Examples
///
/// ```
/// use service_lifetimes::{configure_services, Lifetime, Resolver, ServiceCollection, WorkService};
///
/// let mut services = ServiceCollection::new();
/// configure_services(&mut services);
///
/// let provider = services.build();
/// let scope = provider.create_scope();
/// let lifetimes: Vec<_> = scope
///     .get_all_trait::<dyn WorkService>()
///     .unwrap()
///     .iter()
///     .map(|s| s.lifetime())
///     .collect();
/// assert_eq!(lifetimes, Lifetime::ALL);
/// ```
pub fn configure_services(services: &mut ServiceCollection) {
    services.add_trait_factory_as::<dyn WorkService, _>(
        Lifetime::Transient,
        Some(std::any::type_name::<TransientService>()),
        |r| Arc::new(TransientService::new(work_output(r))) as Arc<dyn WorkService>,
    );
    services.add_trait_factory_as::<dyn WorkService, _>(
        Lifetime::Scoped,
        Some(std::any::type_name::<ScopedService>()),
        |r| {
            let service = Arc::new(ScopedService::new(work_output(r)));
            r.register_disposer(service.clone());
            service as Arc<dyn WorkService>
        },
    );
    services.add_trait_factory_as::<dyn WorkService, _>(
        Lifetime::Singleton,
        Some(std::any::type_name::<SingletonService>()),
        |r| {
            let service = Arc::new(SingletonService::new(work_output(r)));
            r.register_disposer(service.clone());
            service as Arc<dyn WorkService>
        },
    );
}

/// Registers a [`MemoryOutput`] as the `dyn WorkOutput` sink and returns it.
pub fn add_memory_output(services: &mut ServiceCollection) -> Arc<MemoryOutput> {
    let output = Arc::new(MemoryOutput::new());
    services.add_singleton_trait(output.clone() as Arc<dyn WorkOutput>);
    output
}

// Registered sink, or stdout
fn work_output(r: &ResolverContext) -> Arc<dyn WorkOutput> {
    r.get_trait::<dyn WorkOutput>()
        .unwrap_or_else(|_| Arc::new(ConsoleOutput))
}

/// Module form of [`configure_services`].
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkServicesModule;

impl ServiceModule for WorkServicesModule {
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        configure_services(services);
        Ok(())
    }
}

/// What one simulated request saw of one work service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub request: usize,
    pub lifetime: Lifetime,
    /// Both resolutions within the request returned the same instance
    pub same_in_scope: bool,
    /// The instance is the one the previous request got
    pub same_as_previous_scope: bool,
}

/// Opens `requests` scopes in sequence, resolves every work service twice in
/// each, runs the first copy and records which instances were shared.
pub fn simulate(provider: &ServiceProvider, requests: usize) -> DiResult<Vec<Observation>> {
    let mut observations = Vec::new();
    let mut previous: Vec<Arc<dyn WorkService>> = Vec::new();

    for request in 1..=requests {
        let _span = tracing::info_span!("request", request).entered();
        let scope = provider.create_scope();

        let first = scope.get_all_trait::<dyn WorkService>()?;
        let second = scope.get_all_trait::<dyn WorkService>()?;

        for (index, (a, b)) in first.iter().zip(&second).enumerate() {
            a.do_work();
            let observation = Observation {
                request,
                lifetime: a.lifetime(),
                same_in_scope: Arc::ptr_eq(a, b),
                same_as_previous_scope: previous.get(index).is_some_and(|p| Arc::ptr_eq(a, p)),
            };
            tracing::info!(
                lifetime = %observation.lifetime,
                same_in_scope = observation.same_in_scope,
                same_as_previous_scope = observation.same_as_previous_scope,
                "resolved twice"
            );
            observations.push(observation);
        }

        previous = first;
    }

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_of_trait;

    #[test]
    fn registers_one_binding_per_lifetime() {
        let mut services = ServiceCollection::new();
        configure_services(&mut services);

        let work_key = key_of_trait::<dyn WorkService>();
        let lifetimes: Vec<_> = services
            .get_service_descriptors()
            .into_iter()
            .filter(|d| d.type_name() == work_key.display_name())
            .map(|d| d.lifetime)
            .collect();

        assert_eq!(lifetimes, Lifetime::ALL);
    }

    #[test]
    fn simulate_reports_sharing_per_lifetime() {
        let mut services = ServiceCollection::new();
        let output = add_memory_output(&mut services);
        configure_services(&mut services);
        let provider = services.build();

        let observations = simulate(&provider, 2).unwrap();
        let second_request: Vec<_> = observations
            .iter()
            .filter(|o| o.request == 2)
            .map(|o| (o.lifetime, o.same_in_scope, o.same_as_previous_scope))
            .collect();

        assert_eq!(observations.len(), 6);
        assert_eq!(
            second_request,
            [
                (Lifetime::Transient, false, false),
                (Lifetime::Scoped, true, false),
                (Lifetime::Singleton, true, true),
            ]
        );
        assert_eq!(output.lines().len(), 6);
    }

    #[test]
    fn memory_output_receives_the_lines() {
        let mut services = ServiceCollection::new();
        let output = add_memory_output(&mut services);
        configure_services(&mut services);

        let provider = services.build();
        let scope = provider.create_scope();
        for service in scope.get_all_trait::<dyn WorkService>().unwrap() {
            service.do_work();
        }

        assert_eq!(
            output.lines(),
            [TransientService::MESSAGE, ScopedService::MESSAGE, SingletonService::MESSAGE]
        );
    }
}
