//! # service-lifetimes
//!
//! Transient, scoped and singleton services side by side, on a small
//! dependency injection container in the style of
//! Microsoft.Extensions.DependencyInjection.
//!
//! One capability, [`WorkService`], is registered three times by
//! [`configure_services`], once per [`Lifetime`]:
//!
//! - **Transient**: a new instance on every resolution
//! - **Scoped**: one instance per [`Scope`], disposed when the scope ends
//! - **Singleton**: one instance for the whole provider
//!
//! ## Quick Start
//!
//! ```rust
//! use service_lifetimes::{
//!     add_memory_output, configure_services, Resolver, ServiceCollection, WorkService,
//! };
//! use std::sync::Arc;
//!
//! let mut services = ServiceCollection::new();
//! let output = add_memory_output(&mut services);
//! configure_services(&mut services);
//!
//! let provider = services.build();
//! let scope = provider.create_scope();
//!
//! let first = scope.get_all_trait::<dyn WorkService>().unwrap();
//! let second = scope.get_all_trait::<dyn WorkService>().unwrap();
//! assert!(!Arc::ptr_eq(&first[0], &second[0])); // transient
//! assert!(Arc::ptr_eq(&first[1], &second[1])); // scoped
//! assert!(Arc::ptr_eq(&first[2], &second[2])); // singleton
//!
//! for service in &first {
//!     service.do_work();
//! }
//! assert_eq!(output.lines(), [
//!     "Transient service is doing work.",
//!     "Scoped service is doing work.",
//!     "Singleton service is doing work.",
//! ]);
//! ```
//!
//! ## The container
//!
//! ```rust
//! use service_lifetimes::{ServiceCollection, Resolver};
//! use std::sync::Arc;
//!
//! struct Database { url: String }
//! struct UserService { db: Arc<Database> }
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton(Database { url: "postgres://localhost".to_string() });
//! services.add_transient_factory::<UserService, _>(|resolver| UserService {
//!     db: resolver.get_required::<Database>(),
//! });
//!
//! let provider = services.build();
//! assert_eq!(provider.get_required::<UserService>().db.url, "postgres://localhost");
//! ```

pub mod collection;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod provider;
pub mod startup;
pub mod traits;
pub mod work;

#[cfg(feature = "web")]
pub mod web;

mod internal;
mod registration;

pub use collection::{ServiceCollection, ServiceCollectionExt, ServiceCollectionModuleExt, ServiceModule};
pub use config::{ConfigProvider, ConfigSource, ConfigValue, EnvironmentConfigSource, HostConfig, JsonConfigSource};
pub use descriptors::ServiceDescriptor;
pub use error::{DiError, DiResult};
pub use key::{key_of_trait, key_of_type, Key};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, TracingObserver};
pub use provider::{ResolverContext, Scope, ServiceProvider};
pub use startup::{add_memory_output, configure_services, simulate, Observation, WorkServicesModule};
pub use traits::{AsyncDispose, Dispose, Resolver, ResolverCore};
pub use work::{
    ConsoleOutput, MemoryOutput, ScopedService, SingletonService, TransientService, WorkOutput,
    WorkService,
};
