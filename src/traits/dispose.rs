//! Disposal traits for resource cleanup.

/// Trait for synchronous resource disposal.
///
/// Register an instance with [`Resolver::register_disposer`](crate::Resolver::register_disposer)
/// from inside its factory. The hook runs when the owning scope ends (scoped
/// and transient services) or when the root provider is torn down
/// (singletons), in LIFO order.
///
/// # Examples
///
/// ```
/// use service_lifetimes::{Dispose, ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// trait Connection: Send + Sync {}
///
/// struct TcpConnection;
/// impl Connection for TcpConnection {}
///
/// impl Dispose for TcpConnection {
///     fn dispose(&self) {
///         println!("connection closed");
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_scoped_trait_factory::<dyn Connection, _>(|resolver| {
///     let conn = Arc::new(TcpConnection);
///     resolver.register_disposer(conn.clone());
///     conn
/// });
///
/// let provider = services.build();
/// let scope = provider.create_scope();
/// let _conn = scope.get_required_trait::<dyn Connection>();
/// drop(scope); // prints "connection closed"
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self);
}

/// Trait for asynchronous resource disposal.
///
/// Async hooks only run through `dispose_all().await`; they run before the
/// sync hooks of the same owner.
#[async_trait::async_trait]
pub trait AsyncDispose: Send + Sync + 'static {
    /// Perform asynchronous cleanup of resources.
    async fn dispose(&self);
}
