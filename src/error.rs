//! Error types for the dependency injection container.

use thiserror::Error;

/// Dependency injection errors
///
/// # Examples
///
/// ```rust
/// use service_lifetimes::{DiError, ServiceCollection, Resolver};
///
/// let provider = ServiceCollection::new().build();
/// match provider.get::<String>() {
///     Err(DiError::NotFound(type_name)) => {
///         assert_eq!(type_name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
///
/// let err = DiError::WrongLifetime("Cannot resolve scoped service from root provider");
/// assert_eq!(err.to_string(), "Lifetime error: Cannot resolve scoped service from root provider");
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// Service not registered
    #[error("Service not found: {0}")]
    NotFound(&'static str),
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Invalid lifetime resolution (scoped from root)
    #[error("Lifetime error: {0}")]
    WrongLifetime(&'static str),
    /// Configuration source could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for DI operations
pub type DiResult<T> = Result<T, DiError>;
