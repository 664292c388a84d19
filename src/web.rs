//! Axum host: one DI scope per inbound request.
//!
//! [`create_app_with_di`] attaches the root provider to a router. Handlers take
//! a [`DiScope`] to resolve services; the scope ends, and its scoped services
//! are disposed, when the handler returns.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::traits::Resolver;
use crate::work::WorkService;
use crate::{DiError, DiResult, Scope, ServiceProvider};

/// Extractor for the request-scoped container.
pub struct DiScope {
    scope: Scope,
}

impl DiScope {
    pub fn get_required<T: Send + Sync + 'static>(&self) -> Arc<T> {
        self.scope.get_required()
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.scope.get()
    }

    /// The underlying scope, for trait resolution.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for DiScope
where
    S: Send + Sync,
{
    type Rejection = DiRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let provider = parts
            .extensions
            .get::<Arc<ServiceProvider>>()
            .ok_or_else(|| {
                DiRejection::Configuration(
                    "ServiceProvider not found in extensions. Make sure to use create_app_with_di()"
                        .to_string(),
                )
            })?;

        Ok(DiScope {
            scope: provider.create_scope(),
        })
    }
}

/// Rejection type for DI extraction and resolution failures
#[derive(Debug)]
pub enum DiRejection {
    Configuration(String),
    Resolution(DiError),
}

impl From<DiError> for DiRejection {
    fn from(error: DiError) -> Self {
        DiRejection::Resolution(error)
    }
}

impl IntoResponse for DiRejection {
    fn into_response(self) -> Response {
        let message = match self {
            DiRejection::Configuration(msg) => msg,
            DiRejection::Resolution(error) => error.to_string(),
        };
        tracing::error!(%message, "request rejected");
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}

/// Builds a router with `configure` and attaches `provider` as an extension.
///
/// ```rust
/// use std::sync::Arc;
/// use axum::routing::get;
/// use service_lifetimes::{web::{create_app_with_di, DiScope}, ServiceCollection};
///
/// async fn handler(scope: DiScope) -> String {
///     scope.get_required::<String>().to_string()
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_scoped_factory::<String, _>(|_| "hello".to_string());
/// let provider = Arc::new(services.build());
/// let app = create_app_with_di(provider, |router| router.route("/", get(handler)));
/// # let _ = app;
/// ```
pub fn create_app_with_di<F>(provider: Arc<ServiceProvider>, configure: F) -> Router
where
    F: FnOnce(Router) -> Router,
{
    configure(Router::new()).layer(axum::Extension(provider))
}

/// One work service invoked by a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkEntry {
    pub lifetime: String,
    /// Address of the instance, for spotting shared ones across requests
    pub instance: String,
}

/// Body of `GET /work`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkReport {
    pub services: Vec<WorkEntry>,
}

async fn do_work(scope: DiScope) -> Result<Json<WorkReport>, DiRejection> {
    let services = scope.scope().get_all_trait::<dyn WorkService>()?;
    let entries = services
        .iter()
        .map(|service| {
            service.do_work();
            WorkEntry {
                lifetime: service.lifetime().to_string(),
                instance: format!("{:#x}", Arc::as_ptr(service) as *const () as usize),
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(services = entries.len(), "handled work request");
    Ok(Json(WorkReport { services: entries }))
}

/// Router serving `GET /work`.
pub fn work_router(provider: Arc<ServiceProvider>) -> Router {
    create_app_with_di(provider, |router| router.route("/work", get(do_work)))
}

/// Serves [`work_router`] on `bind` until Ctrl-C.
pub async fn serve(provider: Arc<ServiceProvider>, bind: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, work_router(provider))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
