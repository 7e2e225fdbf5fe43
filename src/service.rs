//! SOAP web service: operation routes, WSDL route and the route boundary.

use crate::config::ServiceConfig;
use crate::error::SoapError;
use crate::extract::DepthLimit;
use crate::registry::{OperationRecord, OperationRegistry};
use crate::response::xml_response;
use crate::wsdl;
use axum::extract::{DefaultBodyLimit, State};
use axum::handler::Handler;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, MethodRouter};
use axum::{Extension, Router};
use indexmap::IndexMap;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use url::Url;

/// A SOAP web service mounted under one prefix.
///
/// ```ignore
/// let service = SoapService::new(ServiceConfig::new("Calculator", "/Calculator"))
///     .operation(
///         OperationRecord::new("SumOperation")
///             .request::<Operands>()
///             .response::<Total>(),
///         sum_operation,
///     );
/// let app = service.into_router();
/// ```
pub struct SoapService {
    config: ServiceConfig,
    registry: Arc<OperationRegistry>,
    routes: IndexMap<String, MethodRouter>,
}

#[derive(Clone)]
struct WsdlSource {
    config: ServiceConfig,
    registry: Arc<OperationRegistry>,
}

impl SoapService {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            registry: Arc::new(OperationRegistry::new()),
            routes: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> Arc<OperationRegistry> {
        Arc::clone(&self.registry)
    }

    /// Register an operation and its `POST {prefix}/{name}` handler.
    ///
    /// Registering a name twice replaces both the record and the handler.
    pub fn operation<H, T>(mut self, record: OperationRecord, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        let name = record.name.clone();
        if self.registry.register(record).is_some() {
            info!(operation = %name, "Replacing existing SOAP operation");
        }
        self.routes.insert(name, post(handler));
        self
    }

    /// Build the axum router for this service.
    pub fn into_router(self) -> Router {
        let prefix = self.config.normalized_prefix();
        let policy = self.config.validation_faults;
        let max_body_size = self.config.max_body_size;
        let max_depth = self.config.max_depth;

        info!(
            service = %self.config.name,
            prefix = %prefix,
            operations = self.registry.len(),
            validation_faults = ?policy,
            max_depth,
            "Building SOAP service router"
        );

        let wsdl_routes = if prefix.is_empty() {
            Router::new().route("/", get(wsdl_document))
        } else {
            Router::new()
                .route(&prefix, get(wsdl_document))
                .route(&format!("{}/", prefix), get(wsdl_document))
        };
        let wsdl_routes = wsdl_routes.with_state(WsdlSource {
            config: self.config.clone(),
            registry: Arc::clone(&self.registry),
        });

        let mut router = Router::new().merge(wsdl_routes);
        for (name, route) in self.routes {
            router = router.route(&format!("{}/{}", prefix, name), route);
        }

        router
            .layer(Extension(policy))
            .layer(Extension(DepthLimit(max_depth)))
            .layer(DefaultBodyLimit::max(max_body_size))
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(panic_response))
    }
}

async fn wsdl_document(State(source): State<WsdlSource>, headers: HeaderMap, uri: Uri) -> Response {
    let base_url = base_url(&headers, &uri);
    let descriptor = source.registry.describe(&source.config);
    match wsdl::to_xml_string(&descriptor, &base_url) {
        Ok(document) => xml_response(StatusCode::OK, document),
        Err(err) => SoapError::internal(err).into_response(),
    }
}

/// Address of the current request without query, fragment or trailing slash.
pub fn base_url(headers: &HeaderMap, uri: &Uri) -> String {
    let scheme = uri
        .scheme_str()
        .map(str::to_string)
        .or_else(|| {
            headers
                .get("x-forwarded-proto")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(|value| value.trim().to_string())
        })
        .unwrap_or_else(|| "http".to_string());

    let host = uri
        .authority()
        .map(|authority| authority.as_str().to_string())
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "localhost".to_string());

    let raw = format!("{}://{}{}", scheme, host, uri.path());
    match Url::parse(&raw) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.as_str().trim_end_matches('/').to_string()
        }
        Err(_) => raw.trim_end_matches('/').to_string(),
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic".to_string()
    };

    error!(panic = %message, "SOAP operation panicked");
    SoapError::Internal(message).into_response()
}
