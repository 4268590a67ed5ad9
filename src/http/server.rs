//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the registration and proxy handlers
//! - Wire up middleware (tracing, request ID, timeout, CORS, panic capture)
//! - Bind server to listener with graceful shutdown
//! - Forward matched requests to their origin

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    extract::{ConnectInfo, DefaultBodyLimit, State},
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    BoxError, Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::error::{MessageBody, ProxyError};
use crate::http::forward::{parse_target, ForwardError, Forwarder, HttpForwarder};
use crate::http::request::{prepare_upstream_headers, request_host, MakeUuidRequestId, RegisterPayload};
use crate::http::response::{sanitize_upstream_response, strip_server_header};
use crate::observability::metrics;
use crate::routing::{RequestRouter, RouteTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: RequestRouter,
    pub forwarder: Arc<dyn Forwarder>,
}

/// HTTP server for the subdomain proxy.
pub struct HttpServer {
    router: Router,
    routes: Arc<RouteTable>,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server forwarding through a pooled HTTP client.
    pub fn new(config: ProxyConfig) -> Result<Self, ForwardError> {
        let forwarder = HttpForwarder::new(Duration::from_secs(config.timeouts.upstream_secs))?;
        Ok(Self::with_forwarder(config, Arc::new(forwarder)))
    }

    /// Create a server with a custom forwarder.
    pub fn with_forwarder(config: ProxyConfig, forwarder: Arc<dyn Forwarder>) -> Self {
        let routes = Arc::new(RouteTable::new());
        let state = AppState {
            router: RequestRouter::new(routes.clone(), config.routing.subdomain_offset),
            forwarder,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            routes,
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/", post(register_handler).fallback(proxy_handler))
            .fallback(proxy_handler)
            .with_state(state)
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(middleware::from_fn(strip_server_header))
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(timeout_response))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeUuidRequestId));

        if config.security.cors_enabled {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// A clone of the fully layered router, for in-process use.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// The shared route table.
    pub fn routes(&self) -> Arc<RouteTable> {
        self.routes.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Register a route from a JSON or form-encoded body.
async fn register_handler(
    State(state): State<AppState>,
    RegisterPayload(payload): RegisterPayload,
) -> Result<(StatusCode, Json<MessageBody>), ProxyError> {
    if let Err(err) = state.router.register(&payload.name, &payload.source) {
        tracing::warn!(name = %payload.name, source = %payload.source, error = %err, "Registration missing fields");
        return Err(err.into());
    }

    let route_count = state.router.table().len();
    tracing::info!(
        name = %payload.name.trim(),
        origin = %payload.source.trim(),
        routes = route_count,
        "Route registered"
    );
    metrics::record_registration(route_count);

    Ok((StatusCode::CREATED, Json(MessageBody::new("item added"))))
}

/// Main proxy handler.
/// Resolves the subdomain to a route and forwards the request to its origin.
async fn proxy_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let host = request_host(&request);
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let resolution = match state.router.resolve(host.as_deref(), &path_and_query) {
        Ok(resolution) => resolution,
        Err(err) => {
            tracing::warn!(host = ?host, path = %path_and_query, error = %err, "Request not routed");
            let err = ProxyError::from(err);
            metrics::record_request(&method, err.status().as_u16(), "none", start_time);
            return Err(err);
        }
    };
    let route_name = resolution.route.name.as_str();

    let target = match parse_target(&resolution.target) {
        Ok(target) => target,
        Err(err) => {
            tracing::error!(route = %route_name, error = %err, "Route origin is not a usable URL");
            metrics::record_request(&method, 500, route_name, start_time);
            return Err(err.into());
        }
    };

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let (mut parts, body) = request.into_parts();
    prepare_upstream_headers(&mut parts.headers, host.as_deref(), peer);

    tracing::debug!(
        method = %method,
        route = %route_name,
        target = %resolution.target,
        "Proxying request"
    );

    match state
        .forwarder
        .forward(Request::from_parts(parts, body), target)
        .await
    {
        Ok(mut response) => {
            sanitize_upstream_response(&mut response);
            let status = response.status();
            tracing::debug!(route = %route_name, status = %status, "Upstream responded");
            metrics::record_request(&method, status.as_u16(), route_name, start_time);
            Ok(response)
        }
        Err(err) => {
            tracing::error!(
                route = %route_name,
                target = %resolution.target,
                error = %err,
                "Upstream error"
            );
            metrics::record_request(&method, 500, route_name, start_time);
            Err(err.into())
        }
    }
}

/// Turn a handler panic into a 400 reply so only that request fails.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Request handler panicked");

    ProxyError::Malformed.into_response()
}

/// Answer a request that outlived `timeouts.request_secs`.
async fn timeout_response(err: BoxError) -> ProxyError {
    if err.is::<Elapsed>() {
        tracing::warn!("Request timed out");
        ProxyError::RequestTimeout
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
        ProxyError::Malformed
    }
}
