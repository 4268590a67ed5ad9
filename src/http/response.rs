//! Response transformation.
//!
//! # Responsibilities
//! - Remove the `Server` header from every response leaving the proxy
//! - Strip hop-by-hop headers from forwarded responses
//!
//! # Design Decisions
//! - Applied as a uniform middleware, independent of route matching
//! - Upstream bodies are streamed, never buffered

use axum::{
    body::Body,
    http::{header, Request},
    middleware::Next,
    response::Response,
};

use crate::http::request::strip_hop_by_hop;

/// Middleware removing the `Server` header before transmission.
pub async fn strip_server_header(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().remove(header::SERVER);
    response
}

/// Clean a response received from an origin before handing it to the client.
pub fn sanitize_upstream_response(response: &mut Response) {
    strip_hop_by_hop(response.headers_mut());
}
