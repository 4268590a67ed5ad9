//! Upstream forwarding.
//!
//! # Responsibilities
//! - Send the prepared request to the route's origin
//! - Bound the upstream call with a timeout
//! - Stream request and response bodies through without buffering
//!
//! # Design Decisions
//! - Forwarding sits behind the `Forwarder` trait so handlers can be tested
//!   without a network
//! - No retries: a failed call is reported once
//! - Redirects are handed back to the client, never followed

use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, HttpBody};
use axum::http::{Request, Response, Uri};

/// Reasons a request could not be forwarded.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("invalid forwarding target '{0}'")]
    InvalidTarget(String),

    #[error("could not build upstream request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),
}

/// Sends a request to an absolute target URI.
#[async_trait]
pub trait Forwarder: Send + Sync + std::fmt::Debug {
    async fn forward(&self, request: Request<Body>, target: Uri) -> Result<Response<Body>, ForwardError>;
}

/// Parse a forwarding target, requiring a scheme and an authority.
pub fn parse_target(target: &str) -> Result<Uri, ForwardError> {
    let uri: Uri = target
        .parse()
        .map_err(|_| ForwardError::InvalidTarget(target.to_string()))?;

    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(ForwardError::InvalidTarget(target.to_string()));
    }
    Ok(uri)
}

/// Forwarder over a pooled `reqwest` client; reaches both http and https origins.
#[derive(Debug, Clone)]
pub struct HttpForwarder {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpForwarder {
    pub fn new(timeout: Duration) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .map_err(ForwardError::Request)?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl Forwarder for HttpForwarder {
    async fn forward(&self, request: Request<Body>, target: Uri) -> Result<Response<Body>, ForwardError> {
        let (parts, body) = request.into_parts();

        let mut builder = self
            .client
            .request(parts.method, target.to_string())
            .headers(parts.headers);
        if body.size_hint().exact() != Some(0) {
            builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }
        let upstream = builder.build().map_err(ForwardError::Request)?;

        let response = tokio::time::timeout(self.timeout, self.client.execute(upstream))
            .await
            .map_err(|_| ForwardError::Timeout(self.timeout))?
            .map_err(ForwardError::Transport)?;

        let status = response.status();
        let headers = response.headers().clone();
        let mut forwarded = Response::new(Body::from_stream(response.bytes_stream()));
        *forwarded.status_mut() = status;
        *forwarded.headers_mut() = headers;
        Ok(forwarded)
    }
}
