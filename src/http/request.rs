//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Extract the routing-relevant host
//! - Prepare request headers for forwarding to the origin
//! - Decode registration bodies sent as JSON or as a form
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing and forwarded upstream
//! - Inbound Host is dropped; the client derives it from the target authority
//! - Hop-by-hop headers never cross the proxy

use std::net::IpAddr;

use axum::extract::{FromRequest, Request as AxumRequest};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::error::ProxyError;

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Headers that apply to a single connection only.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Registration payload: `{"name": "...", "source": "..."}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: String,
}

/// Registration body decoded from `application/x-www-form-urlencoded` or,
/// for any other content type, JSON.
///
/// Every decoding failure is reported as [`ProxyError::MissingFields`];
/// the parser's reason is logged, never echoed.
#[derive(Debug, Clone)]
pub struct RegisterPayload(pub RegisterRequest);

impl<S> FromRequest<S> for RegisterPayload
where
    S: Send + Sync,
{
    type Rejection = ProxyError;

    async fn from_request(req: AxumRequest, state: &S) -> Result<Self, Self::Rejection> {
        let decoded = if is_form(req.headers()) {
            Form::<RegisterRequest>::from_request(req, state)
                .await
                .map(|Form(payload)| payload)
                .map_err(|rejection| rejection.body_text())
        } else {
            Json::<RegisterRequest>::from_request(req, state)
                .await
                .map(|Json(payload)| payload)
                .map_err(|rejection| rejection.body_text())
        };

        decoded.map(RegisterPayload).map_err(|reason| {
            tracing::debug!(error = %reason, "Rejected registration body");
            ProxyError::MissingFields
        })
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.trim()
                .to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        })
        .unwrap_or(false)
}

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeUuidRequestId;

impl MakeRequestId for MakeUuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let value = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(value))
    }
}

/// Host the client addressed: the Host header, or the URI authority for HTTP/2.
pub fn request_host<B>(request: &Request<B>) -> Option<String> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
}

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

/// Rewrite inbound headers for the upstream request.
pub fn prepare_upstream_headers(headers: &mut HeaderMap, host: Option<&str>, peer: Option<IpAddr>) {
    strip_hop_by_hop(headers);
    headers.remove(header::HOST);

    if let Some(value) = host.and_then(|h| HeaderValue::from_str(h).ok()) {
        headers.insert(X_FORWARDED_HOST, value);
    }
    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));

    if let Some(peer) = peer {
        let forwarded_for = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{}, {}", existing, peer),
            None => peer.to_string(),
        };
        if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_request_host_prefers_header() {
        let req = Request::builder()
            .uri("http://other.example.com/x")
            .header("Host", "blog.example.com")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_host(&req).as_deref(), Some("blog.example.com"));

        let req = Request::builder()
            .uri("http://blog.example.com:5000/x")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_host(&req).as_deref(), Some("blog.example.com:5000"));

        let req = Request::builder().uri("/x").body(Body::empty()).unwrap();
        assert_eq!(request_host(&req), None);
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", HeaderValue::from_static("keep-alive, x-custom-hop"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-custom-hop", HeaderValue::from_static("1"));
        headers.insert("content-type", HeaderValue::from_static("text/plain"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key("content-type"));
    }

    #[test]
    fn test_prepare_upstream_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("blog.example.com"));
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("10.0.0.1"));
        headers.insert("accept", HeaderValue::from_static("*/*"));

        prepare_upstream_headers(
            &mut headers,
            Some("blog.example.com"),
            Some("192.168.1.5".parse().unwrap()),
        );

        assert!(headers.get("host").is_none());
        assert_eq!(headers.get(X_FORWARDED_HOST).unwrap(), "blog.example.com");
        assert_eq!(headers.get(X_FORWARDED_PROTO).unwrap(), "http");
        assert_eq!(headers.get(X_FORWARDED_FOR).unwrap(), "10.0.0.1, 192.168.1.5");
        assert_eq!(headers.get("accept").unwrap(), "*/*");
    }

    #[test]
    fn test_is_form() {
        let mut headers = HeaderMap::new();
        assert!(!is_form(&headers));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(!is_form(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("Application/X-WWW-Form-Urlencoded; charset=utf-8"),
        );
        assert!(is_form(&headers));
    }

    #[tokio::test]
    async fn test_register_payload_from_form() {
        let req = Request::builder()
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("name=%20blog%20&source=http%3A%2F%2Fa.com"))
            .unwrap();

        let RegisterPayload(payload) = RegisterPayload::from_request(req, &()).await.unwrap();
        assert_eq!(payload.name, " blog ");
        assert_eq!(payload.source, "http://a.com");
    }

    #[tokio::test]
    async fn test_register_payload_rejects_wrong_content_type() {
        let req = Request::builder()
            .method("POST")
            .header("content-type", "text/plain")
            .body(Body::from(r#"{"name":"blog","source":"http://a.com"}"#))
            .unwrap();

        let err = RegisterPayload::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, ProxyError::MissingFields));
    }

    #[test]
    fn test_make_request_id() {
        let req = Request::builder().body(()).unwrap();
        let id = MakeUuidRequestId.make_request_id(&req).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }
}
