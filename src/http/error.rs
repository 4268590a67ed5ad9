//! Error replies for the proxy.
//!
//! Every failure is answered with a status code and a JSON body:
//! ```json
//! { "message": "<reason>" }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::forward::ForwardError;
use crate::routing::{RegistrationError, ResolveError};

/// JSON body carried by every error reply and by the registration acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failures surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Registration body did not parse or lacked a non-empty `name`/`source`.
    #[error("No 'item' or 'source' in body")]
    MissingFields,

    /// The request host carries no subdomain label.
    #[error("no subdomain")]
    NoSubdomain,

    /// The subdomain does not match a registered route.
    #[error("No item found")]
    UnknownRoute,

    /// The upstream could not be reached or answered unusably.
    /// The display text is fixed; the cause is only logged.
    #[error("can't proxy it")]
    Upstream(#[source] ForwardError),

    /// A handler panicked while processing the request.
    #[error("malformed request")]
    Malformed,

    /// The whole request exceeded `timeouts.request_secs`.
    #[error("request timed out")]
    RequestTimeout,
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingFields | ProxyError::NoSubdomain | ProxyError::Malformed => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::UnknownRoute => StatusCode::NOT_FOUND,
            ProxyError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ProxyError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ResolveError> for ProxyError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NoSubdomain => ProxyError::NoSubdomain,
            ResolveError::UnknownRoute(_) => ProxyError::UnknownRoute,
        }
    }
}

impl From<RegistrationError> for ProxyError {
    fn from(_: RegistrationError) -> Self {
        ProxyError::MissingFields
    }
}

impl From<ForwardError> for ProxyError {
    fn from(err: ForwardError) -> Self {
        ProxyError::Upstream(err)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(MessageBody::new(self.to_string()))).into_response()
    }
}
