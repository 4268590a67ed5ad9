//! Route lookup for inbound requests.
//!
//! # Responsibilities
//! - Extract the candidate name from the request host
//! - Resolve it against the shared route table
//! - Build the forwarding target for a hit
//!
//! # Design Decisions
//! - Stateless per request; the route table is the only shared state
//! - Explicit errors for "no subdomain" and "unknown route" rather than a default route

use std::sync::Arc;

use crate::routing::subdomain::extract_subdomain;
use crate::routing::table::{RegistrationError, Route, RouteTable};
use crate::routing::target::forwarding_target;

/// A resolved request: the matched route and where to send the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub route: Route,
    pub target: String,
}

/// Reasons a request cannot be resolved to a route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("host carries no subdomain")]
    NoSubdomain,

    #[error("no route registered for '{0}'")]
    UnknownRoute(String),
}

/// Resolves hosts to forwarding targets.
#[derive(Debug, Clone)]
pub struct RequestRouter {
    table: Arc<RouteTable>,
    subdomain_offset: usize,
}

impl RequestRouter {
    pub fn new(table: Arc<RouteTable>, subdomain_offset: usize) -> Self {
        Self {
            table,
            subdomain_offset,
        }
    }

    /// The shared route table.
    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// Register a route in the shared table.
    pub fn register(&self, name: &str, origin: &str) -> Result<(), RegistrationError> {
        self.table.register(name, origin)
    }

    /// Resolve `host` and `path_and_query` to a forwarding target.
    pub fn resolve(&self, host: Option<&str>, path_and_query: &str) -> Result<Resolution, ResolveError> {
        let name = host
            .and_then(|host| extract_subdomain(host, self.subdomain_offset))
            .ok_or(ResolveError::NoSubdomain)?;

        let route = self
            .table
            .find(name)
            .ok_or_else(|| ResolveError::UnknownRoute(name.to_string()))?;
        let target = forwarding_target(&route.origin, path_and_query);

        Ok(Resolution { route, target })
    }
}
