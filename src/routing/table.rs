//! In-memory route table.
//!
//! # Responsibilities
//! - Store (name, origin) bindings registered at runtime
//! - Look up the binding for a subdomain name
//!
//! # Design Decisions
//! - Append-only for the lifetime of the process; nothing is persisted
//! - Linear scan in insertion order; duplicate names are allowed and the
//!   first registrant wins
//! - A single RwLock guards the sequence so a lookup sees a route fully or not at all

use std::sync::{PoisonError, RwLock};

/// A binding from a subdomain name to an upstream origin URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    pub origin: String,
}

/// Error returned when a route cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("route name and origin must be non-empty")]
    InvalidInput,
}

/// Ordered, append-only collection of routes shared by all request handlers.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: RwLock<Vec<Route>>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. Both fields are trimmed and must be non-empty.
    pub fn register(&self, name: &str, origin: &str) -> Result<(), RegistrationError> {
        let name = name.trim();
        let origin = origin.trim();
        if name.is_empty() || origin.is_empty() {
            return Err(RegistrationError::InvalidInput);
        }

        let route = Route {
            name: name.to_string(),
            origin: origin.to_string(),
        };

        self.routes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
        Ok(())
    }

    /// Return the first route registered under `name` (case-sensitive).
    pub fn find(&self, name: &str) -> Option<Route> {
        if name.is_empty() {
            return None;
        }

        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|route| route.name == name)
            .cloned()
    }

    /// Number of registered routes, duplicates included.
    pub fn len(&self) -> usize {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
