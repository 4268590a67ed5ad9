//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (POST /):
//!     { name, source }
//!     → table.rs (validate, append)
//!
//! Incoming Request (host, path, query):
//!     → subdomain.rs (leftmost label of host)
//!     → table.rs (first route with that name)
//!     → target.rs (origin + path + query)
//!     → Return: Resolution or ResolveError (NoSubdomain / UnknownRoute)
//! ```
//!
//! # Design Decisions
//! - Routes are added at runtime and never removed
//! - Deterministic: first registered route for a name wins
//! - Name matching is exact and case-sensitive

pub mod router;
pub mod subdomain;
pub mod table;
pub mod target;

pub use router::{RequestRouter, Resolution, ResolveError};
pub use table::{RegistrationError, Route, RouteTable};
