//! Subdomain-keyed reverse proxy library.
//!
//! Clients register a name bound to an origin URL with `POST /`; requests whose
//! host's leftmost label matches a registered name are forwarded to that origin.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Route, RouteTable};
