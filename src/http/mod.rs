//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → POST /          → request.rs (JSON or form body) → register_handler → routing table
//!     → anything else   → proxy_handler
//!         → request.rs  (host extraction, upstream headers)
//!         → routing     (subdomain → route → target)
//!         → forward.rs  (reqwest client, bounded timeout)
//!         → response.rs (strip Server and hop-by-hop headers)
//!     → error.rs on any failure ({"message": ...})
//!     → Send to client
//! ```

pub mod error;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use error::{MessageBody, ProxyError};
pub use forward::{ForwardError, Forwarder, HttpForwarder};
pub use request::{RegisterRequest, X_REQUEST_ID};
pub use server::HttpServer;
