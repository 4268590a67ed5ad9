//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → every subscriber (server, tests) stops
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger()
//! ```
//!
//! # Design Decisions
//! - Stop accepting first, then let in-flight requests finish
//! - Route table is dropped with the process; nothing to flush

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
