//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registration and routing handlers produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) flows through the trace span and upstream
//! - Metrics are cheap when no exporter is installed

pub mod logging;
pub mod metrics;
