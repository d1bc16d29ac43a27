//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Connectivity core produces:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (state gauge, transition and probe counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Metric updates are no-ops until a recorder is installed
//! - RUST_LOG overrides the configured level

pub mod logging;
pub mod metrics;
