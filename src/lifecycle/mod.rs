//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! SIGTERM/SIGINT → signals.rs → main loop exits → monitor.shutdown()
//! ```
//!
//! # Design Decisions
//! - Shutdown cancels every pending timer before exit

pub mod signals;
