//! Client-side backend connectivity monitor.
//!
//! Fuses network availability, persistent-connection liveness, and HTTP
//! reachability into one debounced [`ConnectivityState`].

pub mod config;
pub mod connectivity;
pub mod lifecycle;
pub mod observability;
pub mod probe;

pub use config::MonitorConfig;
pub use connectivity::{ConnectivityMonitor, ConnectivitySettings, ConnectivityState, Subscription};
pub use probe::{HttpProbe, ReachabilityProbe};
