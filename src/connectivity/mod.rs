//! Connectivity state machine.
//!
//! # Data Flow
//! ```text
//! set_network_available / set_connection_live / report_success / report_failure
//!     → signals.rs (update raw signals, threshold classification)
//!     → state.rs (resolve target verdict)
//!     → debounce.rs (arm, re-arm, or cancel the single pending transition)
//!
//! Debounce window closes:
//!     → commit target
//!     → recovery.rs (start probing on Degraded, stop otherwise)
//!     → notifier.rs (broadcast to subscribers)
//!
//! Recovery tick (Degraded only):
//!     → probe::ReachabilityProbe
//!     → resolved → report_success
//! ```
//!
//! # Design Decisions
//! - Offline beats Degraded
//! - A fresh connection wipes the failure history
//! - Only the settled target after a quiet window is ever announced
//! - Initial state is Online until a signal says otherwise

pub mod debounce;
pub mod monitor;
pub mod notifier;
pub mod recovery;
pub mod signals;
pub mod state;

use std::time::Duration;

pub use monitor::{ConnectivityMonitor, ConnectivitySettings, MonitorError, MonitorSnapshot};
pub use notifier::Subscription;
pub use signals::Signals;
pub use state::{resolve, ConnectivityState};

/// Quiet window before a target state is committed.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Consecutive transport failures that mark the HTTP path unhealthy.
pub const FAILURE_THRESHOLD: u32 = 3;

/// Period of recovery probes while degraded.
pub const RECOVERY_INTERVAL: Duration = Duration::from_secs(15);
