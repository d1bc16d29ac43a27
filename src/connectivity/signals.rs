//! Raw signal tracking.
//!
//! # Responsibilities
//! - Hold network, connection, and HTTP health flags
//! - Count consecutive transport failures
//! - Latch HTTP health to unhealthy once the threshold is reached
//!
//! # State Transitions
//! ```text
//! healthy → unhealthy: consecutive_failures >= failure_threshold
//! unhealthy → healthy: any reported success, or connection_live going false → true
//! ```
//!
//! Every mutator returns `Some(target)` when the change warrants a
//! recomputation and `None` when it must not cause churn.

use serde::Serialize;

use crate::connectivity::state::{resolve, ConnectivityState};

/// Snapshot of the raw signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Signals {
    pub network_available: bool,
    pub connection_live: bool,
    pub http_healthy: bool,
    pub consecutive_failures: u32,
}

impl Default for Signals {
    fn default() -> Self {
        Self {
            network_available: true,
            connection_live: true,
            http_healthy: true,
            consecutive_failures: 0,
        }
    }
}

#[derive(Debug)]
pub struct SignalTracker {
    signals: Signals,
    failure_threshold: u32,
}

impl SignalTracker {
    pub fn new(failure_threshold: u32) -> Self {
        Self {
            signals: Signals::default(),
            // A threshold of zero would never trip; treat it as one.
            failure_threshold: failure_threshold.max(1),
        }
    }

    pub fn signals(&self) -> Signals {
        self.signals
    }

    /// Verdict for the current signals.
    pub fn target(&self) -> ConnectivityState {
        resolve(
            self.signals.network_available,
            self.signals.connection_live,
            self.signals.http_healthy,
        )
    }

    pub fn set_network_available(&mut self, available: bool) -> Option<ConnectivityState> {
        self.signals.network_available = available;
        Some(self.target())
    }

    /// A fresh connection (a `false` to `true` edge) discards the failure
    /// history. Repeating `true` leaves it alone.
    pub fn set_connection_live(&mut self, live: bool) -> Option<ConnectivityState> {
        if live && !self.signals.connection_live {
            self.signals.consecutive_failures = 0;
            self.signals.http_healthy = true;
        }
        self.signals.connection_live = live;
        Some(self.target())
    }

    pub fn report_success(&mut self) -> Option<ConnectivityState> {
        self.signals.consecutive_failures = 0;
        if self.signals.http_healthy {
            return None;
        }
        self.signals.http_healthy = true;
        Some(self.target())
    }

    pub fn report_failure(&mut self) -> Option<ConnectivityState> {
        self.signals.consecutive_failures = self.signals.consecutive_failures.saturating_add(1);
        if self.signals.http_healthy && self.signals.consecutive_failures >= self.failure_threshold {
            self.signals.http_healthy = false;
            return Some(self.target());
        }
        None
    }
}
