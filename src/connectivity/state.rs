//! Connectivity verdict and the resolver that produces it.
//!
//! # States
//! - Online: network up, connection live, HTTP path healthy
//! - Degraded: transport reachable but HTTP path failing
//! - Offline: no network or no live connection
//!
//! # Resolution
//! ```text
//! !network_available || !connection_live → Offline
//! !http_healthy                           → Degraded
//! otherwise                               → Online
//! ```
//!
//! # Design Decisions
//! - Offline wins over Degraded
//! - Resolver is a pure function of the signal triple

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tri-state connectivity verdict.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    /// Optimistic default before any signal has been observed.
    #[default]
    Online = 0,
    Degraded = 1,
    Offline = 2,
}

impl ConnectivityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectivityState::Online => "online",
            ConnectivityState::Degraded => "degraded",
            ConnectivityState::Offline => "offline",
        }
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map the three signals to a verdict.
pub fn resolve(network_available: bool, connection_live: bool, http_healthy: bool) -> ConnectivityState {
    if !network_available || !connection_live {
        ConnectivityState::Offline
    } else if !http_healthy {
        ConnectivityState::Degraded
    } else {
        ConnectivityState::Online
    }
}
