//! Reachability probing.
//!
//! # Data Flow
//! ```text
//! RecoveryProber tick
//!     → ReachabilityProbe::probe()
//!     → Ok(outcome)  : backend answered (any status) → report_success
//!     → Err(error)   : transport failure            → ignored until next tick
//! ```
//!
//! # Design Decisions
//! - The probe is a trait so tests can script outcomes
//! - HTTP status is informational; a response of any kind proves reachability

pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpProbe;

/// A completed probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// HTTP status returned by the backend.
    pub status: u16,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid probe url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// One lightweight reachability check against the backend.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn probe(&self) -> Result<ProbeOutcome, ProbeError>;
}
