//! Recovery probing while degraded.
//!
//! # Responsibilities
//! - Run a periodic reachability probe only while the committed state is Degraded
//! - Forward resolved probes as successes
//! - Ignore transport failures (retry on the next tick)
//!
//! # Design Decisions
//! - One probe task at most; starting while running is a no-op
//! - First tick is one full interval after entering Degraded
//! - Probes never report failures, so probing cannot deepen degradation

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::connectivity::state::ConnectivityState;
use crate::observability::metrics;
use crate::probe::ReachabilityProbe;

/// Shortest period the ticker accepts.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub struct RecoveryProber {
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl RecoveryProber {
    pub fn new(interval: Duration) -> Self {
        if interval < MIN_INTERVAL {
            tracing::warn!(interval = ?interval, min = ?MIN_INTERVAL, "Recovery interval too short, clamping");
        }
        Self {
            interval: interval.max(MIN_INTERVAL),
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// React to a committed state.
    ///
    /// `on_reachable` is called after every resolved probe and returns
    /// `false` once its target is gone, which ends the loop.
    pub fn on_state_committed<F>(
        &mut self,
        state: ConnectivityState,
        runtime: &Handle,
        probe: Arc<dyn ReachabilityProbe>,
        on_reachable: F,
    ) where
        F: Fn() -> bool + Send + 'static,
    {
        match state {
            ConnectivityState::Degraded if self.task.is_none() => {
                tracing::info!(interval = ?self.interval, "Recovery prober starting");
                let interval = self.interval;
                self.task = Some(runtime.spawn(run(interval, probe, on_reachable)));
            }
            ConnectivityState::Degraded => {}
            _ => self.stop(),
        }
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!("Recovery prober stopped");
        }
    }
}

impl Drop for RecoveryProber {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run<F>(interval: Duration, probe: Arc<dyn ReachabilityProbe>, on_reachable: F)
where
    F: Fn() -> bool + Send + 'static,
{
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match probe.probe().await {
            Ok(outcome) => {
                tracing::debug!(status = outcome.status, "Recovery probe reached backend");
                metrics::record_probe(true);
                if !on_reachable() {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Recovery probe failed, retrying next tick");
                metrics::record_probe(false);
            }
        }
    }
}
