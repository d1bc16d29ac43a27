//! Connectivity monitor: the public handle collaborators talk to.
//!
//! # Responsibilities
//! - Accept signal reports from the transport layer and HTTP client wrapper
//! - Route resolved targets through the debouncer
//! - On commit, start/stop recovery probing and then notify subscribers
//!
//! # Concurrency
//! All mutable state lives in one `Core` behind a single mutex. Timer tasks
//! hold only a weak reference, so dropping the last handle tears everything
//! down. Commits take an async delivery lock first, which keeps notifications
//! in commit order.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::watch;
use tokio::time::{self, Instant};

use crate::config::{ConnectivityConfig, MonitorConfig};
use crate::connectivity::debounce::{Debouncer, ScheduleOutcome};
use crate::connectivity::notifier::{Notifier, Subscription};
use crate::connectivity::recovery::RecoveryProber;
use crate::connectivity::signals::{SignalTracker, Signals};
use crate::connectivity::state::ConnectivityState;
use crate::connectivity::{DEBOUNCE_WINDOW, FAILURE_THRESHOLD, RECOVERY_INTERVAL};
use crate::observability::metrics;
use crate::probe::{HttpProbe, ProbeError, ReachabilityProbe};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("connectivity monitor requires a tokio runtime: {0}")]
    NoRuntime(#[from] TryCurrentError),
    #[error("invalid backend origin: {0}")]
    InvalidOrigin(#[from] url::ParseError),
    #[error("failed to build probe: {0}")]
    Probe(#[from] ProbeError),
}

/// Timing and threshold knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivitySettings {
    pub debounce_window: Duration,
    pub failure_threshold: u32,
    pub recovery_interval: Duration,
}

impl Default for ConnectivitySettings {
    fn default() -> Self {
        Self {
            debounce_window: DEBOUNCE_WINDOW,
            failure_threshold: FAILURE_THRESHOLD,
            recovery_interval: RECOVERY_INTERVAL,
        }
    }
}

impl From<&ConnectivityConfig> for ConnectivitySettings {
    fn from(config: &ConnectivityConfig) -> Self {
        Self {
            debounce_window: Duration::from_millis(config.debounce_window_ms),
            failure_threshold: config.failure_threshold,
            recovery_interval: Duration::from_secs(config.recovery_interval_secs),
        }
    }
}

/// Point-in-time view of the monitor, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonitorSnapshot {
    pub state: ConnectivityState,
    pub signals: Signals,
    pub pending: Option<ConnectivityState>,
    pub recovery_active: bool,
}

struct Core {
    tracker: SignalTracker,
    committed: ConnectivityState,
    debouncer: Debouncer,
    prober: RecoveryProber,
    closed: bool,
}

struct Inner {
    core: Mutex<Core>,
    notifier: Notifier,
    delivery: tokio::sync::Mutex<()>,
    probe: Arc<dyn ReachabilityProbe>,
    runtime: Handle,
}

impl Inner {
    fn core(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to one connectivity monitor. Clones share the same state.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    inner: Arc<Inner>,
}

impl ConnectivityMonitor {
    /// Create a monitor bound to the current tokio runtime.
    pub fn new(settings: ConnectivitySettings, probe: Arc<dyn ReachabilityProbe>) -> Result<Self, MonitorError> {
        let runtime = Handle::try_current()?;
        Ok(Self::with_runtime(settings, probe, runtime))
    }

    /// Create a monitor whose timers run on `runtime`.
    pub fn with_runtime(settings: ConnectivitySettings, probe: Arc<dyn ReachabilityProbe>, runtime: Handle) -> Self {
        let committed = ConnectivityState::default();
        let core = Core {
            tracker: SignalTracker::new(settings.failure_threshold),
            committed,
            debouncer: Debouncer::new(settings.debounce_window),
            prober: RecoveryProber::new(settings.recovery_interval),
            closed: false,
        };

        metrics::record_state(committed);

        Self {
            inner: Arc::new(Inner {
                core: Mutex::new(core),
                notifier: Notifier::new(committed),
                delivery: tokio::sync::Mutex::new(()),
                probe,
                runtime,
            }),
        }
    }

    /// Build a monitor probing the backend described by `config`.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, MonitorError> {
        let origin = url::Url::parse(&config.backend.origin)?;
        let probe = HttpProbe::new(
            &origin,
            &config.backend.health_path,
            Duration::from_millis(config.backend.probe_timeout_ms),
        )?;
        Self::new(ConnectivitySettings::from(&config.connectivity), Arc::new(probe))
    }

    // --- Signal entry points ---

    /// Host network availability changed.
    pub fn set_network_available(&self, available: bool) {
        tracing::debug!(available, "Network availability reported");
        self.apply(|tracker| tracker.set_network_available(available));
    }

    /// Persistent connection established or lost.
    pub fn set_connection_live(&self, live: bool) {
        tracing::debug!(live, "Connection liveness reported");
        self.apply(|tracker| tracker.set_connection_live(live));
    }

    /// A request completed, whatever its status.
    pub fn report_success(&self) {
        self.apply(SignalTracker::report_success);
    }

    /// A request could not complete at the transport level.
    pub fn report_failure(&self) {
        self.apply(SignalTracker::report_failure);
    }

    // --- Observation ---

    pub fn current_state(&self) -> ConnectivityState {
        self.inner.core().committed
    }

    /// Register `callback`; it is invoked right away with the current state.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(ConnectivityState) + Send + Sync + 'static,
    {
        let (subscription, replay) = {
            let core = self.inner.core();
            self.inner.notifier.register(Arc::new(callback), core.committed)
        };
        replay.run();
        subscription
    }

    /// Receiver tracking the committed state.
    pub fn watch(&self) -> watch::Receiver<ConnectivityState> {
        self.inner.notifier.watch()
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        let core = self.inner.core();
        MonitorSnapshot {
            state: core.committed,
            signals: core.tracker.signals(),
            pending: core.debouncer.pending_target(),
            recovery_active: core.prober.is_running(),
        }
    }

    /// Cancel pending timers and stop probing. Later reports still update
    /// signals but never commit.
    pub fn shutdown(&self) {
        let mut core = self.inner.core();
        if core.closed {
            return;
        }
        core.closed = true;
        core.debouncer.cancel();
        core.prober.stop();
        tracing::info!(state = %core.committed, "Connectivity monitor shut down");
    }

    // --- Internals ---

    fn apply<F>(&self, mutate: F)
    where
        F: FnOnce(&mut SignalTracker) -> Option<ConnectivityState>,
    {
        let mut core = self.inner.core();
        let target = mutate(&mut core.tracker);
        metrics::record_consecutive_failures(core.tracker.signals().consecutive_failures);

        let Some(target) = target else {
            return;
        };
        if core.closed {
            return;
        }

        let committed = core.committed;
        let weak = Arc::downgrade(&self.inner);
        let runtime = self.inner.runtime.clone();
        let outcome = core.debouncer.schedule(target, committed, move |generation, deadline| {
            runtime.spawn(commit_after(weak, generation, deadline))
        });

        match outcome {
            ScheduleOutcome::Armed { target, .. } => {
                tracing::debug!(from = %committed, to = %target, "Connectivity transition pending");
            }
            ScheduleOutcome::Cancelled => {
                tracing::trace!(state = %committed, "Signals back at committed state");
            }
        }
    }
}

async fn commit_after(inner: Weak<Inner>, generation: u64, deadline: Instant) {
    time::sleep_until(deadline).await;

    let Some(inner) = inner.upgrade() else {
        return;
    };
    let _order = inner.delivery.lock().await;

    let (from, to, delivery) = {
        let mut core = inner.core();
        let Some(target) = core.debouncer.take_due(generation) else {
            return;
        };
        if target == core.committed {
            return;
        }

        let from = core.committed;
        core.committed = target;

        let weak = Arc::downgrade(&inner);
        core.prober.on_state_committed(target, &inner.runtime, inner.probe.clone(), move || {
            match weak.upgrade() {
                Some(inner) => {
                    ConnectivityMonitor { inner }.report_success();
                    true
                }
                None => false,
            }
        });

        (from, target, inner.notifier.prepare(target))
    };

    metrics::record_transition(from, to);
    tracing::info!(from = %from, to = %to, "Connectivity state committed");

    inner.notifier.deliver(delivery);
}
