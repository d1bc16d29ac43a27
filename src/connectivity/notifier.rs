//! Broadcast of committed connectivity states.
//!
//! # Responsibilities
//! - Own the subscriber registry
//! - Deliver each committed state to subscribers in registration order
//! - Isolate subscribers from each other's panics
//! - Mirror the committed state on a `watch` channel for async consumers
//!
//! # Design Decisions
//! - The registry lock is never held while a callback runs, so callbacks
//!   may subscribe, unsubscribe, or report signals
//! - A subscriber removed during a delivery is skipped for the rest of it

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;

use crate::connectivity::state::ConnectivityState;

/// Subscriber callback.
pub type Callback = Arc<dyn Fn(ConnectivityState) + Send + Sync>;

struct Subscriber {
    id: u64,
    callback: Callback,
    /// Sequence number of the newest state handed to this subscriber.
    last_seq: Mutex<Option<u64>>,
}

impl Subscriber {
    /// Invoke the callback unless it has already seen `seq` or a newer state.
    fn offer(&self, seq: u64, state: ConnectivityState) {
        let mut last_seq = self.last_seq.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(*last_seq, Some(seen) if seen >= seq) {
            return;
        }
        *last_seq = Some(seq);
        invoke(&self.callback, state);
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    /// Bumped once per published state.
    seq: u64,
    entries: Vec<Arc<Subscriber>>,
}

impl Registry {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }
}

/// Subscribers captured at commit time.
pub struct Delivery {
    seq: u64,
    state: ConnectivityState,
    entries: Vec<Arc<Subscriber>>,
}

/// Initial callback for a new subscriber, run outside every lock.
pub struct Replay {
    seq: u64,
    state: ConnectivityState,
    subscriber: Arc<Subscriber>,
}

impl Replay {
    /// Hand the subscriber its initial state. Skipped if a later commit
    /// already reached it.
    pub fn run(self) {
        self.subscriber.offer(self.seq, self.state);
    }
}

pub struct Notifier {
    registry: Arc<Mutex<Registry>>,
    watch_tx: watch::Sender<ConnectivityState>,
}

impl Notifier {
    pub fn new(initial: ConnectivityState) -> Self {
        let (watch_tx, _) = watch::channel(initial);
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            watch_tx,
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a subscriber. `current` must be the state last passed to
    /// [`prepare`](Self::prepare) (or the initial state); the caller runs
    /// the returned [`Replay`] once it has released its own locks.
    pub fn register(&self, callback: Callback, current: ConnectivityState) -> (Subscription, Replay) {
        let mut registry = self.registry();
        registry.next_id += 1;
        let id = registry.next_id;
        let subscriber = Arc::new(Subscriber {
            id,
            callback,
            last_seq: Mutex::new(None),
        });
        registry.entries.push(subscriber.clone());

        let subscription = Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        };
        let replay = Replay {
            seq: registry.seq,
            state: current,
            subscriber,
        };
        (subscription, replay)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry().entries.len()
    }

    pub fn watch(&self) -> watch::Receiver<ConnectivityState> {
        self.watch_tx.subscribe()
    }

    /// Publish `state` on the watch channel and capture the current
    /// subscribers for delivery.
    pub fn prepare(&self, state: ConnectivityState) -> Delivery {
        self.watch_tx.send_replace(state);
        let mut registry = self.registry();
        registry.seq += 1;
        Delivery {
            seq: registry.seq,
            state,
            entries: registry.entries.clone(),
        }
    }

    /// Invoke every captured subscriber that is still registered.
    pub fn deliver(&self, delivery: Delivery) {
        for subscriber in delivery.entries {
            if !self.registry().contains(subscriber.id) {
                continue;
            }
            subscriber.offer(delivery.seq, delivery.state);
        }
    }
}

/// Call one subscriber, containing any panic.
fn invoke(callback: &Callback, state: ConnectivityState) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(state))) {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!(state = %state, reason = %reason, "Connectivity subscriber panicked");
    }
}

/// Handle returned by `subscribe`.
///
/// Dropping it keeps the subscription alive; call
/// [`unsubscribe`](Self::unsubscribe) to remove the callback.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Remove the callback. Further calls do nothing.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.entries.retain(|entry| entry.id != self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .map(|registry| registry.lock().unwrap_or_else(PoisonError::into_inner).contains(self.id))
            .unwrap_or(false)
    }
}
