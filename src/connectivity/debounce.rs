//! Debounced state commitment.
//!
//! # State Machine
//!
//! ```text
//!             schedule(t != committed)         deadline elapsed
//!  Idle ─────────────────────────────► Pending ─────────────────► Idle (commit t)
//!   ▲                                   │  ▲
//!   │   schedule(t == committed)        │  │ schedule(t' != committed)
//!   └───────────────────────────────────┘  └── re-arm with t'
//! ```
//!
//! At most one pending transition exists. Re-arming aborts the previous
//! timer task, and every arm carries a generation number so a timer that
//! already woke up cannot commit a superseded target.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::connectivity::state::ConnectivityState;

/// A transition waiting for its quiet window to close.
#[derive(Debug)]
struct PendingTransition {
    target: ConnectivityState,
    generation: u64,
    handle: JoinHandle<()>,
}

/// Result of [`Debouncer::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// Target matched the committed state; any pending transition was dropped.
    Cancelled,
    /// A timer is armed for the target.
    Armed { target: ConnectivityState, deadline: Instant },
}

#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Option<PendingTransition>,
    next_generation: u64,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            next_generation: 0,
        }
    }

    /// Target of the pending transition, if any.
    pub fn pending_target(&self) -> Option<ConnectivityState> {
        self.pending.as_ref().map(|p| p.target)
    }

    /// Schedule a commit of `target`.
    ///
    /// `arm` receives the generation and deadline of the new transition and
    /// must return the handle of the timer task that will call
    /// [`take_due`](Self::take_due) with that generation once the deadline
    /// passes.
    pub fn schedule<F>(
        &mut self,
        target: ConnectivityState,
        committed: ConnectivityState,
        arm: F,
    ) -> ScheduleOutcome
    where
        F: FnOnce(u64, Instant) -> JoinHandle<()>,
    {
        self.cancel();

        if target == committed {
            return ScheduleOutcome::Cancelled;
        }

        self.next_generation = self.next_generation.wrapping_add(1);
        let generation = self.next_generation;
        let deadline = Instant::now() + self.window;
        let handle = arm(generation, deadline);

        self.pending = Some(PendingTransition {
            target,
            generation,
            handle,
        });

        ScheduleOutcome::Armed { target, deadline }
    }

    /// Claim the pending target for commitment.
    ///
    /// Returns `None` when the caller's generation has been superseded or
    /// cancelled. On success the pending slot is cleared.
    pub fn take_due(&mut self, generation: u64) -> Option<ConnectivityState> {
        match &self.pending {
            Some(p) if p.generation == generation => self.pending.take().map(|p| p.target),
            _ => None,
        }
    }

    /// Drop the pending transition and abort its timer.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time;

    use crate::connectivity::state::ConnectivityState::*;

    fn idle_task() -> JoinHandle<()> {
        tokio::spawn(async { std::future::pending::<()>().await })
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_arms_timer() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let outcome = debouncer.schedule(Degraded, Online, |_, _| idle_task());

        assert!(matches!(outcome, ScheduleOutcome::Armed { target: Degraded, .. }));
        assert_eq!(debouncer.pending_target(), Some(Degraded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_quo_cancels_pending() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.schedule(Offline, Online, |_, _| idle_task());

        let outcome = debouncer.schedule(Online, Online, |_, _| panic!("must not arm"));
        assert_eq!(outcome, ScheduleOutcome::Cancelled);
        assert_eq!(debouncer.pending_target(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_supersedes_generation() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let mut first = 0;
        debouncer.schedule(Offline, Online, |g, _| {
            first = g;
            idle_task()
        });
        let mut second = 0;
        debouncer.schedule(Degraded, Online, |g, _| {
            second = g;
            idle_task()
        });

        assert_ne!(first, second);
        assert_eq!(debouncer.take_due(first), None);
        assert_eq!(debouncer.take_due(second), Some(Degraded));
        assert_eq!(debouncer.pending_target(), None);
        assert_eq!(debouncer.take_due(second), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_aborts_previous_timer() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        let f = fired.clone();
        debouncer.schedule(Offline, Online, move |_, deadline| {
            tokio::spawn(async move {
                time::sleep_until(deadline).await;
                f.fetch_add(1, Ordering::SeqCst);
            })
        });
        time::advance(Duration::from_millis(100)).await;

        let f = fired.clone();
        debouncer.schedule(Degraded, Online, move |_, deadline| {
            tokio::spawn(async move {
                time::sleep_until(deadline).await;
                f.fetch_add(1, Ordering::SeqCst);
            })
        });

        time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_is_one_window_out() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();
        match debouncer.schedule(Offline, Online, |_, _| idle_task()) {
            ScheduleOutcome::Armed { deadline, .. } => {
                assert_eq!(deadline - start, Duration::from_millis(300));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_restarts_window() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.schedule(Offline, Online, |_, _| idle_task());
        time::advance(Duration::from_millis(200)).await;

        let rearmed_at = Instant::now();
        let mut armed_for = None;
        debouncer.schedule(Degraded, Online, |_, deadline| {
            armed_for = Some(deadline);
            idle_task()
        });

        assert_eq!(armed_for, Some(rearmed_at + Duration::from_millis(300)));
        assert_eq!(debouncer.pending_target(), Some(Degraded));
    }
}
