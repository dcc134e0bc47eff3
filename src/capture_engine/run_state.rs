//! Run-scoped state shared between the controller, the loop and
//! write-completion tasks
//!
//! One `RunState` exists per accepted start request and dies with the
//! run. The running flag doubles as the cooperative cancellation token:
//! it is checked at every suspension point, and write completions that
//! observe it cleared become no-ops.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Shared state of one capture run
#[derive(Debug, Clone)]
pub struct RunState {
    run_id: Uuid,
    total_pages: u32,
    running: Arc<AtomicBool>,
    completed: Arc<AtomicBool>,
    started_at: Instant,
}

impl RunState {
    /// Create state for a freshly accepted run. Starts in the running
    /// state.
    #[must_use]
    pub fn new(total_pages: u32) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            total_pages,
            running: Arc::new(AtomicBool::new(true)),
            completed: Arc::new(AtomicBool::new(false)),
            started_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Whether the run is still live. Checked at the top of every cycle,
    /// before scheduling the next one, and by every write completion.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Cooperative stop: takes effect at the next cycle boundary.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Whether the completion latch has been taken.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    /// Attempt to take the completion latch.
    ///
    /// Exactly one caller - whichever write completion or cycle first
    /// observes a gap-free ledger - wins and returns `true`; it is then
    /// responsible for publishing the completion event. Winning also
    /// clears the running flag.
    pub fn latch_completion(&self) -> bool {
        let first = !self.completed.swap(true, Ordering::SeqCst);
        if first {
            self.running.store(false, Ordering::SeqCst);
        }
        first
    }

    /// Time since the run was accepted
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running_and_incomplete() {
        let state = RunState::new(3);
        assert!(state.is_running());
        assert!(!state.is_complete());
    }

    #[test]
    fn stop_clears_running_only() {
        let state = RunState::new(3);
        state.request_stop();
        assert!(!state.is_running());
        assert!(!state.is_complete());
    }

    #[test]
    fn completion_latch_is_won_exactly_once() {
        let state = RunState::new(3);
        assert!(state.latch_completion());
        assert!(!state.latch_completion());
        assert!(state.is_complete());
        assert!(!state.is_running());
    }

    #[test]
    fn clones_share_flags() {
        let state = RunState::new(3);
        let other = state.clone();
        other.request_stop();
        assert!(!state.is_running());
    }
}
