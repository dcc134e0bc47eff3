//! The scroll-drive loop: extract, dispatch, evaluate, scroll, repeat
//!
//! One logical cycle is in flight at a time. Write completions from a
//! cycle may still be pending when the next cycle extracts - that overlap
//! is tolerated, not prevented (see `dispatcher`). The loop owns pacing,
//! cancellation checks and the plateau bound; everything it knows about
//! progress it re-reads from the ledger, never from its own bookkeeping
//! of what it dispatched.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::capture_events::{CaptureEvent, CaptureEventBus};
use crate::utils::sanitize_file_name;

use super::completion::CompletionStatus;
use super::dispatcher::{CaptureDispatcher, DispatchContext};
use super::error::CaptureError;
use super::extractor::extract_tiles;
use super::ledger::CaptureLedger;
use super::run_state::RunState;
use super::sink::TileSink;
use super::surface::TileSurface;

/// Phases of one capture run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Preparing,
    Cycling,
    Scrolling,
    Complete,
    Stopped,
    Failed,
}

impl RunPhase {
    /// Terminal phases end the run; a later start begins a fresh one.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Stopped | Self::Failed)
    }
}

/// Pacing and termination knobs, taken from `CaptureConfig`
#[derive(Debug, Clone, Copy)]
pub struct LoopOptions {
    /// Wait between a scroll and the next extraction, letting the host
    /// document re-render newly visible tiles
    pub scroll_delay: Duration,
    /// Consecutive no-progress cycles tolerated before the run is
    /// abandoned as stalled
    pub max_stall_cycles: u32,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            scroll_delay: Duration::from_millis(crate::utils::DEFAULT_SCROLL_DELAY_MS),
            max_stall_cycles: crate::utils::DEFAULT_MAX_STALL_CYCLES,
        }
    }
}

/// The orchestrating state machine of one run
pub struct ScrollDriveLoop<S: TileSurface, K: TileSink> {
    surface: Arc<S>,
    sink: Arc<K>,
    ledger: Arc<CaptureLedger>,
    state: RunState,
    events: Arc<CaptureEventBus>,
    options: LoopOptions,
}

impl<S: TileSurface, K: TileSink> ScrollDriveLoop<S, K> {
    #[must_use]
    pub fn new(
        surface: Arc<S>,
        sink: Arc<K>,
        ledger: Arc<CaptureLedger>,
        state: RunState,
        events: Arc<CaptureEventBus>,
        options: LoopOptions,
    ) -> Self {
        Self {
            surface,
            sink,
            ledger,
            state,
            events,
            options,
        }
    }

    /// Drive the run to a terminal phase.
    pub async fn run(self) -> RunPhase {
        let total = self.state.total_pages();
        self.enter(RunPhase::Preparing);

        // Preparing: derive the run's fixed folder/file-name stem from the
        // document title, announce, then start cycling.
        self.emit(CaptureEvent::status("preparing capture run"));
        let title = match self.surface.document_title().await {
            Ok(t) => t,
            Err(e) => return self.fail(format!("could not read document title: {e}")),
        };
        let mut name_stem = sanitize_file_name(&title);
        if name_stem.is_empty() {
            name_stem = "untitled".to_string();
        }
        self.emit(CaptureEvent::status(format!(
            "saving pages into folder \"{name_stem}\""
        )));

        let dispatcher = CaptureDispatcher::new(DispatchContext {
            sink: Arc::clone(&self.sink),
            ledger: Arc::clone(&self.ledger),
            state: self.state.clone(),
            events: self.events.clone(),
            folder: name_stem.clone(),
        });

        let mut stall_cycles: u32 = 0;
        let mut captured_last_cycle = self.ledger.len();

        loop {
            // Cycle boundary: terminal conditions first.
            if self.state.is_complete() {
                return RunPhase::Complete;
            }
            if !self.state.is_running() {
                info!("run {} stopped", self.state.run_id());
                self.emit(CaptureEvent::status("capture stopped"));
                return RunPhase::Stopped;
            }
            if !self.surface.is_alive().await {
                self.state.request_stop();
                warn!("document surface went away, stopping run");
                self.emit(CaptureEvent::status("document surface went away"));
                return RunPhase::Stopped;
            }

            // Cycling: extract and dispatch.
            self.enter(RunPhase::Cycling);
            let tiles = match self.surface.query_tiles().await {
                Ok(tiles) => tiles,
                Err(e) => return self.fail(format!("tile query failed: {e}")),
            };

            let extraction = match extract_tiles(&tiles, &self.ledger, total, &name_stem) {
                Ok(extraction) => extraction,
                Err(e @ CaptureError::NoTilesFound) => return self.fail(e.to_string()),
                Err(e) => return self.fail(format!("extraction failed: {e}")),
            };

            if !extraction.skipped_duplicates.is_empty() || extraction.skipped_malformed > 0 {
                self.emit(CaptureEvent::pages_skipped(
                    extraction.skipped_duplicates.clone(),
                    extraction.skipped_malformed,
                ));
            }
            for (display_id, cause) in &extraction.failed {
                self.emit(CaptureEvent::page_failed(*display_id, cause.clone()));
            }

            let dispatched = extraction.fresh.len();
            if dispatched > 0 {
                debug!("dispatching {dispatched} fresh pages");
            }
            dispatcher.dispatch_cycle(extraction.fresh);

            // Evaluate and publish progress every cycle, even unchanged.
            // Derived fresh from the ledger: completions land in any order.
            let status = CompletionStatus::evaluate(&self.ledger, total);
            self.emit(CaptureEvent::captured_pages(status.captured.clone()));
            self.emit(CaptureEvent::waiting_pages(status.missing.clone()));

            if status.complete && self.state.latch_completion() {
                self.emit(CaptureEvent::run_completed(
                    self.state.run_id(),
                    total,
                    self.state.elapsed(),
                ));
                return RunPhase::Complete;
            }

            // Plateau bound: a cycle that dispatched nothing new and saw
            // no ledger growth brings the run closer to abandonment.
            let captured_now = self.ledger.len();
            if dispatched == 0 && captured_now == captured_last_cycle {
                stall_cycles += 1;
                if stall_cycles >= self.options.max_stall_cycles {
                    let missing = self.ledger.missing_display_ids(total);
                    return self.fail(
                        CaptureError::Stalled {
                            cycles: stall_cycles,
                            missing,
                        }
                        .to_string(),
                    );
                }
            } else {
                stall_cycles = 0;
            }
            captured_last_cycle = captured_now;

            // Scrolling: advance one viewport, then give the host time to
            // re-render before the next extraction.
            self.enter(RunPhase::Scrolling);
            if let Err(e) = self.surface.scroll_by_viewport().await {
                return self.fail(format!("scroll failed: {e}"));
            }
            tokio::time::sleep(self.options.scroll_delay).await;
        }
    }

    fn enter(&self, phase: RunPhase) {
        debug!("run {} -> {phase:?}", self.state.run_id());
    }

    fn fail(&self, reason: String) -> RunPhase {
        self.state.request_stop();
        warn!("run {} failed: {reason}", self.state.run_id());
        self.emit(CaptureEvent::run_failed(
            self.state.run_id(),
            reason,
            self.ledger.missing_display_ids(self.state.total_pages()),
        ));
        RunPhase::Failed
    }

    fn emit(&self, event: CaptureEvent) {
        if let Err(e) = self.events.publish(event) {
            log::trace!("status event dropped: {e}");
        }
    }
}
