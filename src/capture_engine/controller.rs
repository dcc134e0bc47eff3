//! Run controller: the start/stop/ping surface of the capture protocol
//!
//! Enforces single-flight (one live run at a time), resets the ledger and
//! run state synchronously on an accepted start, and acknowledges the
//! caller before the first extraction cycle executes - the loop is
//! scheduled, never awaited, from `start`. That ordering keeps a caller
//! sharing a synchronous channel with the loop from deadlocking on its
//! own start request.

use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::capture_events::{CaptureEvent, CaptureEventBus};

use super::error::CaptureError;
use super::ledger::CaptureLedger;
use super::run_state::RunState;
use super::scroll_loop::{LoopOptions, RunPhase, ScrollDriveLoop};
use super::sink::TileSink;
use super::surface::TileSurface;

/// Requests the external trigger surface can make
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ControlRequest {
    /// Liveness check
    Ping,
    /// Begin a run expecting `total_pages` pages
    Start { total_pages: u32 },
    /// Cancel the live run, if any
    Stop,
}

/// Responses to control requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ControlResponse {
    /// Answer to `Ping`
    Active { running: bool },
    /// A run was accepted and scheduled
    Started { run_id: Uuid },
    /// A run is already live; the active run is undisturbed
    AlreadyRunning,
    /// Stop acknowledged (idempotent - also sent when nothing was running)
    Stopped,
}

/// Outcome of a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(Uuid),
    AlreadyRunning,
}

struct ActiveRun {
    state: RunState,
    task: Option<JoinHandle<RunPhase>>,
}

/// Owns run-scoped state and exposes the control surface
pub struct RunController<S: TileSurface, K: TileSink> {
    surface: Arc<S>,
    sink: Arc<K>,
    events: Arc<CaptureEventBus>,
    options: LoopOptions,
    active: Mutex<Option<ActiveRun>>,
}

impl<S: TileSurface, K: TileSink> RunController<S, K> {
    #[must_use]
    pub fn new(
        surface: Arc<S>,
        sink: Arc<K>,
        events: Arc<CaptureEventBus>,
        options: LoopOptions,
    ) -> Self {
        Self {
            surface,
            sink,
            events,
            options,
            active: Mutex::new(None),
        }
    }

    /// Accept or reject a start request.
    ///
    /// On acceptance the ledger and run state are fresh before the first
    /// cycle, the loop task is spawned, and the acknowledgment returns
    /// immediately - the first extraction happens after this call.
    ///
    /// # Errors
    /// `CaptureError::InvalidTotalPages` when `total_pages` is zero.
    pub async fn start(&self, total_pages: u32) -> Result<StartOutcome, CaptureError> {
        if total_pages == 0 {
            return Err(CaptureError::InvalidTotalPages(total_pages));
        }

        let mut active = self.active.lock().await;
        if let Some(run) = active.as_ref()
            && run.state.is_running()
        {
            warn!("start rejected: run {} still live", run.state.run_id());
            return Ok(StartOutcome::AlreadyRunning);
        }

        let state = RunState::new(total_pages);
        let ledger = Arc::new(CaptureLedger::new());
        let run_id = state.run_id();

        info!("run {run_id} accepted, expecting {total_pages} pages");
        if let Err(e) = self
            .events
            .publish(CaptureEvent::run_started(run_id, total_pages))
        {
            log::trace!("status event dropped: {e}");
        }

        let scroll_loop = ScrollDriveLoop::new(
            Arc::clone(&self.surface),
            Arc::clone(&self.sink),
            ledger,
            state.clone(),
            self.events.clone(),
            self.options,
        );
        let task = tokio::spawn(scroll_loop.run());

        *active = Some(ActiveRun {
            state,
            task: Some(task),
        });
        Ok(StartOutcome::Started(run_id))
    }

    /// Request cancellation of the live run. Takes effect at the next
    /// cycle boundary; in-flight writes finish but their completions are
    /// ignored. Idempotent.
    pub async fn stop(&self) {
        if let Some(run) = self.active.lock().await.as_ref() {
            run.state.request_stop();
        }
    }

    /// Whether a run is currently live
    pub async fn is_running(&self) -> bool {
        self.active
            .lock()
            .await
            .as_ref()
            .is_some_and(|run| run.state.is_running())
    }

    /// Phase of the controller as a whole: `Idle` when no run was ever
    /// started or the previous run's task has been claimed
    pub async fn phase(&self) -> RunPhase {
        match self.active.lock().await.as_ref() {
            None => RunPhase::Idle,
            Some(run) if run.state.is_complete() => RunPhase::Complete,
            Some(run) if run.state.is_running() => RunPhase::Cycling,
            Some(_) => RunPhase::Stopped,
        }
    }

    /// Claim the live run's task handle, e.g. to await its terminal
    /// phase. Returns `None` when there is no unclaimed task.
    pub async fn take_task(&self) -> Option<JoinHandle<RunPhase>> {
        self.active
            .lock()
            .await
            .as_mut()
            .and_then(|run| run.task.take())
    }

    /// Serve one control request. The closed request/response pair is the
    /// whole contract between the trigger surface and the protocol.
    ///
    /// # Errors
    /// Propagates start validation failures.
    pub async fn handle_request(
        &self,
        request: ControlRequest,
    ) -> Result<ControlResponse, CaptureError> {
        match request {
            ControlRequest::Ping => Ok(ControlResponse::Active {
                running: self.is_running().await,
            }),
            ControlRequest::Start { total_pages } => match self.start(total_pages).await? {
                StartOutcome::Started(run_id) => Ok(ControlResponse::Started { run_id }),
                StartOutcome::AlreadyRunning => Ok(ControlResponse::AlreadyRunning),
            },
            ControlRequest::Stop => {
                self.stop().await;
                Ok(ControlResponse::Stopped)
            }
        }
    }
}
