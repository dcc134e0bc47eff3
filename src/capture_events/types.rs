//! Event type definitions for the capture event system
//!
//! Every observable moment of a capture run is a variant here. Observers
//! (the CLI, embedders, tests) subscribe through the bus and match on the
//! closed set of variants rather than on ad hoc tagged payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reason for event bus shutdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShutdownReason {
    /// Run finished with every page captured
    RunCompleted,
    /// Run encountered a fatal error
    Error(String),
    /// Run was cancelled by the caller
    Cancelled,
}

/// Events emitted during a capture run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CaptureEvent {
    /// A run was accepted and its loop is about to be scheduled
    RunStarted {
        run_id: Uuid,
        total_pages: u32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Free-form human-readable progress message
    Status {
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// One page was persisted successfully
    PageCaptured {
        display_id: u32,
        file_name: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Full set of captured pages so far, ascending display ids
    ///
    /// Re-published after every successful write so observers can render
    /// progress without accumulating state of their own.
    CapturedPages {
        display_ids: Vec<u32>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Pages still outstanding, ascending display ids (empty = none)
    WaitingPages {
        display_ids: Vec<u32>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Tiles skipped this cycle: already-captured display ids plus a count
    /// of tiles whose stacking hint could not be used at all
    PagesSkipped {
        display_ids: Vec<u32>,
        malformed: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// A single page write failed; the page stays eligible for retry
    PageFailed {
        display_id: u32,
        cause: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Every page reached disk; the run is over
    RunCompleted {
        run_id: Uuid,
        total_pages: u32,
        duration: std::time::Duration,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// The run ended without capturing every page
    RunFailed {
        run_id: Uuid,
        reason: String,
        missing: Vec<u32>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Signals that the event bus is shutting down
    ///
    /// Subscribers should exit their event loops when receiving this event.
    Shutdown {
        reason: ShutdownReason,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Helper functions for creating common events
impl CaptureEvent {
    /// Create a `RunStarted` event
    #[must_use]
    pub fn run_started(run_id: Uuid, total_pages: u32) -> Self {
        Self::RunStarted {
            run_id,
            total_pages,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a `Status` event
    #[must_use]
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a `PageCaptured` event
    #[must_use]
    pub fn page_captured(display_id: u32, file_name: String) -> Self {
        Self::PageCaptured {
            display_id,
            file_name,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a `CapturedPages` event
    #[must_use]
    pub fn captured_pages(display_ids: Vec<u32>) -> Self {
        Self::CapturedPages {
            display_ids,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a `WaitingPages` event
    #[must_use]
    pub fn waiting_pages(display_ids: Vec<u32>) -> Self {
        Self::WaitingPages {
            display_ids,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a `PagesSkipped` event
    #[must_use]
    pub fn pages_skipped(display_ids: Vec<u32>, malformed: usize) -> Self {
        Self::PagesSkipped {
            display_ids,
            malformed,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a `PageFailed` event
    #[must_use]
    pub fn page_failed(display_id: u32, cause: impl Into<String>) -> Self {
        Self::PageFailed {
            display_id,
            cause: cause.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a `RunCompleted` event
    #[must_use]
    pub fn run_completed(run_id: Uuid, total_pages: u32, duration: std::time::Duration) -> Self {
        Self::RunCompleted {
            run_id,
            total_pages,
            duration,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a `RunFailed` event
    #[must_use]
    pub fn run_failed(run_id: Uuid, reason: impl Into<String>, missing: Vec<u32>) -> Self {
        Self::RunFailed {
            run_id,
            reason: reason.into(),
            missing,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Create a `Shutdown` event
    #[must_use]
    pub fn shutdown(reason: ShutdownReason) -> Self {
        Self::Shutdown {
            reason,
            timestamp: chrono::Utc::now(),
        }
    }
}
