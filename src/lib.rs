pub mod browser_setup;
pub mod capture_engine;
pub mod capture_events;
pub mod config;
pub mod utils;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use capture_engine::{
    CaptureError, CaptureLedger, CompletionStatus, ControlRequest, ControlResponse, FsTileSink,
    RunController, RunPhase, StartOutcome, TileSink, TileSurface,
};
pub use capture_events::{CaptureEvent, CaptureEventBus};
pub use config::CaptureConfig;

use anyhow::Result;

/// Capture every page of the configured document into the output
/// directory, driving a browser for the session's lifetime.
pub async fn capture(config: CaptureConfig) -> Result<RunPhase> {
    capture_engine::run_capture(config).await
}
