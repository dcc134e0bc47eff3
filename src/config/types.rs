//! Core configuration types for capture sessions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::capture_events::CaptureEventBus;

/// Configuration for one capture session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Root directory for captured pages.
    ///
    /// The run's folder (named after the sanitized document title) is
    /// created underneath this directory.
    pub(crate) output_dir: PathBuf,

    /// URL of the canvas-tile document to capture
    pub(crate) start_url: String,

    /// Expected number of pages. `None` means probe the viewer's chrome
    /// for an "<n> of <total>" hint before starting.
    pub(crate) total_pages: Option<u32>,

    /// CSS selector matching the page-tile canvases
    pub(crate) tile_selector: String,

    /// Delay between scrolling and the next extraction, in milliseconds
    ///
    /// Exists to let the viewer's virtualization re-render newly visible
    /// tiles before they are queried.
    pub(crate) scroll_delay_ms: u64,

    /// Consecutive no-progress cycles tolerated before the run is
    /// abandoned as stalled
    pub(crate) max_stall_cycles: u32,

    pub(crate) headless: bool,

    /// Timeout for the initial page load, in seconds
    pub(crate) navigation_timeout_secs: u64,

    /// Optional event bus for publishing run progress
    ///
    /// When unset, the session creates a private bus so publishing is
    /// always possible.
    #[serde(skip)]
    pub(crate) event_bus: Option<Arc<CaptureEventBus>>,

    /// Chrome user data directory for browser profile isolation
    ///
    /// When set, each session uses its own Chrome profile, preventing
    /// profile lock contention between concurrent sessions.
    #[serde(skip)]
    pub(crate) chrome_data_dir: Option<PathBuf>,
}

impl CaptureConfig {
    /// Attach an event bus for real-time run events
    #[must_use]
    pub fn with_event_bus(mut self, bus: Arc<CaptureEventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Get the event bus if attached
    #[must_use]
    pub fn event_bus(&self) -> Option<&Arc<CaptureEventBus>> {
        self.event_bus.as_ref()
    }

    /// Set the Chrome user data directory for profile isolation
    #[must_use]
    pub fn with_chrome_data_dir(mut self, dir: PathBuf) -> Self {
        self.chrome_data_dir = Some(dir);
        self
    }

    /// Get the Chrome user data directory if configured
    #[must_use]
    pub fn chrome_data_dir(&self) -> Option<&PathBuf> {
        self.chrome_data_dir.as_ref()
    }
}
