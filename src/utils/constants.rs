//! Shared configuration constants for tilegrab
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Default CSS selector for page-tile canvases
///
/// Matches the canvas elements that document viewers with virtualized
/// rendering use for individual pages. Overridable per run via
/// `tile_selector` for viewers that use a different class.
pub const DEFAULT_TILE_SELECTOR: &str = "canvas.kix-canvas-tile-content";

/// Default delay between capture cycles: 1000 ms
///
/// Virtualized viewers re-render the visible page window asynchronously
/// after a scroll. One second is long enough for the re-render to settle
/// on typical hardware without turning a full-document pass into a crawl.
pub const DEFAULT_SCROLL_DELAY_MS: u64 = 1000;

/// Default number of consecutive no-progress cycles before a run is
/// abandoned as stalled
///
/// A cycle makes no progress when it dispatches nothing new and the
/// ledger has not grown since the previous cycle. Thirty cycles at the
/// default delay is half a minute of scrolling with nothing to show,
/// which in practice means a page that will never render.
pub const DEFAULT_MAX_STALL_CYCLES: u32 = 30;

/// Chrome user agent string
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
/// Next update: 2025-04-29 (quarterly schedule)
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
