//! Error taxonomy for capture runs
//!
//! Fatal-to-run conditions end the run and surface as `RunFailed` events;
//! per-tile conditions are reported and retried naturally on a later
//! cycle because the tile stays visible until scrolled away.

/// Errors that can end a capture run or a surface operation
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The tile query matched nothing at all - the page is not a
    /// canvas-tile document (or the selector is wrong). Terminal,
    /// distinct from "nothing new this cycle".
    #[error("no page tiles found on the document surface")]
    NoTilesFound,

    /// Repeated cycles produced no new pages; the missing ones will
    /// never render
    #[error("no progress after {cycles} cycles, still waiting on pages {missing:?}")]
    Stalled { cycles: u32, missing: Vec<u32> },

    /// A start request carried an unusable page count
    #[error("total pages must be at least 1 (got {0})")]
    InvalidTotalPages(u32),

    /// CDP-level failure talking to the browser
    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    /// A page script returned data the protocol cannot use
    #[error("page script returned unexpected data: {0}")]
    Script(#[from] serde_json::Error),
}
