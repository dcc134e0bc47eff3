//! The capture protocol: discover every virtualized page tile exactly
//! once and persist it
//!
//! Leaf to root: the `ledger` records what has been captured, the
//! `extractor` turns one cycle's visible tiles into dispatchable pages,
//! the `dispatcher` issues writes and applies their out-of-order
//! completions, `completion` decides when the run is done, the
//! `scroll_loop` paces cycles and scrolling, and the `controller` exposes
//! start/stop/ping with a single-flight guarantee. `surface` and `sink`
//! are the two seams to the outside world; `session` wires it all to a
//! real browser.

pub mod completion;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod ledger;
pub mod page_count;
pub mod run_state;
pub mod scroll_loop;
pub mod session;
pub mod sink;
pub mod surface;
pub mod tile;

pub use completion::CompletionStatus;
pub use controller::{ControlRequest, ControlResponse, RunController, StartOutcome};
pub use dispatcher::{CaptureDispatcher, DispatchContext};
pub use error::CaptureError;
pub use extractor::extract_tiles;
pub use ledger::CaptureLedger;
pub use page_count::detect_page_count;
pub use run_state::RunState;
pub use scroll_loop::{LoopOptions, RunPhase, ScrollDriveLoop};
pub use session::run_capture;
pub use sink::{FsTileSink, TileSink};
pub use surface::{DomTileSurface, TileSurface};
pub use tile::{CycleExtraction, ExtractedTile, RawTile};
