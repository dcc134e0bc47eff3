//! Capture dispatch: one write request per fresh tile, ledger update on
//! completion
//!
//! Writes within a cycle are issued concurrently and complete in no
//! particular order, possibly interleaved with later cycles' extractions.
//! The ledger is only updated from the completion path, never at dispatch
//! time, so a page whose write is still in flight can be re-extracted and
//! re-dispatched by the next cycle - harmless, because sink writes are
//! idempotent overwrites and the ledger insert is at-most-once.
//!
//! Completions that arrive after the run's running flag is cleared are
//! dropped without effect.

use std::sync::Arc;

use log::{info, warn};

use crate::capture_events::{CaptureEvent, CaptureEventBus};

use super::completion::CompletionStatus;
use super::ledger::CaptureLedger;
use super::run_state::RunState;
use super::sink::TileSink;
use super::tile::ExtractedTile;

/// Everything a write-completion needs, cheap to clone into spawned tasks
pub struct DispatchContext<K> {
    pub sink: Arc<K>,
    pub ledger: Arc<CaptureLedger>,
    pub state: RunState,
    pub events: Arc<CaptureEventBus>,
    /// Destination folder, fixed for the run's lifetime
    pub folder: String,
}

impl<K> Clone for DispatchContext<K> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            ledger: Arc::clone(&self.ledger),
            state: self.state.clone(),
            events: self.events.clone(),
            folder: self.folder.clone(),
        }
    }
}

impl<K> DispatchContext<K> {
    fn emit(&self, event: CaptureEvent) {
        if let Err(e) = self.events.publish(event) {
            log::trace!("status event dropped: {e}");
        }
    }
}

/// Issues write requests and applies their completions
pub struct CaptureDispatcher<K: TileSink> {
    ctx: DispatchContext<K>,
}

impl<K: TileSink> CaptureDispatcher<K> {
    #[must_use]
    pub fn new(ctx: DispatchContext<K>) -> Self {
        Self { ctx }
    }

    /// Fire one write request per fresh tile.
    ///
    /// Returns immediately after spawning; completions apply themselves
    /// through `apply_write_result` whenever they arrive.
    pub fn dispatch_cycle(&self, fresh: Vec<ExtractedTile>) {
        for tile in fresh {
            let ctx = self.ctx.clone();
            tokio::spawn(async move {
                let result = ctx
                    .sink
                    .write(&ctx.folder, &tile.file_name, &tile.bytes)
                    .await;
                apply_write_result(&ctx, &tile, result);
            });
        }
    }

    #[must_use]
    pub fn context(&self) -> &DispatchContext<K> {
        &self.ctx
    }
}

/// Apply one write completion to the run.
///
/// On success: at-most-once ledger insert, re-publish the full captured
/// set, re-derive completion from current ledger state and take the
/// completion latch if the run just became gap-free. On failure: report
/// and leave the identifier eligible for a later cycle. Either way, a
/// completion for a run that is no longer live is silently ignored.
pub fn apply_write_result<K>(
    ctx: &DispatchContext<K>,
    tile: &ExtractedTile,
    result: anyhow::Result<()>,
) {
    if !ctx.state.is_running() {
        log::trace!(
            "ignoring stale write completion for page {} (run no longer live)",
            tile.display_id
        );
        return;
    }

    match result {
        Ok(()) => {
            if ctx.ledger.insert(tile.id) {
                ctx.emit(CaptureEvent::page_captured(
                    tile.display_id,
                    tile.file_name.clone(),
                ));
                ctx.emit(CaptureEvent::captured_pages(
                    ctx.ledger.captured_display_ids(),
                ));
            }

            let status = CompletionStatus::evaluate(&ctx.ledger, ctx.state.total_pages());
            ctx.emit(CaptureEvent::waiting_pages(status.missing));

            if status.complete && ctx.state.latch_completion() {
                info!(
                    "all {} pages captured in {:?}",
                    ctx.state.total_pages(),
                    ctx.state.elapsed()
                );
                ctx.emit(CaptureEvent::run_completed(
                    ctx.state.run_id(),
                    ctx.state.total_pages(),
                    ctx.state.elapsed(),
                ));
            }
        }
        Err(e) => {
            warn!("write failed for page {}: {e:#}", tile.display_id);
            ctx.emit(CaptureEvent::page_failed(tile.display_id, format!("{e:#}")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    /// Sink that never gets called in these tests - completions are
    /// applied directly to exercise ordering deterministically.
    struct InertSink;

    impl TileSink for InertSink {
        async fn write(&self, _folder: &str, _file: &str, _bytes: &[u8]) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn context(total: u32) -> (DispatchContext<InertSink>, tokio::sync::broadcast::Receiver<CaptureEvent>) {
        let events = Arc::new(CaptureEventBus::new(256));
        let rx = events.subscribe();
        let ctx = DispatchContext {
            sink: Arc::new(InertSink),
            ledger: Arc::new(CaptureLedger::new()),
            state: RunState::new(total),
            events,
            folder: "doc".to_string(),
        };
        (ctx, rx)
    }

    fn tile(id: u32) -> ExtractedTile {
        ExtractedTile {
            id,
            display_id: id + 1,
            file_name: format!("{}_doc.png", id + 1),
            bytes: vec![0u8; 4],
        }
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<CaptureEvent>) -> Vec<CaptureEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[test]
    fn scrambled_completion_order_completes_exactly_once_after_last() {
        let (ctx, mut rx) = context(5);

        // Display order 2, 4, 1, 5, 3 - the identifiers arrive scrambled.
        for id in [1u32, 3, 0, 4] {
            apply_write_result(&ctx, &tile(id), Ok(()));
            assert!(!ctx.state.is_complete(), "complete before all pages arrived");
        }
        apply_write_result(&ctx, &tile(2), Ok(()));

        assert!(ctx.state.is_complete());
        let completions = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, CaptureEvent::RunCompleted { .. }))
            .count();
        assert_eq!(completions, 1, "completion must fire exactly once");
    }

    #[test]
    fn duplicate_completion_does_not_grow_ledger() {
        let (ctx, mut rx) = context(5);

        apply_write_result(&ctx, &tile(2), Ok(()));
        apply_write_result(&ctx, &tile(2), Ok(()));

        assert_eq!(ctx.ledger.len(), 1);
        let captured_events = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, CaptureEvent::PageCaptured { .. }))
            .count();
        assert_eq!(captured_events, 1, "second completion must not re-announce");
    }

    #[test]
    fn failed_write_leaves_page_eligible() {
        let (ctx, mut rx) = context(3);

        apply_write_result(&ctx, &tile(1), Err(anyhow!("disk full")));

        assert!(ctx.ledger.is_empty());
        assert!(!ctx.state.is_complete());
        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, CaptureEvent::PageFailed { display_id: 2, .. })));
    }

    #[test]
    fn stale_completion_after_stop_is_a_no_op() {
        let (ctx, mut rx) = context(3);

        ctx.state.request_stop();
        apply_write_result(&ctx, &tile(0), Ok(()));

        assert!(ctx.ledger.is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn waiting_pages_published_on_every_completion() {
        let (ctx, mut rx) = context(3);

        apply_write_result(&ctx, &tile(0), Ok(()));
        apply_write_result(&ctx, &tile(2), Ok(()));

        let waiting: Vec<Vec<u32>> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                CaptureEvent::WaitingPages { display_ids, .. } => Some(display_ids),
                _ => None,
            })
            .collect();
        assert_eq!(waiting, vec![vec![2, 3], vec![2]]);
    }
}
