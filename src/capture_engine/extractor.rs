//! Tile extraction: visible tiles in, fresh dispatchable pages out
//!
//! The extractor is a pure function of one cycle's visible tile set, the
//! ledger and the run parameters. Re-encountering already-captured tiles
//! is the normal case under virtualized scrolling - a tile stays in the
//! DOM and is re-reported every cycle until it scrolls out of view - so
//! duplicates land in the skip report rather than being errors.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::debug;

use super::error::CaptureError;
use super::ledger::CaptureLedger;
use super::tile::{CycleExtraction, ExtractedTile, RawTile};

/// Validate, deduplicate and decode one cycle's visible tiles.
///
/// A tile is skippable when its stacking hint is malformed (unparseable
/// or outside `[0, total_pages)`) or its identifier is already in the
/// ledger. Skippable tiles go into the report; the rest are decoded into
/// dispatchable pages named `{display_id}_{title}.png`.
///
/// # Errors
/// Returns `CaptureError::NoTilesFound` when the visible set is empty -
/// the surface is not showing a canvas-tile document at all, which is
/// terminal for the run.
pub fn extract_tiles(
    tiles: &[RawTile],
    ledger: &CaptureLedger,
    total_pages: u32,
    sanitized_title: &str,
) -> Result<CycleExtraction, CaptureError> {
    if tiles.is_empty() {
        return Err(CaptureError::NoTilesFound);
    }

    let mut out = CycleExtraction::default();

    for tile in tiles {
        let id = match parse_page_id(&tile.z_hint, total_pages) {
            Some(id) => id,
            None => {
                debug!("skipping tile with unusable stacking hint {:?}", tile.z_hint);
                out.skipped_malformed += 1;
                continue;
            }
        };
        let display_id = id + 1;

        if ledger.contains(id) {
            out.skipped_duplicates.push(display_id);
            continue;
        }

        match decode_data_url(&tile.data_url) {
            Ok(bytes) => out.fresh.push(ExtractedTile {
                id,
                display_id,
                file_name: format!("{display_id}_{sanitized_title}.png"),
                bytes,
            }),
            Err(cause) => out.failed.push((display_id, cause)),
        }
    }

    out.skipped_duplicates.sort_unstable();
    out.skipped_duplicates.dedup();

    Ok(out)
}

/// Parse a raw stacking hint into a page identifier.
///
/// Returns `None` for anything unparseable or outside `[0, total)` -
/// both are malformed per the identifier invariant.
fn parse_page_id(z_hint: &str, total: u32) -> Option<u32> {
    let value: i64 = z_hint.trim().parse().ok()?;
    if value < 0 || value >= i64::from(total) {
        return None;
    }
    Some(value as u32)
}

/// Decode a `data:image/png;base64,...` URL into raw PNG bytes.
fn decode_data_url(data_url: &str) -> Result<Vec<u8>, String> {
    let payload = data_url
        .split_once("base64,")
        .map(|(_, p)| p)
        .ok_or_else(|| "tile produced no image data".to_string())?;

    if payload.is_empty() {
        return Err("tile produced an empty image".to_string());
    }

    BASE64
        .decode(payload)
        .map_err(|e| format!("undecodable image data: {e}"))
}
