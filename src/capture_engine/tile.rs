//! Tile data passed between the surface, extractor and dispatcher

use serde::{Deserialize, Serialize};

/// A visible tile as reported by the rendering surface, before any
/// validation
///
/// `z_hint` is the raw stacking-order value straight out of the computed
/// style ("-1" when the style exposes none); `data_url` is the tile's
/// drawable surface rasterized to a PNG data URL (empty when
/// rasterization threw on the page side).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTile {
    pub z_hint: String,
    pub data_url: String,
}

impl RawTile {
    #[must_use]
    pub fn new(z_hint: impl Into<String>, data_url: impl Into<String>) -> Self {
        Self {
            z_hint: z_hint.into(),
            data_url: data_url.into(),
        }
    }
}

/// A validated, decoded tile ready for dispatch
#[derive(Debug, Clone)]
pub struct ExtractedTile {
    /// 0-based page identifier derived from the stacking hint
    pub id: u32,
    /// 1-based page number shown to the user
    pub display_id: u32,
    /// `{display_id}_{sanitized_title}.png`
    pub file_name: String,
    /// Decoded PNG bytes
    pub bytes: Vec<u8>,
}

/// Everything one extraction pass produced from the visible tile set
#[derive(Debug, Default)]
pub struct CycleExtraction {
    /// Tiles not seen before, ready for dispatch
    pub fresh: Vec<ExtractedTile>,
    /// Display ids skipped because the ledger already has them
    /// (deduplicated, ascending)
    pub skipped_duplicates: Vec<u32>,
    /// Tiles whose hint failed to parse or fell outside `[0, total)`
    pub skipped_malformed: usize,
    /// Tiles with a valid fresh identifier whose image data could not be
    /// decoded, as (display id, cause)
    pub failed: Vec<(u32, String)>,
}
