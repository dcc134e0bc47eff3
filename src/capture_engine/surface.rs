//! The rendering-surface seam
//!
//! The capture protocol only ever talks to a `TileSurface`; the
//! production implementation wraps a chromiumoxide `Page` and runs the
//! DOM queries in the document's own JavaScript context. Tests substitute
//! scripted surfaces, so the whole protocol runs without a browser.
//!
//! Surface handles are queried fresh every cycle - nothing DOM-derived is
//! cached across scroll events, because virtualization invalidates tiles
//! as they leave the viewport.

use std::future::Future;

use chromiumoxide::Page;
use log::trace;

use super::error::CaptureError;
use super::tile::RawTile;

/// One scrollable canvas-tile document
pub trait TileSurface: Send + Sync + 'static {
    /// Report every currently visible tile with its raw stacking hint and
    /// rasterized image data
    fn query_tiles(&self) -> impl Future<Output = Result<Vec<RawTile>, CaptureError>> + Send;

    /// Advance the viewport by exactly one viewport height
    fn scroll_by_viewport(&self) -> impl Future<Output = Result<(), CaptureError>> + Send;

    /// The document's title, used for folder and file naming
    fn document_title(&self) -> impl Future<Output = Result<String, CaptureError>> + Send;

    /// Whether the surface can still be driven (tab open, page attached)
    fn is_alive(&self) -> impl Future<Output = bool> + Send;
}

/// `TileSurface` over a live chromiumoxide page
#[derive(Debug, Clone)]
pub struct DomTileSurface {
    page: Page,
    /// JS string literal form of the tile selector, escaped once up front
    selector_literal: String,
}

impl DomTileSurface {
    #[must_use]
    pub fn new(page: Page, tile_selector: &str) -> Self {
        Self {
            page,
            selector_literal: format!("{tile_selector:?}"),
        }
    }

    /// Access to the underlying page, for heuristics that are not part of
    /// the core protocol (page-count detection)
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }
}

impl TileSurface for DomTileSurface {
    async fn query_tiles(&self) -> Result<Vec<RawTile>, CaptureError> {
        // toDataURL throws on tainted canvases; an empty dataUrl comes
        // back instead and is reported as a per-tile failure downstream.
        let script = format!(
            r#"(() => {{
                const tiles = Array.from(document.querySelectorAll({selector}));
                return tiles.map((canvas) => {{
                    let dataUrl = "";
                    try {{ dataUrl = canvas.toDataURL("image/png"); }} catch (e) {{}}
                    return {{
                        zHint: String(getComputedStyle(canvas).zIndex || "-1"),
                        dataUrl,
                    }};
                }});
            }})()"#,
            selector = self.selector_literal,
        );

        let tiles: Vec<RawTile> = self.page.evaluate(script).await?.into_value()?;
        trace!("tile query returned {} visible tiles", tiles.len());
        Ok(tiles)
    }

    async fn scroll_by_viewport(&self) -> Result<(), CaptureError> {
        self.page
            .evaluate("window.scrollBy(0, window.innerHeight)")
            .await?;
        Ok(())
    }

    async fn document_title(&self) -> Result<String, CaptureError> {
        Ok(self.page.get_title().await?.unwrap_or_default())
    }

    async fn is_alive(&self) -> bool {
        self.page.evaluate("document.readyState").await.is_ok()
    }
}
