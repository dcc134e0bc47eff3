//! Type-safe builder for `CaptureConfig` using the typestate pattern
//!
//! The builder only exposes `build()` once both required fields - the
//! output directory and the document URL - have been set, so an
//! incomplete configuration is a compile error rather than a runtime one.

use anyhow::{Result, anyhow};
use std::marker::PhantomData;
use std::path::PathBuf;

use crate::utils::{DEFAULT_MAX_STALL_CYCLES, DEFAULT_SCROLL_DELAY_MS, DEFAULT_TILE_SELECTOR};

use super::types::CaptureConfig;

// Type states for the builder
pub struct WithOutputDir;
pub struct WithStartUrl;

pub struct CaptureConfigBuilder<State = ()> {
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) start_url: Option<String>,
    pub(crate) total_pages: Option<u32>,
    pub(crate) tile_selector: String,
    pub(crate) scroll_delay_ms: u64,
    pub(crate) max_stall_cycles: u32,
    pub(crate) headless: bool,
    pub(crate) navigation_timeout_secs: u64,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for CaptureConfigBuilder<()> {
    fn default() -> Self {
        Self {
            output_dir: None,
            start_url: None,
            total_pages: None,
            tile_selector: DEFAULT_TILE_SELECTOR.to_string(),
            scroll_delay_ms: DEFAULT_SCROLL_DELAY_MS,
            max_stall_cycles: DEFAULT_MAX_STALL_CYCLES,
            headless: true,
            navigation_timeout_secs: 30,
            _phantom: PhantomData,
        }
    }
}

impl CaptureConfig {
    /// Create a builder for configuring a `CaptureConfig` with a fluent
    /// interface
    #[must_use]
    pub fn builder() -> CaptureConfigBuilder<()> {
        CaptureConfigBuilder::default()
    }
}

impl CaptureConfigBuilder<()> {
    pub fn output_dir(self, dir: impl Into<PathBuf>) -> CaptureConfigBuilder<WithOutputDir> {
        CaptureConfigBuilder {
            output_dir: Some(dir.into()),
            start_url: self.start_url,
            total_pages: self.total_pages,
            tile_selector: self.tile_selector,
            scroll_delay_ms: self.scroll_delay_ms,
            max_stall_cycles: self.max_stall_cycles,
            headless: self.headless,
            navigation_timeout_secs: self.navigation_timeout_secs,
            _phantom: PhantomData,
        }
    }
}

impl CaptureConfigBuilder<WithOutputDir> {
    pub fn start_url(self, url: impl Into<String>) -> CaptureConfigBuilder<WithStartUrl> {
        let url_string = url.into();

        // Normalize URL: add https:// if no scheme is present
        let normalized_url =
            if url_string.starts_with("http://") || url_string.starts_with("https://") {
                url_string
            } else {
                format!("https://{url_string}")
            };

        CaptureConfigBuilder {
            output_dir: self.output_dir,
            start_url: Some(normalized_url),
            total_pages: self.total_pages,
            tile_selector: self.tile_selector,
            scroll_delay_ms: self.scroll_delay_ms,
            max_stall_cycles: self.max_stall_cycles,
            headless: self.headless,
            navigation_timeout_secs: self.navigation_timeout_secs,
            _phantom: PhantomData,
        }
    }
}

// Build method only available when both required fields are set
impl CaptureConfigBuilder<WithStartUrl> {
    pub fn build(self) -> Result<CaptureConfig> {
        let start_url = self
            .start_url
            .ok_or_else(|| anyhow!("start_url is required"))?;

        url::Url::parse(&start_url).map_err(|e| anyhow!("invalid document URL: {e}"))?;

        if let Some(total) = self.total_pages
            && total == 0
        {
            return Err(anyhow!("total_pages must be at least 1"));
        }
        if self.max_stall_cycles == 0 {
            return Err(anyhow!("max_stall_cycles must be at least 1"));
        }

        Ok(CaptureConfig {
            output_dir: self
                .output_dir
                .ok_or_else(|| anyhow!("output_dir is required"))?,
            start_url,
            total_pages: self.total_pages,
            tile_selector: self.tile_selector,
            scroll_delay_ms: self.scroll_delay_ms,
            max_stall_cycles: self.max_stall_cycles,
            headless: self.headless,
            navigation_timeout_secs: self.navigation_timeout_secs,
            event_bus: None,
            chrome_data_dir: None,
        })
    }
}

// Optional settings, available at any builder state
impl<State> CaptureConfigBuilder<State> {
    /// Expected page count. Leave unset to probe the viewer instead.
    #[must_use]
    pub fn total_pages(mut self, total: Option<u32>) -> Self {
        self.total_pages = total;
        self
    }

    /// CSS selector matching the page-tile canvases
    #[must_use]
    pub fn tile_selector(mut self, selector: impl Into<String>) -> Self {
        self.tile_selector = selector.into();
        self
    }

    /// Delay between scrolling and the next extraction, in milliseconds
    #[must_use]
    pub fn scroll_delay_ms(mut self, delay: u64) -> Self {
        self.scroll_delay_ms = delay;
        self
    }

    /// Consecutive no-progress cycles tolerated before abandoning a run
    #[must_use]
    pub fn max_stall_cycles(mut self, cycles: u32) -> Self {
        self.max_stall_cycles = cycles;
        self
    }

    /// Run the browser headless (default) or headed
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Timeout for the initial page load, in seconds
    #[must_use]
    pub fn navigation_timeout_secs(mut self, secs: u64) -> Self {
        self.navigation_timeout_secs = secs;
        self
    }
}
