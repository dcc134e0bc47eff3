//! Getter methods for `CaptureConfig`

use std::path::PathBuf;

use super::types::CaptureConfig;

impl CaptureConfig {
    #[must_use]
    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    #[must_use]
    pub fn start_url(&self) -> &str {
        &self.start_url
    }

    #[must_use]
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    #[must_use]
    pub fn tile_selector(&self) -> &str {
        &self.tile_selector
    }

    #[must_use]
    pub fn scroll_delay_ms(&self) -> u64 {
        self.scroll_delay_ms
    }

    #[must_use]
    pub fn max_stall_cycles(&self) -> u32 {
        self.max_stall_cycles
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn navigation_timeout_secs(&self) -> u64 {
        self.navigation_timeout_secs
    }
}
