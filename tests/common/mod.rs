//! Test utilities for the tilegrab test suite
//!
//! Scripted surfaces and in-memory sinks stand in for the browser and the
//! filesystem so the capture protocol can be driven deterministically.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tilegrab::capture_engine::{CaptureError, RawTile, TileSink, TileSurface};

/// A tile whose image data decodes successfully
#[allow(dead_code)]
pub fn tile(z_hint: &str) -> RawTile {
    RawTile::new(z_hint, "data:image/png;base64,cG5nLWJ5dGVz")
}

/// A surface that replays scripted frames of visible tiles
///
/// Each `query_tiles` call consumes the next frame; once a single frame
/// remains it is repeated forever, which models a viewport that stopped
/// producing anything new.
pub struct ScriptedSurface {
    frames: Mutex<VecDeque<Vec<RawTile>>>,
    title: String,
    alive: AtomicBool,
    scrolls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedSurface {
    pub fn new(title: &str, frames: Vec<Vec<RawTile>>) -> Self {
        Self {
            frames: Mutex::new(frames.into()),
            title: title.to_string(),
            alive: AtomicBool::new(true),
            scrolls: AtomicUsize::new(0),
        }
    }

    pub fn kill(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn scroll_count(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }
}

impl TileSurface for ScriptedSurface {
    async fn query_tiles(&self) -> Result<Vec<RawTile>, CaptureError> {
        let mut frames = self.frames.lock().expect("frames lock");
        if frames.len() > 1 {
            Ok(frames.pop_front().expect("non-empty frame queue"))
        } else {
            Ok(frames.front().cloned().unwrap_or_default())
        }
    }

    async fn scroll_by_viewport(&self) -> Result<(), CaptureError> {
        self.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn document_title(&self) -> Result<String, CaptureError> {
        Ok(self.title.clone())
    }

    async fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

/// An in-memory sink recording every write it is asked to perform
///
/// Optional per-file delays let tests scramble completion order; optional
/// failure budgets make the first N writes of a file fail.
#[derive(Default)]
pub struct RecordingSink {
    writes: Mutex<Vec<(String, String)>>,
    delays: Mutex<HashMap<String, Duration>>,
    failures_left: Mutex<HashMap<String, usize>>,
    attempts: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay completions for `file_name` by `delay`
    pub fn with_delay(self, file_name: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .expect("delays lock")
            .insert(file_name.to_string(), delay);
        self
    }

    /// Fail the first `count` writes of `file_name`
    pub fn with_failures(self, file_name: &str, count: usize) -> Self {
        self.failures_left
            .lock()
            .expect("failures lock")
            .insert(file_name.to_string(), count);
        self
    }

    /// Every (folder, file) pair written so far
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().expect("writes lock").clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().expect("writes lock").len()
    }

    /// Write attempts issued, including ones that were failed or delayed
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl TileSink for RecordingSink {
    async fn write(&self, folder: &str, file_name: &str, _bytes: &[u8]) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let delay = self
            .delays
            .lock()
            .expect("delays lock")
            .get(file_name)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        {
            let mut failures = self.failures_left.lock().expect("failures lock");
            if let Some(left) = failures.get_mut(file_name)
                && *left > 0
            {
                *left -= 1;
                return Err(anyhow!("injected write failure for {file_name}"));
            }
        }

        self.writes
            .lock()
            .expect("writes lock")
            .push((folder.to_string(), file_name.to_string()));
        Ok(())
    }
}
