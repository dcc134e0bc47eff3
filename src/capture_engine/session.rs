//! One capture session: browser up, run to a terminal phase, browser down
//!
//! This is the orchestration layer the binary calls. It owns the browser
//! lifecycle, wires the DOM surface and filesystem sink into a
//! `RunController`, resolves the expected page count (explicit or
//! detected), and drives exactly one run - Ctrl-C requests a cooperative
//! stop rather than tearing the process down mid-write.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};

use crate::browser_setup::launch_browser;
use crate::capture_events::{CaptureEventBus, ShutdownReason};
use crate::config::CaptureConfig;

use super::controller::{RunController, StartOutcome};
use super::page_count::detect_page_count;
use super::scroll_loop::{LoopOptions, RunPhase};
use super::sink::FsTileSink;
use super::surface::DomTileSurface;

/// Run one capture session end to end.
///
/// Publishes progress to the config's event bus (a private one is created
/// when none is attached, so publishing never fails the run) and returns
/// the run's terminal phase.
pub async fn run_capture(config: CaptureConfig) -> Result<RunPhase> {
    let events = config
        .event_bus()
        .cloned()
        .unwrap_or_else(|| Arc::new(CaptureEventBus::default()));

    let (mut browser, handler_task, user_data_dir) =
        launch_browser(config.headless(), config.chrome_data_dir().cloned())
            .await
            .context("failed to launch browser")?;

    // Everything after this point must fall through to browser teardown.
    let phase = drive_run(&config, &events, &browser).await;

    let reason = match &phase {
        Ok(RunPhase::Complete) => ShutdownReason::RunCompleted,
        Ok(RunPhase::Stopped) => ShutdownReason::Cancelled,
        Ok(other) => ShutdownReason::Error(format!("run ended in {other:?}")),
        Err(e) => ShutdownReason::Error(format!("{e:#}")),
    };
    events.shutdown_gracefully(reason).await;

    debug!("closing browser");
    handler_task.abort();
    if let Err(e) = handler_task.await
        && !e.is_cancelled()
    {
        warn!("browser handler task failed during abort: {e}");
    }
    if let Err(e) = browser.close().await {
        warn!("failed to close browser: {e}");
    }
    if let Err(e) = browser.wait().await {
        warn!("failed to wait for browser exit: {e}");
    }
    if let Err(e) = std::fs::remove_dir_all(&user_data_dir) {
        warn!(
            "failed to remove browser profile dir {}: {e}",
            user_data_dir.display()
        );
    }

    phase
}

async fn drive_run(
    config: &CaptureConfig,
    events: &Arc<CaptureEventBus>,
    browser: &chromiumoxide::Browser,
) -> Result<RunPhase> {
    let page = browser
        .new_page(config.start_url())
        .await
        .context("failed to open document page")?;

    let navigation_timeout = Duration::from_secs(config.navigation_timeout_secs());
    match tokio::time::timeout(navigation_timeout, page.wait_for_navigation()).await {
        Ok(result) => {
            result.context("document page failed to load")?;
        }
        Err(_) => {
            // Heavily virtualized viewers keep loading subresources long
            // after the tiles are usable. Proceed and let the tile query
            // decide whether the page is real.
            warn!(
                "navigation not settled after {}s, proceeding",
                config.navigation_timeout_secs()
            );
        }
    }

    let total_pages = match config.total_pages() {
        Some(total) => total,
        None => {
            info!("no page count supplied, probing the viewer");
            detect_page_count(&page)
                .await
                .context("page-count detection failed")?
                .ok_or_else(|| {
                    anyhow!("could not detect the page count; pass an explicit total")
                })?
        }
    };

    let surface = Arc::new(DomTileSurface::new(page, config.tile_selector()));
    let sink = Arc::new(FsTileSink::new(config.output_dir().clone()));
    let controller = RunController::new(
        surface,
        sink,
        events.clone(),
        LoopOptions {
            scroll_delay: Duration::from_millis(config.scroll_delay_ms()),
            max_stall_cycles: config.max_stall_cycles(),
        },
    );

    match controller.start(total_pages).await? {
        StartOutcome::Started(run_id) => debug!("run {run_id} scheduled"),
        StartOutcome::AlreadyRunning => {
            // Fresh controller, nothing can be running yet.
            return Err(anyhow!("controller unexpectedly busy"));
        }
    }

    let mut task = controller
        .take_task()
        .await
        .ok_or_else(|| anyhow!("run task missing after start"))?;

    let phase = tokio::select! {
        joined = &mut task => joined.unwrap_or(RunPhase::Failed),
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, stopping run at the next cycle boundary");
            controller.stop().await;
            task.await.unwrap_or(RunPhase::Stopped)
        }
    };

    info!("run finished: {phase:?}");
    Ok(phase)
}
