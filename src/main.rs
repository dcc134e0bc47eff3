// tilegrab: capture canvas-rendered document pages as numbered PNG files.
//
// Usage: tilegrab <url> [--pages N] [--out DIR] [--headed]
//                 [--delay-ms MS] [--max-stall N] [--selector CSS] [--json]

use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use log::info;

use tilegrab::capture_engine::RunPhase;
use tilegrab::capture_events::{CaptureEvent, CaptureEventBus, EventBusError};
use tilegrab::config::CaptureConfig;
use tilegrab::utils::format_display_ids;

struct CliOptions {
    url: String,
    pages: Option<u32>,
    out: String,
    headed: bool,
    delay_ms: Option<u64>,
    max_stall: Option<u32>,
    selector: Option<String>,
    json: bool,
}

fn usage() -> &'static str {
    "Usage: tilegrab <url> [options]\n\
     \n\
     Options:\n\
       --pages N        expected page count (default: probe the viewer)\n\
       --out DIR        output directory (default: ./pages)\n\
       --headed         show the browser window\n\
       --delay-ms MS    delay between scroll cycles (default: 1000)\n\
       --max-stall N    give up after N cycles without progress (default: 30)\n\
       --selector CSS   tile selector (default: canvas.kix-canvas-tile-content)\n\
       --json           emit progress events as JSON lines"
}

impl CliOptions {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut opts = Self {
            url: String::new(),
            pages: None,
            out: "./pages".to_string(),
            headed: false,
            delay_ms: None,
            max_stall: None,
            selector: None,
            json: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--pages" => {
                    let value = args.next().ok_or_else(|| anyhow!("--pages needs a value"))?;
                    opts.pages = Some(value.parse().map_err(|_| anyhow!("invalid page count: {value}"))?);
                }
                "--out" => {
                    opts.out = args.next().ok_or_else(|| anyhow!("--out needs a value"))?;
                }
                "--headed" => opts.headed = true,
                "--delay-ms" => {
                    let value = args.next().ok_or_else(|| anyhow!("--delay-ms needs a value"))?;
                    opts.delay_ms = Some(value.parse().map_err(|_| anyhow!("invalid delay: {value}"))?);
                }
                "--max-stall" => {
                    let value = args.next().ok_or_else(|| anyhow!("--max-stall needs a value"))?;
                    opts.max_stall =
                        Some(value.parse().map_err(|_| anyhow!("invalid cycle count: {value}"))?);
                }
                "--selector" => {
                    opts.selector =
                        Some(args.next().ok_or_else(|| anyhow!("--selector needs a value"))?);
                }
                "--json" => opts.json = true,
                "--help" | "-h" => {
                    println!("{}", usage());
                    std::process::exit(0);
                }
                other if opts.url.is_empty() && !other.starts_with('-') => {
                    opts.url = other.to_string();
                }
                other => bail!("unexpected argument: {other}\n\n{}", usage()),
            }
        }

        if opts.url.is_empty() {
            bail!("{}", usage());
        }
        Ok(opts)
    }
}

/// Render run events to the terminal until the bus shuts down.
///
/// Captured/waiting lists are re-published every cycle even when
/// unchanged; only changed lines are printed.
async fn render_events(bus: Arc<CaptureEventBus>, json: bool) {
    // PageCaptured is per-page detail; the aggregated CapturedPages line
    // supersedes it for terminal output.
    let mut rx = bus.subscribe_filtered(move |event| {
        json || !matches!(event, CaptureEvent::PageCaptured { .. })
    });

    let mut last_captured = String::new();
    let mut last_waiting = String::new();

    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(EventBusError::ReceiverLagged(skipped)) => {
                log::debug!("event renderer lagged, skipped {skipped} events");
                continue;
            }
            Err(_) => break,
        };

        if json {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => log::warn!("could not encode event: {e}"),
            }
            if matches!(event, CaptureEvent::Shutdown { .. }) {
                break;
            }
            continue;
        }

        match event {
            CaptureEvent::RunStarted { total_pages, .. } => {
                println!("capturing {total_pages} pages");
            }
            CaptureEvent::Status { message, .. } => println!("{message}"),
            CaptureEvent::CapturedPages { display_ids, .. } => {
                let line = format_display_ids(&display_ids);
                if line != last_captured {
                    println!("captured: {line}");
                    last_captured = line;
                }
            }
            CaptureEvent::WaitingPages { display_ids, .. } => {
                let line = format_display_ids(&display_ids);
                if line != last_waiting {
                    println!("waiting:  {line}");
                    last_waiting = line;
                }
            }
            CaptureEvent::PagesSkipped { display_ids, malformed, .. } => {
                if !display_ids.is_empty() {
                    log::debug!(
                        "skipped already-captured pages: {}",
                        format_display_ids(&display_ids)
                    );
                }
                if malformed > 0 {
                    log::debug!("skipped {malformed} tiles with unusable stacking hints");
                }
            }
            CaptureEvent::PageFailed { display_id, cause, .. } => {
                eprintln!("page {display_id} failed: {cause}");
            }
            CaptureEvent::RunCompleted { total_pages, duration, .. } => {
                println!("done: all {total_pages} pages captured in {duration:.1?}");
            }
            CaptureEvent::RunFailed { reason, missing, .. } => {
                eprintln!("capture failed: {reason}");
                if !missing.is_empty() {
                    eprintln!("missing pages: {}", format_display_ids(&missing));
                }
            }
            CaptureEvent::Shutdown { .. } => break,
            CaptureEvent::PageCaptured { .. } => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .filter_module("chromiumoxide::handler", log::LevelFilter::Off)
        .filter_module("chromiumoxide::conn", log::LevelFilter::Off)
        .init();

    let opts = CliOptions::parse(std::env::args().skip(1))?;

    let bus = Arc::new(CaptureEventBus::new(1024));
    let renderer = tokio::spawn(render_events(bus.clone(), opts.json));

    let mut builder = CaptureConfig::builder()
        .output_dir(opts.out.as_str())
        .start_url(opts.url.as_str())
        .total_pages(opts.pages)
        .headless(!opts.headed);
    if let Some(delay) = opts.delay_ms {
        builder = builder.scroll_delay_ms(delay);
    }
    if let Some(max_stall) = opts.max_stall {
        builder = builder.max_stall_cycles(max_stall);
    }
    if let Some(selector) = &opts.selector {
        builder = builder.tile_selector(selector.as_str());
    }
    let config = builder.build()?.with_event_bus(bus.clone());

    let phase = tilegrab::capture(config).await?;

    if let Err(e) = renderer.await {
        log::debug!("event renderer ended early: {e}");
    }

    match phase {
        RunPhase::Complete => Ok(()),
        RunPhase::Stopped => {
            info!("capture stopped before completion");
            Ok(())
        }
        other => Err(anyhow!("capture ended in {other:?}")),
    }
}
