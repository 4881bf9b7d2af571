//! # Tide Dashboard Entry Point
//!
//! Runs render cycles forever: fetch weather and tide data, compose the
//! 800x480 frame, hand it to the display, sleep until the next refresh.
//! A failed fetch stage draws the full-screen error panel instead and
//! retries the whole cycle after a fixed delay; missing assets abort the
//! process because they indicate a packaging defect.
//!
//! Pass `--once` to render a single cycle and exit (for cron-style use).

#[cfg(all(target_os = "linux", feature = "hardware"))]
mod hardware;

use anyhow::Context;
use chrono::Local;
use std::env;
use std::thread;
use tide_dashboard_lib::config::Config;
use tide_dashboard_lib::cycle::{Cycle, CycleError};
use tide_dashboard_lib::display::{DisplayTarget, DryRunDisplay};
use tide_dashboard_lib::layout::{render_error_panel, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Pick the output target once at startup.
///
/// `dry_run = true` always writes a PNG preview. Without the `hardware`
/// feature the binary cannot drive the panel, so it falls back to the
/// preview with a warning rather than refusing to run.
fn open_display(config: &Config) -> anyhow::Result<Box<dyn DisplayTarget>> {
    if config.dry_run {
        eprintln!(
            "Dry run: frames will be written to {}",
            config.display.preview_path
        );
        return Ok(Box::new(DryRunDisplay::new(&config.display.preview_path)));
    }
    open_panel(config)
}

#[cfg(all(target_os = "linux", feature = "hardware"))]
fn open_panel(config: &Config) -> anyhow::Result<Box<dyn DisplayTarget>> {
    let epd = hardware::EpdDisplay::open(&config.display.hardware)
        .context("failed to open e-paper display")?;
    Ok(Box::new(epd))
}

#[cfg(not(all(target_os = "linux", feature = "hardware")))]
fn open_panel(config: &Config) -> anyhow::Result<Box<dyn DisplayTarget>> {
    eprintln!("E-paper support not enabled. Rebuild with --features hardware for the panel.");
    eprintln!("Writing frames to {} instead.", config.display.preview_path);
    Ok(Box::new(DryRunDisplay::new(&config.display.preview_path)))
}

fn main() -> anyhow::Result<()> {
    let once = env::args().any(|arg| arg == "--once");

    let config = Config::load();
    let rt = tokio::runtime::Runtime::new()?;

    let mut display = open_display(&config)?;
    let cycle = Cycle::new(&config);

    loop {
        match rt.block_on(cycle.run()) {
            Ok(frame) => {
                display.show(&frame).context("display write failed")?;
                eprintln!(
                    "Frame displayed for {} at {}",
                    config.location_name,
                    Local::now().format("%H:%M")
                );
                if once {
                    return Ok(());
                }
                thread::sleep(config.refresh_delay());
            }
            Err(CycleError::Fetch { stage, source }) => {
                eprintln!("Error in the {} request: {}", stage, source);
                let panel = render_error_panel(
                    SCREEN_WIDTH,
                    SCREEN_HEIGHT,
                    stage.panel_label(),
                    config.display.error_retry_secs,
                    Local::now(),
                );
                display.show(&panel).context("display write failed")?;
                if once {
                    anyhow::bail!("{} fetch failed: {}", stage, source);
                }
                // Unbounded cycle-level retry: a persistent outage keeps
                // redrawing the panel rather than crashing.
                thread::sleep(config.error_retry_delay());
            }
            // A missing template or icon cannot heal on retry.
            Err(CycleError::Asset(err)) => return Err(err.into()),
        }
    }
}
