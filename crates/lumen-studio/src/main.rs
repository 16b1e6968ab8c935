//! Headless driver for the buffered renderer.
//!
//! Records a small scene every frame and lets a simulated consumer drain the pipeline every
//! `--lag + 1` frames, then prints what reached the backend.
//!
//! ```text
//! lumen-studio [--frames N] [--lag N] [--size WxH] [--verbose]
//! ```

mod scene;

use anyhow::Result;
use clap::Parser;
use lumen_engine::backend::{BackendCall, RecordingBackend};
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::BufferedRenderer;

use scene::Scene;

#[derive(Debug, Parser)]
#[command(name = "lumen-studio")]
#[command(about = "Drive the buffered renderer headlessly and report pipeline statistics")]
#[command(version)]
struct Args {
    /// Number of frames to record
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Frames the consumer falls behind before draining the pipeline
    #[arg(long, default_value_t = 0)]
    lag: u32,

    /// Framebuffer size as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size, default_value = "640x360")]
    size: (i32, i32),

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

/// Parses `WIDTHxHEIGHT` with both sides positive.
fn parse_size(s: &str) -> Result<(i32, i32), String> {
    let (w, h) = s.split_once('x').ok_or_else(|| format!("size {s:?} is not WIDTHxHEIGHT"))?;
    let width: i32 = w.parse().map_err(|_| format!("invalid width {w:?}"))?;
    let height: i32 = h.parse().map_err(|_| format!("invalid height {h:?}"))?;
    if width <= 0 || height <= 0 {
        return Err(format!("size {s:?} must be positive"));
    }
    Ok((width, height))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(LoggingConfig {
        default_level: if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info },
        ..LoggingConfig::default()
    });
    log::info!("{args:?}");

    let (backend, calls) = RecordingBackend::new();
    let mut renderer = BufferedRenderer::new(Box::new(backend));

    let (width, height) = args.size;
    let scene = Scene::load(&mut renderer, width, height)?;

    for frame in 0..args.frames {
        scene.record_frame(&mut renderer, frame);
        let bytes = renderer.recorded_bytes();
        renderer.commit();

        if frame % (args.lag + 1) == 0 {
            renderer.push();
            let report = renderer.execute();
            log::debug!("frame {frame}: {bytes} bytes, {report:?}");
        }
    }

    scene.unload(&mut renderer);
    // drain everything still in flight
    renderer.commit();
    renderer.push();
    renderer.execute();

    let stats = renderer.stats();
    let log = calls.take();
    let creations = log.iter().filter(|c| c.is_creation()).count();
    let draws = log.iter().filter(|c| matches!(c, BackendCall::Draw(_))).count();

    println!();
    println!("  lumen studio · buffered pipeline summary");
    println!("  ─────────────────────────────────────────");
    println!("  frames committed   {:>8}", stats.frames_committed);
    println!("  frames executed    {:>8}", stats.frames_executed);
    println!("  frames dropped     {:>8}", stats.frames_dropped);
    println!("  frames corrupted   {:>8}", stats.frames_corrupted);
    println!("  commands recorded  {:>8}", stats.commands_recorded);
    println!("  commands replayed  {:>8}", stats.commands_replayed);
    println!("  commands skipped   {:>8}", stats.commands_skipped);
    println!("  backend calls      {:>8}", log.len());
    println!("  resources created  {:>8}", creations);
    println!("  draws              {:>8}", draws);
    println!();

    Ok(())
}
