//! The `strata` binary: renders a scripted fly-through over the terrain
//! without a window and optionally saves the last frame as a PNG.

mod error;
mod script;
mod snapshot;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use strata_config::{CliArgs, Config};
use strata_render::{FrameBuffer, FrameStats, RenderLoop, Renderer};
use tracing::{error, info};

use crate::error::AppError;
use crate::script::FlyThrough;

const APP_NAME: &str = "strata";

fn log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_NAME).join("logs"))
}

fn main() {
    let args = CliArgs::parse();
    if let Err(err) = run(&args) {
        error!(error = %err, "strata failed");
        eprintln!("strata: {err}");
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), AppError> {
    let config_dir = match &args.config {
        Some(dir) => dir.clone(),
        None => Config::default_dir()?,
    };
    let mut config = Config::load_or_create(&config_dir)?;
    config.apply_cli_overrides(args);
    config.validate()?;

    strata_log::init_logging(log_dir().as_deref(), cfg!(debug_assertions), Some(&config));
    info!(
        config = %config_dir.display(),
        seed = config.seed,
        width = config.window.width,
        height = config.window.height,
        frames = args.frames,
        "starting strata"
    );

    let (stats_tx, stats_rx) = crossbeam_channel::unbounded();
    let render_loop = RenderLoop::new(&config)?
        .with_frame_limit(args.frames)
        .with_presenter(move |_: &FrameBuffer, stats: &FrameStats| {
            let _ = stats_tx.send(*stats);
        });
    let renderer = Renderer::spawn(render_loop)?;

    let script = FlyThrough::new(args.frames);
    for event in script.opening() {
        renderer.send(event)?;
    }

    let interval = config.debug.stats_interval.max(1);
    loop {
        match stats_rx.recv_timeout(Duration::from_millis(500)) {
            Ok(stats) => {
                if stats.frame % interval == 0 {
                    info!(
                        frame = stats.frame,
                        fps = stats.fps(),
                        chunks = stats.chunks,
                        visible = stats.visible_meshes,
                        triangles = stats.triangles,
                        "frame stats"
                    );
                }
                if stats.frame + 1 >= args.frames {
                    break;
                }
                for event in script.after(stats.frame) {
                    // The loop may have just hit its limit; nothing left to steer.
                    if renderer.send(event).is_err() {
                        break;
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) if renderer.is_running() => continue,
            Err(_) => break,
        }
    }

    let finished = renderer.wait()?;
    info!(
        frames = finished.frame_index(),
        chunks = finished.cache().len(),
        faults = finished.terrain().faults(),
        "fly-through finished"
    );

    if let Some(path) = &args.output {
        snapshot::write_png(path, finished.frame_buffer())?;
        info!(path = %path.display(), "last frame written");
    }
    Ok(())
}
