//! Command-line argument parsing for Strata.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Software-rendered infinite terrain")]
pub struct CliArgs {
    /// Frame buffer width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Frame buffer height.
    #[arg(long)]
    pub height: Option<u32>,

    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Render distance in chunks.
    #[arg(long)]
    pub render_distance: Option<u32>,

    /// Number of frames to render before exiting.
    #[arg(long, default_value_t = 240)]
    pub frames: u64,

    /// Write the last presented frame to this PNG file.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(seed) = args.seed {
            self.seed = seed;
        }
        if let Some(rd) = args.render_distance {
            self.render.render_distance = rd;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
