//! Configuration system for Strata.
//!
//! Provides the renderer and terrain settings that persist to disk as RON
//! files. Supports CLI overrides via clap, hot-reload detection, and
//! forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, RenderSettings, TerrainSettings, WindowConfig};
pub use error::ConfigError;
