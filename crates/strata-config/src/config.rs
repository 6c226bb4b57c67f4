//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const APP_NAME: &str = "strata";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Presentation surface settings.
    pub window: WindowConfig,
    /// Frame loop, camera, and shading settings.
    pub render: RenderSettings,
    /// Terrain generation settings.
    pub terrain: TerrainSettings,
    /// Debug/development settings.
    pub debug: DebugConfig,
    /// World seed shared by the main terrain field and every biome field.
    pub seed: u64,
}

/// Presentation surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Frame buffer width in pixels.
    pub width: u32,
    /// Frame buffer height in pixels.
    pub height: u32,
    /// Window title.
    pub title: String,
}

/// Frame loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderSettings {
    /// Radians of rotation per pointer pixel.
    pub sensitivity: f32,
    /// World units moved per frame while a movement key is held.
    pub speed: f32,
    /// Frames between two world-update (chunk streaming) passes.
    pub chunk_update: u64,
    /// Radius, in chunks, kept generated around the camera.
    pub render_distance: u32,
    /// Target milliseconds per frame.
    pub ms_per_frame: u64,
    /// Recolor triangles by world height at render time.
    pub color_by_height: bool,
    /// Brighten high and darken low triangles.
    pub shading: bool,
    /// Apply ambient + directional lighting.
    pub use_lighting: bool,
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
}

/// Terrain generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainSettings {
    /// Elevation offset added to every sample.
    pub base: f32,
    /// World units between two grid vertices.
    pub resolution: f32,
    /// Horizontal scale of the main field and amplitude of its output.
    pub stretch: f32,
    /// Frequency multiplier applied on top of `stretch`.
    pub density: f32,
    /// Strength biomes use to fade their effect in at their edges.
    pub blend: f32,
    /// Half-extent of the world in chunks; chunks beyond are never generated.
    pub chunks: i64,
    /// Grid columns per chunk side.
    pub size: u32,
    /// Replace biome colors with a height ramp.
    pub height_color: bool,
    /// Darken faces that slope away from the sun.
    pub shadowing: bool,
    /// Default ground color (RGB).
    pub color: [u8; 3],
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log frame statistics every N frames (0 = never).
    pub stats_interval: u64,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            title: "Strata".to_string(),
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sensitivity: 0.001,
            speed: 0.10,
            chunk_update: 125,
            render_distance: 10,
            ms_per_frame: 1000 / 60,
            color_by_height: false,
            shading: false,
            use_lighting: false,
            field_of_view: 70.0,
        }
    }
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            base: -5.0,
            resolution: 1.0,
            stretch: 10.0,
            density: 1.0,
            blend: 3.0,
            chunks: 3000,
            size: 16,
            height_color: false,
            shadowing: false,
            // Lawn green.
            color: [124, 252, 0],
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            stats_interval: 60,
            log_level: "info".to_string(),
        }
    }
}

// --- Validation ---

impl TerrainSettings {
    /// World-space edge length of one chunk.
    pub fn chunk_extent(&self) -> f32 {
        self.size as f32 * self.resolution
    }

    /// Reject values the terrain generator cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "terrain.size",
                reason: "chunk size must be at least 1",
            });
        }
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "terrain.resolution",
                reason: "must be a positive finite number",
            });
        }
        if !(self.stretch.is_finite() && self.stretch > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "terrain.stretch",
                reason: "must be a positive finite number",
            });
        }
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "terrain.density",
                reason: "must be a positive finite number",
            });
        }
        if self.chunks < 0 {
            return Err(ConfigError::InvalidValue {
                field: "terrain.chunks",
                reason: "world half-extent cannot be negative",
            });
        }
        Ok(())
    }
}

impl RenderSettings {
    /// Reject values the frame loop cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_update == 0 {
            return Err(ConfigError::InvalidValue {
                field: "render.chunk_update",
                reason: "must be at least 1 frame",
            });
        }
        if !(self.field_of_view > 1.0 && self.field_of_view < 179.0) {
            return Err(ConfigError::InvalidValue {
                field: "render.field_of_view",
                reason: "must be between 1 and 179 degrees",
            });
        }
        Ok(())
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// The platform config directory for Strata (`~/.config/strata` on Linux).
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window",
                reason: "width and height must be non-zero",
            });
        }
        self.render.validate()?;
        self.terrain.validate()
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            tracing::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            tracing::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            tracing::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
