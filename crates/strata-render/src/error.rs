use strata_config::ConfigError;
use strata_mesh::ModelError;
use strata_terrain::TerrainError;

/// Errors from building or driving the renderer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid render settings: {0}")]
    InvalidSettings(#[from] ConfigError),

    #[error("terrain setup failed: {0}")]
    Terrain(#[from] TerrainError),

    #[error("failed to load model: {0}")]
    Model(#[from] ModelError),

    #[error("failed to spawn render thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The render thread has exited and no longer receives events.
    #[error("render thread is not running")]
    Disconnected,

    #[error("render thread panicked")]
    Panicked,
}
