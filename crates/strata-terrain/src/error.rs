//! Terrain error types.

use strata_config::ConfigError;

use crate::chunk::ChunkCoord;
use crate::noise_field::NoiseError;

/// Errors raised while building a terraformer or generating a chunk.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    /// The terrain settings failed validation.
    #[error("invalid terrain settings: {0}")]
    InvalidSettings(#[from] ConfigError),

    /// A noise lattice could not be allocated.
    #[error("noise field: {0}")]
    Noise(#[from] NoiseError),

    /// The chunk lies beyond the configured world half-extent.
    #[error("chunk {coord} is outside the world (half-extent {limit} chunks)")]
    OutOfBounds { coord: ChunkCoord, limit: i64 },
}
