//! Procedural terrain: lattice noise fields, ordered biome composition, and
//! chunk mesh generation.

mod chunk;
mod error;
mod lattice;
mod terraformer;

pub mod biome;
pub mod noise_field;

pub use biome::{Biome, Column, default_biomes, derive_seed};
pub use chunk::ChunkCoord;
pub use error::TerrainError;
pub use lattice::{Lattice, MAX_LATTICE_POINTS};
pub use noise_field::{NoiseError, NoiseField, Perlin, ValueNoise};
pub use terraformer::{MAIN_LATTICE, Terraformer, TerraformerBuilder};
