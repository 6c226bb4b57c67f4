//! Chunk mesh generation from the main noise field and the ordered biome list.
//!
//! Each chunk samples a `(size + 1)²` vertex grid so that neighbouring chunks
//! agree on their shared edge, then emits two triangles per grid column.
//! Vertex sampling is independent per vertex and runs on the rayon pool;
//! results are collected in row-major order, so the output does not depend on
//! scheduling.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Vec2, Vec3};
use rayon::prelude::*;
use strata_config::TerrainSettings;
use strata_mesh::{Color, Mesh, Triangle, height_ramp};
use tracing::{debug, warn};

use crate::biome::{Biome, Column, default_biomes, derive_seed};
use crate::chunk::ChunkCoord;
use crate::error::TerrainError;
use crate::noise_field::{NoiseField, Perlin};

/// Lattice boundaries of the main terrain field.
pub const MAIN_LATTICE: [usize; 2] = [256, 256];

/// Sun direction used by the `shadowing` option.
const SUN: Vec3 = Vec3::new(0.36, 0.88, 0.31);

/// Collects the ordered biome list before the terraformer is built.
pub struct TerraformerBuilder {
    settings: TerrainSettings,
    seed: u64,
    biomes: Vec<Biome>,
}

impl TerraformerBuilder {
    pub fn new(settings: TerrainSettings, seed: u64) -> Self {
        Self {
            settings,
            seed,
            biomes: Vec::new(),
        }
    }

    /// Register a biome after all previously registered ones.
    pub fn biome(mut self, biome: Biome) -> Self {
        self.biomes.push(biome);
        self
    }

    /// Register several biomes, preserving their order.
    pub fn biomes(mut self, biomes: impl IntoIterator<Item = Biome>) -> Self {
        self.biomes.extend(biomes);
        self
    }

    pub fn build(self) -> Result<Terraformer, TerrainError> {
        self.settings.validate()?;
        let main = Perlin::new(self.seed, MAIN_LATTICE)?;
        debug!(
            seed = self.seed,
            biomes = self.biomes.len(),
            size = self.settings.size,
            "terraformer built"
        );
        Ok(Terraformer {
            settings: self.settings,
            seed: self.seed,
            main,
            biomes: self.biomes,
            faults: AtomicU64::new(0),
        })
    }
}

/// Turns chunk coordinates into terrain meshes.
pub struct Terraformer {
    settings: TerrainSettings,
    seed: u64,
    main: Perlin<2>,
    biomes: Vec<Biome>,
    faults: AtomicU64,
}

impl Terraformer {
    /// A terraformer with the five stock biomes.
    pub fn with_default_biomes(settings: TerrainSettings, seed: u64) -> Result<Self, TerrainError> {
        TerraformerBuilder::new(settings, seed)
            .biomes(default_biomes(seed)?)
            .build()
    }

    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn biomes(&self) -> &[Biome] {
        &self.biomes
    }

    /// Columns that fell back to base elevation because a biome misbehaved.
    pub fn faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }

    /// Re-roll the world: the main field gets `seed`, biome `i` gets
    /// `derive_seed(seed, i)`.
    pub fn regenerate(&mut self, seed: u64) {
        self.seed = seed;
        self.main.regenerate(seed);
        for (index, biome) in self.biomes.iter_mut().enumerate() {
            biome.regenerate(derive_seed(seed, index as u64));
        }
        debug!(seed, "terrain regenerated");
    }

    /// Chunk containing a world position, or `None` if it cannot be represented.
    pub fn to_chunk(&self, position: Vec3) -> Option<ChunkCoord> {
        ChunkCoord::from_position(position, self.settings.chunk_extent())
    }

    /// World-space origin of a chunk.
    pub fn to_position(&self, chunk: ChunkCoord) -> Vec3 {
        chunk.to_position(self.settings.chunk_extent())
    }

    /// Whether the chunk lies within the configured world half-extent.
    pub fn in_bounds(&self, chunk: ChunkCoord) -> bool {
        let limit = self.settings.chunks;
        chunk.x.unsigned_abs() <= limit.unsigned_abs() && chunk.z.unsigned_abs() <= limit.unsigned_abs()
    }

    /// Elevation of the main field alone.
    pub fn base_elevation(&self, world: Vec2) -> f32 {
        let s = &self.settings;
        let p = world * (s.density / s.stretch);
        s.base + s.stretch * self.main.sample([p.x, p.y])
    }

    /// Run the biome list over one column.
    ///
    /// A biome that panics or produces a non-finite height makes the column
    /// fall back to its base elevation and default color; the fault is
    /// counted and logged, never propagated.
    pub fn column_at(&self, world: Vec2) -> Column {
        let fallback = Column {
            height: self.base_elevation(world),
            color: Color::from_array(self.settings.color),
            base: self.settings.base,
            blend: self.settings.blend,
        };

        let composed = catch_unwind(AssertUnwindSafe(|| {
            let mut column = fallback;
            for biome in &self.biomes {
                if biome.applies(world) {
                    biome.place(world, &mut column);
                }
            }
            column
        }));

        match composed {
            Ok(column) if column.height.is_finite() => column,
            Ok(column) => {
                self.faults.fetch_add(1, Ordering::Relaxed);
                warn!(x = world.x, z = world.y, height = column.height, "biome produced non-finite height; column skipped");
                fallback
            }
            Err(_) => {
                self.faults.fetch_add(1, Ordering::Relaxed);
                warn!(x = world.x, z = world.y, "biome rule panicked; column skipped");
                fallback
            }
        }
    }

    /// Surface color after the `height_color` option.
    fn column_color(&self, column: &Column) -> Color {
        if self.settings.height_color {
            let t = (column.height - self.settings.base) / (self.settings.stretch * 2.0);
            height_ramp(t, Color::from_array(self.settings.color))
        } else {
            column.color
        }
    }

    /// Face color after the `shadowing` option.
    fn shade(&self, color: Color, face: &Triangle) -> Color {
        if !self.settings.shadowing {
            return color;
        }
        let light = face
            .unit_normal()
            .map_or(1.0, |n| n.dot(SUN.normalize()).max(0.0));
        color.scaled(0.55 + 0.45 * light)
    }

    /// Fill `mesh` with the terrain of `chunk`.
    ///
    /// Produces exactly `2 * size²` triangles local to the chunk origin, sets
    /// `mesh.center` to that origin and `mesh.extra` to the packed coordinate.
    pub fn generate(&self, chunk: ChunkCoord, mesh: &mut Mesh) -> Result<(), TerrainError> {
        if !self.in_bounds(chunk) {
            return Err(TerrainError::OutOfBounds {
                coord: chunk,
                limit: self.settings.chunks,
            });
        }

        let n = self.settings.size as usize;
        let stride = n + 1;
        let res = self.settings.resolution;
        let origin = self.to_position(chunk);

        let columns: Vec<Column> = (0..stride * stride)
            .into_par_iter()
            .map(|i| {
                let (row, col) = (i / stride, i % stride);
                let world = Vec2::new(origin.x + col as f32 * res, origin.z + row as f32 * res);
                self.column_at(world)
            })
            .collect();

        let vertex = |row: usize, col: usize| {
            Vec3::new(col as f32 * res, columns[row * stride + col].height, row as f32 * res)
        };

        let mut faces = Vec::with_capacity(2 * n * n);
        for row in 0..n {
            for col in 0..n {
                let color = self.column_color(&columns[row * stride + col]);
                let (p00, p10) = (vertex(row, col), vertex(row, col + 1));
                let (p01, p11) = (vertex(row + 1, col), vertex(row + 1, col + 1));

                // Both triangles wind so their normals point up (+y).
                for face in [
                    Triangle::new(p00, p01, p10, color),
                    Triangle::new(p10, p01, p11, color),
                ] {
                    faces.push(Triangle {
                        color: self.shade(color, &face),
                        ..face
                    });
                }
            }
        }

        *mesh = Mesh {
            center: origin,
            faces,
            extra: chunk.pack(),
            ..Mesh::default()
        };
        Ok(())
    }

    /// Convenience wrapper around [`generate`](Self::generate).
    pub fn generate_chunk(&self, chunk: ChunkCoord) -> Result<Mesh, TerrainError> {
        let mut mesh = Mesh::default();
        self.generate(chunk, &mut mesh)?;
        Ok(mesh)
    }
}
