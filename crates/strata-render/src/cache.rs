//! Chunk mesh cache keyed by chunk coordinate.

use hashbrown::HashMap;
use strata_mesh::Mesh;
use strata_terrain::ChunkCoord;

/// Generated terrain meshes currently kept around the camera.
#[derive(Clone, Debug, Default)]
pub struct ChunkCache {
    meshes: HashMap<ChunkCoord, Mesh>,
}

impl ChunkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.meshes.contains_key(&coord)
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&Mesh> {
        self.meshes.get(&coord)
    }

    /// Insert or replace the mesh for `coord`.
    pub fn insert(&mut self, coord: ChunkCoord, mesh: Mesh) -> Option<Mesh> {
        self.meshes.insert(coord, mesh)
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
    }

    /// Coordinates in the square window around `center` that have no mesh yet
    /// and pass `wanted`, in window order.
    pub fn missing(
        &self,
        center: ChunkCoord,
        radius: u32,
        wanted: impl Fn(ChunkCoord) -> bool,
    ) -> Vec<ChunkCoord> {
        center
            .square(radius)
            .filter(|&coord| !self.contains(coord) && wanted(coord))
            .collect()
    }

    /// Drop every chunk farther than `radius` (Chebyshev) from `center`.
    /// Returns how many were evicted.
    pub fn retain_within(&mut self, center: ChunkCoord, radius: u32) -> usize {
        let before = self.meshes.len();
        self.meshes
            .retain(|coord, _| coord.chebyshev_distance(center) <= u64::from(radius));
        before - self.meshes.len()
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.values()
    }

    pub fn meshes_mut(&mut self) -> impl Iterator<Item = &mut Mesh> {
        self.meshes.values_mut()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.values().map(Mesh::triangle_count).sum()
    }
}
