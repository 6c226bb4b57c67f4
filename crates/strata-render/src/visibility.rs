//! Per-mesh visibility tests run before projection.

use strata_mesh::Mesh;

use crate::camera::Camera;

/// Decides whether a mesh is worth projecting this frame.
pub trait VisibilityTest: Send {
    fn is_visible(&self, mesh: &Mesh, camera: &Camera) -> bool;
}

/// Bounding-sphere culling by distance and by the plane behind the camera.
///
/// Conservative: a mesh is only rejected when its whole bounding sphere is
/// farther than `max_distance` or behind the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceCulling {
    pub max_distance: f32,
}

impl DistanceCulling {
    pub fn new(max_distance: f32) -> Self {
        Self { max_distance }
    }

    /// Cull beyond `render_distance + 1` chunks of edge length `chunk_extent`.
    pub fn for_render_distance(render_distance: u32, chunk_extent: f32) -> Self {
        Self::new((render_distance as f32 + 1.0) * chunk_extent)
    }
}

impl VisibilityTest for DistanceCulling {
    fn is_visible(&self, mesh: &Mesh, camera: &Camera) -> bool {
        // Rotation keeps local lengths, so the sphere around `center` bounds
        // the mesh in any orientation.
        let radius = mesh.bounding_radius();
        let offset = mesh.center - camera.position;
        if offset.length() - radius > self.max_distance {
            return false;
        }
        offset.dot(camera.forward()) >= -radius
    }
}
