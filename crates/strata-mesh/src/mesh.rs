//! Triangle and mesh containers.
//!
//! Mesh triangles are stored local to the mesh center. The world-space
//! position of a point is `center + rotate(local)`, where the rotation is the
//! XZ (yaw) angle followed by the YZ (pitch) angle.

use glam::Vec3;

use crate::Color;

/// A colored triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub points: [Vec3; 3],
    pub color: Color,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3, color: Color) -> Self {
        Self {
            points: [a, b, c],
            color,
        }
    }

    /// Unnormalized face normal, `(p1 - p0) x (p2 - p0)`.
    ///
    /// Its length is twice the triangle area; a zero vector means the triangle
    /// is degenerate.
    pub fn normal(&self) -> Vec3 {
        let [a, b, c] = self.points;
        (b - a).cross(c - a)
    }

    /// Unit face normal, or `None` for a degenerate triangle.
    pub fn unit_normal(&self) -> Option<Vec3> {
        self.normal().try_normalize()
    }

    /// Arithmetic mean of the three points.
    pub fn centroid(&self) -> Vec3 {
        let [a, b, c] = self.points;
        (a + b + c) / 3.0
    }

    /// The same triangle with every point mapped through `f`.
    pub fn map(&self, mut f: impl FnMut(Vec3) -> Vec3) -> Self {
        let [a, b, c] = self.points;
        Self {
            points: [f(a), f(b), f(c)],
            color: self.color,
        }
    }
}

/// A renderable group of triangles positioned in the world.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    /// World-space origin the faces are relative to.
    pub center: Vec3,
    /// World units added to `center` per [`advance`](Self::advance).
    pub velocity: Vec3,
    /// `[xz, yz]` rotation angles in radians.
    pub rotation: [f32; 2],
    /// Faces in mesh-local coordinates.
    pub faces: Vec<Triangle>,
    /// Set by the renderer's visibility test each frame.
    pub visible: bool,
    /// Opaque tag; terrain chunks store their packed chunk coordinate here.
    pub extra: u128,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            velocity: Vec3::ZERO,
            rotation: [0.0; 2],
            faces: Vec::new(),
            visible: true,
            extra: 0,
        }
    }
}

impl Mesh {
    pub fn new(center: Vec3, faces: Vec<Triangle>) -> Self {
        Self {
            center,
            faces,
            ..Self::default()
        }
    }

    /// Rotate a mesh-local point by the mesh rotation (no translation).
    pub fn rotate_local(&self, point: Vec3) -> Vec3 {
        let [xz, yz] = self.rotation;
        if xz == 0.0 && yz == 0.0 {
            return point;
        }
        let (sin_xz, cos_xz) = xz.sin_cos();
        let (sin_yz, cos_yz) = yz.sin_cos();

        // Pitch in the YZ plane, then yaw in the XZ plane.
        let y = point.y * cos_yz - point.z * sin_yz;
        let z = point.y * sin_yz + point.z * cos_yz;
        let x = point.x * cos_xz + z * sin_xz;
        let z = -point.x * sin_xz + z * cos_xz;
        Vec3::new(x, y, z)
    }

    /// Map a mesh-local point to world space.
    pub fn to_world(&self, point: Vec3) -> Vec3 {
        self.center + self.rotate_local(point)
    }

    /// Iterate over the faces in world space.
    pub fn world_faces(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|face| face.map(|p| self.to_world(p)))
    }

    /// Radius of the smallest origin-centred sphere containing every local point.
    ///
    /// Rotation does not change it, so it bounds the mesh around `center`.
    pub fn bounding_radius(&self) -> f32 {
        self.faces
            .iter()
            .flat_map(|face| face.points)
            .map(Vec3::length)
            .fold(0.0, f32::max)
    }

    /// Move `center` by one step of `velocity`.
    pub fn advance(&mut self) {
        self.center += self.velocity;
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn unit_triangle() -> Triangle {
        Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Z, Color::WHITE)
    }

    #[test]
    fn test_normal_from_two_edges() {
        // X cross Z = -Y
        let n = unit_triangle().normal();
        assert!((n - Vec3::NEG_Y).length() < 1e-6, "got {n}");
    }

    #[test]
    fn test_degenerate_triangle_has_no_unit_normal() {
        let t = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0, Color::WHITE);
        assert!(t.unit_normal().is_none());
    }

    #[test]
    fn test_world_position_is_center_plus_local() {
        let mesh = Mesh::new(Vec3::new(10.0, 2.0, -4.0), vec![unit_triangle()]);
        let world: Vec<_> = mesh.world_faces().collect();
        assert_eq!(world[0].points[1], Vec3::new(11.0, 2.0, -4.0));
        // Local storage is untouched.
        assert_eq!(mesh.faces[0].points[1], Vec3::X);
    }

    #[test]
    fn test_yaw_quarter_turn() {
        let mesh = Mesh {
            rotation: [FRAC_PI_2, 0.0],
            ..Mesh::default()
        };
        let p = mesh.rotate_local(Vec3::X);
        assert!((p - Vec3::NEG_Z).length() < 1e-5, "got {p}");
    }

    #[test]
    fn test_rotation_preserves_length() {
        let mesh = Mesh {
            rotation: [0.7, -1.2],
            ..Mesh::default()
        };
        let p = Vec3::new(3.0, -2.0, 5.0);
        assert!((mesh.rotate_local(p).length() - p.length()).abs() < 1e-4);
    }

    #[test]
    fn test_bounding_radius() {
        let mesh = Mesh::new(
            Vec3::splat(100.0),
            vec![Triangle::new(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0), Vec3::X, Color::WHITE)],
        );
        assert!((mesh.bounding_radius() - 5.0).abs() < 1e-6);
        assert_eq!(Mesh::default().bounding_radius(), 0.0);
    }

    #[test]
    fn test_advance_applies_velocity() {
        let mut mesh = Mesh {
            velocity: Vec3::new(1.0, 0.0, -0.5),
            ..Mesh::default()
        };
        mesh.advance();
        mesh.advance();
        assert_eq!(mesh.center, Vec3::new(2.0, 0.0, -1.0));
    }

    #[test]
    fn test_clone_is_equal_value() {
        let mesh = Mesh {
            extra: 42,
            ..Mesh::new(Vec3::ONE, vec![unit_triangle(); 3])
        };
        let copy = mesh.clone();
        assert_eq!(mesh, copy);
        assert_eq!(copy.triangle_count(), 3);
    }
}
