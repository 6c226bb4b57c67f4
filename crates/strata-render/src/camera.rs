//! First-person camera: position, yaw/pitch angles, and the derived basis.

use glam::Vec3;

/// Pitch limit in radians (89°); keeps `forward` away from the poles so the
/// basis never degenerates.
pub const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

/// A camera looking down `+z` in its own space, with `+y` up and `+x` right.
///
/// The basis vectors are derived from the two angles alone and recomputed
/// on every [`rotate`](Self::rotate).
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    rotation_xz: f32,
    rotation_yz: f32,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            rotation_xz: 0.0,
            rotation_yz: 0.0,
            right: Vec3::X,
            up: Vec3::Y,
            forward: Vec3::Z,
        };
        camera.update_basis();
        camera
    }

    /// Yaw in the XZ plane, radians.
    pub fn rotation_xz(&self) -> f32 {
        self.rotation_xz
    }

    /// Pitch in the YZ plane, radians. Positive looks up.
    pub fn rotation_yz(&self) -> f32 {
        self.rotation_yz
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Add to the yaw and pitch angles; pitch is clamped to `±MAX_PITCH`.
    pub fn rotate(&mut self, d_xz: f32, d_yz: f32) {
        if d_xz.is_finite() {
            self.rotation_xz = (self.rotation_xz + d_xz).rem_euclid(std::f32::consts::TAU);
        }
        if d_yz.is_finite() {
            self.rotation_yz = (self.rotation_yz + d_yz).clamp(-MAX_PITCH, MAX_PITCH);
        }
        self.update_basis();
    }

    /// Move by `local` expressed in the camera basis (x right, y up, z forward).
    pub fn translate(&mut self, local: Vec3) {
        self.position += self.right * local.x + self.up * local.y + self.forward * local.z;
    }

    /// Map a world point into camera space (x right, y up, z forward).
    pub fn to_view(&self, world: Vec3) -> Vec3 {
        let d = world - self.position;
        Vec3::new(d.dot(self.right), d.dot(self.up), d.dot(self.forward))
    }

    fn update_basis(&mut self) {
        let (sin_yaw, cos_yaw) = self.rotation_xz.sin_cos();
        let (sin_pitch, cos_pitch) = self.rotation_yz.sin_cos();
        self.forward = Vec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch);
        self.right = Vec3::new(cos_yaw, 0.0, -sin_yaw);
        self.up = self.forward.cross(self.right);
    }
}
