//! Per-triangle shading: height ramp, height shading, and directional lights.

use glam::Vec3;
use strata_config::{RenderSettings, TerrainSettings};
use strata_mesh::{Color, Triangle, height_ramp};

/// An infinitely distant light.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    /// Unit direction the light travels in (from the light toward the surface).
    pub direction: Vec3,
    /// Linear RGB color, not premultiplied by intensity.
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.4, -1.0, -0.3).normalize(),
            color: Vec3::new(1.0, 0.96, 0.90),
            intensity: 0.8,
        }
    }
}

impl Light {
    /// A light travelling along `direction`; a zero vector points straight down.
    pub fn new(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.try_normalize().unwrap_or(Vec3::NEG_Y),
            color,
            intensity,
        }
    }

    /// Lambert term for a surface with unit normal `normal`. Faces are two-sided.
    pub fn lambert(&self, normal: Vec3) -> f32 {
        normal.dot(-self.direction).abs() * self.intensity
    }
}

/// The shading toggles and the terrain parameters the height effects need.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadeOptions {
    pub color_by_height: bool,
    pub shading: bool,
    pub use_lighting: bool,
    pub base: f32,
    pub stretch: f32,
    pub ground: Color,
    pub ambient: f32,
}

impl ShadeOptions {
    pub fn new(render: &RenderSettings, terrain: &TerrainSettings) -> Self {
        Self {
            color_by_height: render.color_by_height,
            shading: render.shading,
            use_lighting: render.use_lighting,
            base: terrain.base,
            stretch: terrain.stretch,
            ground: Color::from_array(terrain.color),
            ambient: 0.35,
        }
    }

    /// Height relative to the terrain base, in units of two stretches.
    fn relative_height(&self, y: f32) -> f32 {
        (y - self.base) / (self.stretch * 2.0)
    }
}

/// Computes the final color of a world-space triangle.
pub trait Shader: Send + Sync {
    fn shade(&self, face: &Triangle, lights: &[Light], options: &ShadeOptions) -> Color;
}

/// Height ramp, height-based brightness, and ambient plus Lambert lighting,
/// each behind its toggle in [`ShadeOptions`].
#[derive(Clone, Copy, Debug, Default)]
pub struct HeightShader;

impl Shader for HeightShader {
    fn shade(&self, face: &Triangle, lights: &[Light], options: &ShadeOptions) -> Color {
        let height = face.centroid().y;
        let mut color = face.color;

        if options.color_by_height {
            color = height_ramp(options.relative_height(height), options.ground);
        }
        if options.shading {
            let t = options.relative_height(height);
            color = color.scaled((1.0 + 0.5 * t).clamp(0.5, 1.5));
        }
        if options.use_lighting {
            let normal = face.unit_normal().unwrap_or(Vec3::Y);
            let light = lights.iter().fold(Vec3::splat(options.ambient), |sum, light| {
                sum + light.color * light.lambert(normal)
            });
            color = tint(color, light);
        }
        color
    }
}

/// Multiply each channel by the matching component of `light`, saturating.
fn tint(color: Color, light: Vec3) -> Color {
    let channel = |c: u8, f: f32| (c as f32 * f.max(0.0)).round().min(255.0) as u8;
    Color {
        r: channel(color.r, light.x),
        g: channel(color.g, light.y),
        b: channel(color.b, light.z),
        a: color.a,
    }
}
