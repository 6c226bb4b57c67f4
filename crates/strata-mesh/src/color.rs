//! 8-bit RGBA color used by triangles and the frame buffer.

/// An 8-bit-per-channel RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const LAWN_GREEN: Self = Self::rgb(124, 252, 0);
    pub const SKY_BLUE: Self = Self::rgb(135, 206, 235);
    pub const DEEP_WATER: Self = Self::rgb(28, 72, 140);
    pub const SAND: Self = Self::rgb(222, 204, 142);
    pub const ROCK: Self = Self::rgb(120, 116, 110);
    pub const SNOW: Self = Self::rgb(245, 248, 252);

    /// Opaque color from red, green, and blue.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Opaque color from an `[r, g, b]` triple, the form stored in config files.
    pub const fn from_array(rgb: [u8; 3]) -> Self {
        Self::rgb(rgb[0], rgb[1], rgb[2])
    }

    /// `[r, g, b, a]` bytes, the layout written to image files.
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Multiply the RGB channels by `factor`, saturating at 0 and 255. Alpha is kept.
    pub fn scaled(self, factor: f32) -> Self {
        let channel = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
        Self {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
            a: self.a,
        }
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

/// Map a normalized height onto a terrain color ramp.
///
/// `t` is height relative to the terrain base divided by its vertical span:
/// below `-0.2` is water, up to `0` is sand, up to `0.5` blends from `ground`
/// towards rock, up to `0.8` is rock, and above that fades into snow.
pub fn height_ramp(t: f32, ground: Color) -> Color {
    if !t.is_finite() {
        return ground;
    }
    if t < -0.2 {
        Color::DEEP_WATER
    } else if t < 0.0 {
        Color::SAND.lerp(ground, (t + 0.2) / 0.2)
    } else if t < 0.5 {
        ground.lerp(Color::ROCK, t / 0.5)
    } else if t < 0.8 {
        Color::ROCK
    } else {
        Color::ROCK.lerp(Color::SNOW, (t - 0.8) / 0.2)
    }
}

impl From<[u8; 3]> for Color {
    fn from(rgb: [u8; 3]) -> Self {
        Self::from_array(rgb)
    }
}
