//! Biome rules and the stock biome set.
//!
//! A [`Biome`] pairs an applicability predicate with a mutator over the
//! working [`Column`]. The terraformer runs every registered biome in order
//! for every column; a column can be shaped by several biomes, and each one
//! sees the height left behind by those before it.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use glam::Vec2;
use strata_mesh::Color;

use crate::noise_field::{NoiseError, NoiseField, Perlin, ValueNoise};

/// Working state of one terrain column while biomes are applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Column {
    /// Current elevation.
    pub height: f32,
    /// Current surface color.
    pub color: Color,
    /// Terrain base elevation (read-only context).
    pub base: f32,
    /// Edge blend strength from the terrain settings (read-only context).
    pub blend: f32,
}

impl Column {
    /// Weight in `[0, 1]` for a signal that passed `threshold` by `excess`,
    /// ramped up by the blend strength so biome edges fade in.
    pub fn edge_weight(&self, excess: f32) -> f32 {
        (excess * self.blend.max(0.0)).clamp(0.0, 1.0)
    }
}

/// Predicate deciding whether a biome touches the column at a world position.
pub type AppliesFn = dyn Fn(Vec2, &dyn NoiseField<2>) -> bool + Send + Sync;

/// Mutator adjusting a column the biome applies to.
pub type PlaceFn = dyn Fn(Vec2, &dyn NoiseField<2>, &mut Column) + Send + Sync;

/// A named terrain rule with its own private noise field.
pub struct Biome {
    name: String,
    color: Color,
    noise: Box<dyn NoiseField<2>>,
    applies: Box<AppliesFn>,
    place: Box<PlaceFn>,
}

impl Biome {
    /// A biome that applies nowhere until [`applies_when`](Self::applies_when)
    /// and [`places`](Self::places) are set.
    pub fn new(name: impl Into<String>, color: Color, noise: impl NoiseField<2> + 'static) -> Self {
        Self {
            name: name.into(),
            color,
            noise: Box::new(noise),
            applies: Box::new(|_, _| false),
            place: Box::new(|_, _, _| {}),
        }
    }

    pub fn applies_when(
        mut self,
        predicate: impl Fn(Vec2, &dyn NoiseField<2>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.applies = Box::new(predicate);
        self
    }

    pub fn places(
        mut self,
        mutator: impl Fn(Vec2, &dyn NoiseField<2>, &mut Column) + Send + Sync + 'static,
    ) -> Self {
        self.place = Box::new(mutator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn noise(&self) -> &dyn NoiseField<2> {
        self.noise.as_ref()
    }

    pub fn applies(&self, position: Vec2) -> bool {
        (self.applies)(position, self.noise.as_ref())
    }

    pub fn place(&self, position: Vec2, column: &mut Column) {
        (self.place)(position, self.noise.as_ref(), column);
    }

    /// Reseed the biome's private field.
    pub fn regenerate(&mut self, seed: u64) {
        self.noise.regenerate(seed);
    }
}

impl fmt::Debug for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Biome")
            .field("name", &self.name)
            .field("color", &self.color)
            .field("seed", &self.noise.seed())
            .finish_non_exhaustive()
    }
}

/// Derive a sub-seed from the world seed and a salt (e.g. a biome's index).
pub fn derive_seed(world_seed: u64, salt: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    world_seed.hash(&mut hasher);
    salt.hash(&mut hasher);
    hasher.finish()
}

const BIOME_LATTICE: [usize; 2] = [64, 64];

/// Sample a biome field at a world position scaled down by `wavelength`.
fn at(noise: &dyn NoiseField<2>, position: Vec2, wavelength: f32) -> f32 {
    noise.sample([position.x / wavelength, position.y / wavelength])
}

/// The five stock biomes, in registration order: ocean, plains, hills,
/// mountains, snow caps.
///
/// Biome `i` is seeded with `derive_seed(seed, i)`.
pub fn default_biomes(seed: u64) -> Result<Vec<Biome>, NoiseError> {
    let field = |index: u64| Perlin::new(derive_seed(seed, index), BIOME_LATTICE);

    let ocean = Biome::new("ocean", Color::DEEP_WATER, ValueNoise::new(derive_seed(seed, 0), BIOME_LATTICE)?)
        .applies_when(|p, noise| at(noise, p, 400.0) < -0.25)
        .places(|p, noise, column| {
            let w = column.edge_weight(-0.25 - at(noise, p, 400.0));
            let sea_floor = column.base - 4.0 + (column.height - column.base) * 0.2;
            column.height += (sea_floor - column.height) * w;
            column.color = column.color.lerp(Color::DEEP_WATER, w);
        });

    let plains = Biome::new("plains", Color::LAWN_GREEN, field(1)?)
        .applies_when(|p, noise| at(noise, p, 300.0) < 0.1)
        .places(|p, noise, column| {
            let w = column.edge_weight(0.1 - at(noise, p, 300.0));
            let flattened = column.base + (column.height - column.base) * 0.5;
            column.height += (flattened - column.height) * w;
        });

    let hills = Biome::new("hills", Color::rgb(96, 160, 60), field(2)?)
        .applies_when(|p, noise| at(noise, p, 150.0) > 0.0)
        .places(|p, noise, column| {
            let n = at(noise, p, 150.0);
            let detail = at(noise, p, 20.0);
            column.height += column.edge_weight(n) * (4.0 + 2.0 * detail);
        });

    let mountains = Biome::new("mountains", Color::ROCK, field(3)?)
        .applies_when(|p, noise| at(noise, p, 500.0) > 0.3)
        .places(|p, noise, column| {
            let w = column.edge_weight(at(noise, p, 500.0) - 0.3);
            let ridge = 1.0 - at(noise, p, 60.0).abs();
            column.height += w * 30.0 * (0.6 + 0.4 * ridge);
            column.color = column.color.lerp(Color::ROCK, w);
        });

    let snow = Biome::new("snow caps", Color::SNOW, field(4)?)
        .applies_when(|_, _| true)
        .places(|p, noise, column| {
            let snow_line = column.base + 25.0 + 4.0 * at(noise, p, 40.0);
            if column.height > snow_line {
                let w = column.edge_weight((column.height - snow_line) / 4.0);
                column.color = column.color.lerp(Color::SNOW, w);
            }
        });

    Ok(vec![ocean, plains, hills, mountains, snow])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> Column {
        Column {
            height: 0.0,
            color: Color::LAWN_GREEN,
            base: -5.0,
            blend: 3.0,
        }
    }

    #[test]
    fn test_new_biome_applies_nowhere() {
        let biome = Biome::new("empty", Color::WHITE, Perlin::new(0, [8, 8]).unwrap());
        assert!(!biome.applies(Vec2::new(3.0, 4.0)));
        let mut c = column();
        biome.place(Vec2::ZERO, &mut c);
        assert_eq!(c, column());
    }

    #[test]
    fn test_predicate_and_mutator_see_private_noise() {
        let biome = Biome::new("probe", Color::WHITE, Perlin::new(9, [8, 8]).unwrap())
            .applies_when(|p, noise| noise.seed() == 9 && p.x > 0.0)
            .places(|_, noise, column| column.height = noise.boundaries()[0] as f32);
        assert!(biome.applies(Vec2::new(1.0, 0.0)));
        assert!(!biome.applies(Vec2::new(-1.0, 0.0)));
        let mut c = column();
        biome.place(Vec2::ZERO, &mut c);
        assert_eq!(c.height, 8.0);
    }

    #[test]
    fn test_regenerate_reseeds_private_field() {
        let mut biome = Biome::new("b", Color::WHITE, ValueNoise::new(1, [8, 8]).unwrap());
        biome.regenerate(2);
        assert_eq!(biome.noise().seed(), 2);
    }

    #[test]
    fn test_edge_weight_ramps_with_blend() {
        let c = column();
        assert_eq!(c.edge_weight(-1.0), 0.0);
        assert!((c.edge_weight(0.1) - 0.3).abs() < 1e-6);
        assert_eq!(c.edge_weight(10.0), 1.0);
    }

    #[test]
    fn test_default_biomes_registration_order() {
        let biomes = default_biomes(0).unwrap();
        let names: Vec<_> = biomes.iter().map(Biome::name).collect();
        assert_eq!(names, ["ocean", "plains", "hills", "mountains", "snow caps"]);
    }

    #[test]
    fn test_default_biomes_seeded_per_index() {
        let biomes = default_biomes(17).unwrap();
        for (i, biome) in biomes.iter().enumerate() {
            assert_eq!(biome.noise().seed(), derive_seed(17, i as u64));
        }
    }

    #[test]
    fn test_derive_seed_deterministic_and_salted() {
        assert_eq!(derive_seed(5, 1), derive_seed(5, 1));
        assert_ne!(derive_seed(5, 1), derive_seed(5, 2));
        assert_ne!(derive_seed(5, 1), derive_seed(6, 1));
    }

    #[test]
    fn test_snow_only_above_snow_line() {
        let biomes = default_biomes(3).unwrap();
        let snow = &biomes[4];
        let mut low = column();
        snow.place(Vec2::new(10.0, 10.0), &mut low);
        assert_eq!(low.color, Color::LAWN_GREEN);

        let mut high = Column {
            height: 100.0,
            ..column()
        };
        snow.place(Vec2::new(10.0, 10.0), &mut high);
        assert_eq!(high.color, Color::SNOW);
    }

    #[test]
    fn test_debug_omits_closures() {
        let biome = Biome::new("dbg", Color::WHITE, Perlin::new(4, [8, 8]).unwrap());
        let text = format!("{biome:?}");
        assert!(text.contains("dbg"));
        assert!(text.contains("seed: 4"));
    }
}
