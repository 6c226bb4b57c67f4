//! Deterministic lattice noise fields.
//!
//! [`NoiseField`] is the sampling surface every terrain layer talks to.
//! [`Perlin`] (gradient noise) and [`ValueNoise`] are the two lattice-backed
//! implementations. Both wrap sample points around their lattice boundaries,
//! so any finite point is valid input and the field tiles seamlessly.
//!
//! Both also implement [`noise::NoiseFn`], so they compose with the `noise`
//! crate's modifiers and combiners.

use noise::NoiseFn;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::lattice::Lattice;

/// Errors raised while (re)allocating a noise lattice.
///
/// A failed operation leaves the field exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoiseError {
    /// Every axis needs at least one cell.
    #[error("lattice boundary on axis {axis} is zero")]
    ZeroBoundary { axis: usize },

    /// The lattice would not fit in memory (or in `usize`).
    #[error("lattice with boundaries {boundaries:?} exceeds the point budget")]
    LatticeTooLarge { boundaries: Vec<usize> },
}

/// A deterministic, smooth scalar field over `N` dimensions.
///
/// For a fixed seed, boundaries, and point, [`sample`](Self::sample) always
/// returns the same value in `[-1, 1]`.
pub trait NoiseField<const N: usize>: Send + Sync {
    /// Sample the field. Non-finite points yield `0.0`.
    fn sample(&self, point: [f32; N]) -> f32;

    /// Reallocate the lattice for new boundaries and regenerate it from the
    /// current seed.
    fn resize(&mut self, boundaries: [usize; N]) -> Result<(), NoiseError>;

    /// Redraw the lattice from `seed`, keeping its size.
    fn regenerate(&mut self, seed: u64);

    fn seed(&self) -> u64;

    fn boundaries(&self) -> [usize; N];
}

/// Classic gradient noise with quintic fade.
#[derive(Clone, Debug, PartialEq)]
pub struct Perlin<const N: usize> {
    seed: u64,
    gradients: Lattice<N, [f32; N]>,
}

/// A random unit vector, drawn by rejection so directions are uniform.
fn random_unit<const N: usize>(rng: &mut ChaCha8Rng) -> [f32; N] {
    loop {
        let v: [f32; N] = std::array::from_fn(|_| rng.random_range(-1.0..=1.0));
        let len_sq: f32 = v.iter().map(|c| c * c).sum();
        if len_sq > 1e-4 && len_sq <= 1.0 {
            let len = len_sq.sqrt();
            return v.map(|c| c / len);
        }
    }
}

impl<const N: usize> Perlin<N> {
    /// Allocate a lattice of `boundaries + 1` gradients per axis derived from `seed`.
    pub fn new(seed: u64, boundaries: [usize; N]) -> Result<Self, NoiseError> {
        Ok(Self {
            seed,
            gradients: Lattice::generate(boundaries, seed, random_unit::<N>)?,
        })
    }

    /// Peak magnitude of raw N-dimensional gradient noise is `sqrt(N) / 2`.
    fn normalization() -> f32 {
        2.0 / (N as f32).sqrt()
    }
}

impl<const N: usize> NoiseField<N> for Perlin<N> {
    fn sample(&self, point: [f32; N]) -> f32 {
        let raw = self.gradients.interpolate(point, |gradient, offset| {
            gradient.iter().zip(offset).map(|(g, o)| g * o).sum()
        });
        (raw * Self::normalization()).clamp(-1.0, 1.0)
    }

    fn resize(&mut self, boundaries: [usize; N]) -> Result<(), NoiseError> {
        self.gradients = Lattice::generate(boundaries, self.seed, random_unit::<N>)?;
        Ok(())
    }

    fn regenerate(&mut self, seed: u64) {
        let boundaries = self.gradients.boundaries();
        // Boundaries were validated when this lattice was first built.
        if let Ok(gradients) = Lattice::generate(boundaries, seed, random_unit::<N>) {
            self.seed = seed;
            self.gradients = gradients;
        }
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn boundaries(&self) -> [usize; N] {
        self.gradients.boundaries()
    }
}

/// Value noise: a random scalar per lattice point, smoothly interpolated.
///
/// Blockier than [`Perlin`]; useful for coarse masks such as biome regions.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueNoise<const N: usize> {
    seed: u64,
    values: Lattice<N, f32>,
}

fn random_scalar(rng: &mut ChaCha8Rng) -> f32 {
    rng.random_range(-1.0..=1.0)
}

impl<const N: usize> ValueNoise<N> {
    pub fn new(seed: u64, boundaries: [usize; N]) -> Result<Self, NoiseError> {
        Ok(Self {
            seed,
            values: Lattice::generate(boundaries, seed, random_scalar)?,
        })
    }
}

impl<const N: usize> NoiseField<N> for ValueNoise<N> {
    fn sample(&self, point: [f32; N]) -> f32 {
        self.values
            .interpolate(point, |value, _| value)
            .clamp(-1.0, 1.0)
    }

    fn resize(&mut self, boundaries: [usize; N]) -> Result<(), NoiseError> {
        self.values = Lattice::generate(boundaries, self.seed, random_scalar)?;
        Ok(())
    }

    fn regenerate(&mut self, seed: u64) {
        let boundaries = self.values.boundaries();
        if let Ok(values) = Lattice::generate(boundaries, seed, random_scalar) {
            self.seed = seed;
            self.values = values;
        }
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn boundaries(&self) -> [usize; N] {
        self.values.boundaries()
    }
}

impl<const N: usize> NoiseFn<f64, N> for Perlin<N> {
    fn get(&self, point: [f64; N]) -> f64 {
        self.sample(point.map(|c| c as f32)) as f64
    }
}

impl<const N: usize> NoiseFn<f64, N> for ValueNoise<N> {
    fn get(&self, point: [f64; N]) -> f64 {
        self.sample(point.map(|c| c as f32)) as f64
    }
}
