//! Wrapping N-dimensional lattice storage shared by the noise fields.
//!
//! A lattice with boundaries `b` stores `b[i] + 1` points along axis `i` in a
//! single contiguous buffer. The last point on every axis is a copy of the
//! first, so interpolation across the wrap seam is continuous: sample points
//! are wrapped onto `[0, b[i])` with `rem_euclid` and never need a modulo on
//! the upper corner.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::noise_field::NoiseError;

/// Upper bound on stored lattice points, across all axes.
pub const MAX_LATTICE_POINTS: usize = 1 << 24;

/// Owned, flattened lattice of per-point values.
#[derive(Clone, Debug, PartialEq)]
pub struct Lattice<const N: usize, T> {
    boundaries: [usize; N],
    strides: [usize; N],
    points: Vec<T>,
}

/// Row-major strides for the given per-axis extents, or `None` on overflow.
fn strides_for<const N: usize>(extents: [usize; N]) -> Option<([usize; N], usize)> {
    let mut strides = [0; N];
    let mut total = 1usize;
    for axis in 0..N {
        strides[axis] = total;
        total = total.checked_mul(extents[axis])?;
    }
    Some((strides, total))
}

impl<const N: usize, T: Copy> Lattice<N, T> {
    /// Build a lattice, drawing one value per distinct (wrapped) point from a
    /// ChaCha8 stream seeded with `seed`.
    ///
    /// Values are drawn in row-major order with axis 0 fastest, so the same
    /// `(seed, boundaries)` always yields the same lattice.
    pub fn generate(
        boundaries: [usize; N],
        seed: u64,
        mut draw: impl FnMut(&mut ChaCha8Rng) -> T,
    ) -> Result<Self, NoiseError> {
        if let Some(axis) = boundaries.iter().position(|&b| b == 0) {
            return Err(NoiseError::ZeroBoundary { axis });
        }

        let (period_strides, period_len) =
            strides_for(boundaries).ok_or(NoiseError::LatticeTooLarge { boundaries: boundaries.to_vec() })?;
        let (strides, len) = boundaries
            .iter()
            .map(|b| b.checked_add(1))
            .collect::<Option<Vec<_>>>()
            .and_then(|extents| strides_for::<N>(extents.try_into().ok()?))
            .filter(|&(_, len)| len <= MAX_LATTICE_POINTS)
            .ok_or(NoiseError::LatticeTooLarge { boundaries: boundaries.to_vec() })?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let period: Vec<T> = (0..period_len).map(|_| draw(&mut rng)).collect();

        let points = (0..len)
            .map(|flat| {
                let mut wrapped = 0;
                for axis in 0..N {
                    let coord = (flat / strides[axis]) % (boundaries[axis] + 1);
                    wrapped += (coord % boundaries[axis]) * period_strides[axis];
                }
                period[wrapped]
            })
            .collect();

        Ok(Self {
            boundaries,
            strides,
            points,
        })
    }

    pub fn boundaries(&self) -> [usize; N] {
        self.boundaries
    }

    /// Number of stored points, `prod(b[i] + 1)`.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value at an integer lattice index. Each component must be `<= boundaries[i]`.
    pub fn get(&self, index: [usize; N]) -> T {
        let flat: usize = index
            .iter()
            .zip(self.strides)
            .map(|(i, stride)| i * stride)
            .sum();
        self.points[flat]
    }

    /// Wrap `point` onto the lattice and split it into the containing cell's
    /// lower corner and the fractional offset within that cell.
    ///
    /// Returns `None` if any component is not finite.
    pub fn locate(&self, point: [f32; N]) -> Option<([usize; N], [f32; N])> {
        let mut cell = [0usize; N];
        let mut frac = [0f32; N];
        for axis in 0..N {
            let p = point[axis];
            if !p.is_finite() {
                return None;
            }
            let bound = self.boundaries[axis];
            let wrapped = p.rem_euclid(bound as f32);
            // rem_euclid can round up to exactly `bound` for tiny negative inputs.
            let lower = (wrapped.floor() as usize).min(bound - 1);
            cell[axis] = lower;
            frac[axis] = (wrapped - lower as f32).clamp(0.0, 1.0);
        }
        Some((cell, frac))
    }

    /// Smoothly interpolate corner contributions around `point`.
    ///
    /// `corner(value, offset)` receives the lattice value at a corner of the
    /// containing cell and the offset from that corner to the point; its
    /// results are blended with the quintic fade curve. Non-finite points
    /// yield `0.0`.
    pub fn interpolate(&self, point: [f32; N], corner: impl Fn(T, [f32; N]) -> f32) -> f32 {
        let Some((cell, frac)) = self.locate(point) else {
            return 0.0;
        };
        let faded = frac.map(fade);

        let mut total = 0.0;
        for mask in 0..(1usize << N) {
            let mut index = cell;
            let mut offset = frac;
            let mut weight = 1.0;
            for axis in 0..N {
                if mask & (1 << axis) != 0 {
                    index[axis] += 1;
                    offset[axis] -= 1.0;
                    weight *= faded[axis];
                } else {
                    weight *= 1.0 - faded[axis];
                }
            }
            if weight != 0.0 {
                total += weight * corner(self.get(index), offset);
            }
        }
        total
    }
}

/// Quintic smoothstep `6t^5 - 15t^4 + 10t^3`.
#[inline]
pub(crate) fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn scalar_lattice(boundaries: [usize; 2], seed: u64) -> Lattice<2, f32> {
        Lattice::generate(boundaries, seed, |rng| rng.random_range(-1.0..=1.0)).unwrap()
    }

    #[test]
    fn test_lattice_has_boundary_plus_one_points_per_axis() {
        let lattice = scalar_lattice([4, 7], 1);
        assert_eq!(lattice.len(), 5 * 8);
        assert_eq!(lattice.boundaries(), [4, 7]);
    }

    #[test]
    fn test_last_point_copies_first() {
        let lattice = scalar_lattice([4, 7], 9);
        for y in 0..=7 {
            assert_eq!(lattice.get([4, y]), lattice.get([0, y]), "seam at y={y}");
        }
        for x in 0..=4 {
            assert_eq!(lattice.get([x, 7]), lattice.get([x, 0]), "seam at x={x}");
        }
    }

    #[test]
    fn test_zero_boundary_rejected() {
        let result = Lattice::<3, f32>::generate([4, 0, 4], 0, |_| 0.0);
        assert!(matches!(result, Err(NoiseError::ZeroBoundary { axis: 1 })));
    }

    #[test]
    fn test_oversized_lattice_rejected() {
        let result = Lattice::<2, f32>::generate([usize::MAX, 2], 0, |_| 0.0);
        assert!(matches!(result, Err(NoiseError::LatticeTooLarge { .. })));
        let result = Lattice::<2, f32>::generate([1 << 13, 1 << 13], 0, |_| 0.0);
        assert!(matches!(result, Err(NoiseError::LatticeTooLarge { .. })));
    }

    #[test]
    fn test_locate_wraps_negative_points() {
        let lattice = scalar_lattice([8, 8], 0);
        let (cell, frac) = lattice.locate([-0.25, 9.5]).unwrap();
        assert_eq!(cell, [7, 1]);
        assert!((frac[0] - 0.75).abs() < 1e-6);
        assert!((frac[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_locate_tiny_negative_stays_in_range() {
        let lattice = scalar_lattice([8, 8], 0);
        let (cell, frac) = lattice.locate([-1e-9, 0.0]).unwrap();
        assert!(cell[0] <= 7);
        assert!((0.0..=1.0).contains(&frac[0]));
    }

    #[test]
    fn test_locate_rejects_non_finite() {
        let lattice = scalar_lattice([8, 8], 0);
        assert!(lattice.locate([f32::NAN, 0.0]).is_none());
        assert!(lattice.locate([0.0, f32::INFINITY]).is_none());
        assert_eq!(lattice.interpolate([f32::NAN, 0.0], |v, _| v), 0.0);
    }

    #[test]
    fn test_interpolate_hits_lattice_values_at_integer_points() {
        let lattice = scalar_lattice([8, 8], 5);
        let v = lattice.interpolate([3.0, 2.0], |value, _| value);
        assert!((v - lattice.get([3, 2])).abs() < 1e-6);
    }

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert!((fade(0.5) - 0.5).abs() < 1e-6);
    }
}
