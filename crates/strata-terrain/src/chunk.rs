//! Chunk addressing: integer chunk coordinates and their mapping to world space.

use std::fmt;

use glam::Vec3;

/// Integer coordinate of a square terrain chunk on the XZ plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChunkCoord {
    pub x: i64,
    pub z: i64,
}

impl ChunkCoord {
    pub const fn new(x: i64, z: i64) -> Self {
        Self { x, z }
    }

    /// `self + (dx, dz)`, or `None` if either component overflows.
    pub fn checked_offset(self, dx: i64, dz: i64) -> Option<Self> {
        Some(Self::new(self.x.checked_add(dx)?, self.z.checked_add(dz)?))
    }

    /// Chebyshev (square-ring) distance between two chunks.
    pub fn chebyshev_distance(self, other: Self) -> u64 {
        let dx = (self.x as i128 - other.x as i128).unsigned_abs();
        let dz = (self.z as i128 - other.z as i128).unsigned_abs();
        dx.max(dz).min(u64::MAX as u128) as u64
    }

    /// Every coordinate within Chebyshev `radius` of `self`, row-major along z.
    ///
    /// Neighbours whose coordinates would overflow `i64` are left out.
    pub fn square(self, radius: u32) -> impl Iterator<Item = Self> {
        let r = radius as i64;
        (-r..=r).flat_map(move |dz| (-r..=r).filter_map(move |dx| self.checked_offset(dx, dz)))
    }

    /// Lossless packing into the `u128` mesh tag.
    pub const fn pack(self) -> u128 {
        ((self.x as u64 as u128) << 64) | (self.z as u64 as u128)
    }

    /// Inverse of [`pack`](Self::pack).
    pub const fn unpack(tag: u128) -> Self {
        Self::new((tag >> 64) as u64 as i64, tag as u64 as i64)
    }

    /// World-space origin of this chunk for the given chunk edge length.
    ///
    /// Computed in `f64` and rounded once, so [`from_position`](Self::from_position)
    /// can invert it exactly.
    pub fn to_position(self, extent: f32) -> Vec3 {
        Vec3::new(axis_origin(self.x, extent), 0.0, axis_origin(self.z, extent))
    }

    /// Chunk containing `position` (`floor(p / extent)` on x and z).
    ///
    /// Returns `None` for non-finite input, a non-positive extent, or positions
    /// whose chunk index does not fit in `i64`.
    pub fn from_position(position: Vec3, extent: f32) -> Option<Self> {
        if !(extent.is_finite() && extent > 0.0) {
            return None;
        }
        Some(Self::new(
            axis_chunk(position.x, extent)?,
            axis_chunk(position.z, extent)?,
        ))
    }
}

/// Chunk indices beyond this magnitude are rejected; keeps `index + 1` and the
/// `f64` products well inside their ranges.
const MAX_INDEX: f64 = (1u64 << 53) as f64;

fn axis_origin(index: i64, extent: f32) -> f32 {
    (index as f64 * extent as f64) as f32
}

fn axis_chunk(p: f32, extent: f32) -> Option<i64> {
    if !p.is_finite() {
        return None;
    }
    let estimate = (p as f64 / extent as f64).floor();
    if estimate.abs() > MAX_INDEX {
        return None;
    }
    let mut index = estimate as i64;
    // Correct for rounding so that axis_origin(index) <= p < axis_origin(index + 1).
    if axis_origin(index, extent) > p {
        index -= 1;
    } else if axis_origin(index + 1, extent) <= p {
        index += 1;
    }
    Some(index)
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_at_160_maps_to_chunk_10() {
        let coord = ChunkCoord::from_position(Vec3::new(160.0, 37.0, 0.0), 16.0).unwrap();
        assert_eq!(coord, ChunkCoord::new(10, 0));
        assert_eq!(coord.to_position(16.0), Vec3::new(160.0, 0.0, 0.0));
    }

    #[test]
    fn test_negative_positions_floor() {
        let coord = ChunkCoord::from_position(Vec3::new(-0.5, 0.0, -16.0), 16.0).unwrap();
        assert_eq!(coord, ChunkCoord::new(-1, -1));
        let coord = ChunkCoord::from_position(Vec3::new(-16.5, 0.0, 15.99), 16.0).unwrap();
        assert_eq!(coord, ChunkCoord::new(-2, 0));
    }

    #[test]
    fn test_round_trip_with_inexact_extent() {
        // 0.1 * 16 is not representable in binary floating point.
        let extent = 16.0 * 0.1_f32;
        for x in -3000..=3000 {
            let c = ChunkCoord::new(x, -x / 2);
            let back = ChunkCoord::from_position(c.to_position(extent), extent);
            assert_eq!(back, Some(c), "round trip failed for {c}");
        }
    }

    #[test]
    fn test_from_position_rejects_bad_input() {
        assert_eq!(ChunkCoord::from_position(Vec3::new(f32::NAN, 0.0, 0.0), 16.0), None);
        assert_eq!(ChunkCoord::from_position(Vec3::ZERO, 0.0), None);
        assert_eq!(ChunkCoord::from_position(Vec3::new(f32::MAX, 0.0, 0.0), 1e-30), None);
    }

    #[test]
    fn test_pack_round_trip_extremes() {
        for c in [
            ChunkCoord::new(0, 0),
            ChunkCoord::new(-1, 1),
            ChunkCoord::new(i64::MIN, i64::MAX),
            ChunkCoord::new(123_456_789, -987_654_321),
        ] {
            assert_eq!(ChunkCoord::unpack(c.pack()), c);
        }
        assert_ne!(ChunkCoord::new(1, 0).pack(), ChunkCoord::new(0, 1).pack());
    }

    #[test]
    fn test_checked_offset_overflow() {
        assert_eq!(ChunkCoord::new(i64::MAX, 0).checked_offset(1, 0), None);
        assert_eq!(
            ChunkCoord::new(5, 5).checked_offset(-2, 3),
            Some(ChunkCoord::new(3, 8))
        );
    }

    #[test]
    fn test_square_window() {
        let window: Vec<_> = ChunkCoord::new(0, 0).square(2).collect();
        assert_eq!(window.len(), 25);
        assert!(window.iter().all(|c| c.chebyshev_distance(ChunkCoord::default()) <= 2));
        assert_eq!(window[0], ChunkCoord::new(-2, -2));
        assert_eq!(window[1], ChunkCoord::new(-1, -2));
    }

    #[test]
    fn test_square_window_at_i64_edge_skips_overflow() {
        let window: Vec<_> = ChunkCoord::new(i64::MAX, 0).square(1).collect();
        assert_eq!(window.len(), 6);
    }

    #[test]
    fn test_chebyshev_distance_extremes() {
        let d = ChunkCoord::new(i64::MIN, 0).chebyshev_distance(ChunkCoord::new(i64::MAX, 0));
        assert_eq!(d, u64::MAX);
    }
}
