//! Near-plane clipping, perspective projection, and band-parallel rasterization.

use glam::{Vec2, Vec3};
use rayon::prelude::*;
use strata_mesh::Color;

use crate::frame::{Band, FrameBuffer};

/// Camera-space depth of the near clip plane.
pub const NEAR_PLANE: f32 = 0.1;

/// A projected triangle: `x`/`y` in pixels, `z` the camera-space depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenTriangle {
    pub points: [Vec3; 3],
    pub color: Color,
}

impl ScreenTriangle {
    fn y_range(&self) -> (f32, f32) {
        let ys = self.points.map(|p| p.y);
        (ys[0].min(ys[1]).min(ys[2]), ys[0].max(ys[1]).max(ys[2]))
    }
}

/// Pinhole projection for a given vertical field of view and buffer size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projector {
    focal: f32,
    center: Vec2,
}

impl Projector {
    pub fn new(field_of_view_deg: f32, width: usize, height: usize) -> Self {
        let half_fov = field_of_view_deg.to_radians() * 0.5;
        Self {
            focal: height as f32 * 0.5 / half_fov.tan(),
            center: Vec2::new(width as f32 * 0.5, height as f32 * 0.5),
        }
    }

    /// Project a camera-space point with `z >= NEAR_PLANE`. Screen `y` grows downward.
    pub fn project(&self, view: Vec3) -> Vec3 {
        let scale = self.focal / view.z;
        Vec3::new(
            self.center.x + view.x * scale,
            self.center.y - view.y * scale,
            view.z,
        )
    }

    /// Project a clipped camera-space triangle.
    pub fn project_triangle(&self, points: [Vec3; 3], color: Color) -> ScreenTriangle {
        ScreenTriangle {
            points: points.map(|p| self.project(p)),
            color,
        }
    }
}

/// Clip a camera-space triangle against `z = NEAR_PLANE`.
///
/// Yields zero, one, or two triangles that lie entirely in front of the plane
/// and keep the input winding.
pub fn clip_near(points: [Vec3; 3]) -> impl Iterator<Item = [Vec3; 3]> {
    let inside = points.map(|p| p.z >= NEAR_PLANE);
    let count = inside.iter().filter(|&&i| i).count();

    let cut = |a: Vec3, b: Vec3| {
        let t = (NEAR_PLANE - a.z) / (b.z - a.z);
        let mut p = a.lerp(b, t);
        p.z = NEAR_PLANE;
        p
    };

    let out: [Option<[Vec3; 3]>; 2] = match count {
        3 => [Some(points), None],
        0 => [None, None],
        1 => {
            // Rotate so the lone inside vertex comes first; winding is kept.
            let i = inside.iter().position(|&v| v).unwrap_or(0);
            let (a, b, c) = (points[i], points[(i + 1) % 3], points[(i + 2) % 3]);
            [Some([a, cut(a, b), cut(a, c)]), None]
        }
        _ => {
            let i = inside.iter().position(|&v| !v).unwrap_or(0);
            let (a, b, c) = (points[i], points[(i + 1) % 3], points[(i + 2) % 3]);
            let ab = cut(b, a);
            let ac = cut(c, a);
            [Some([ab, b, c]), Some([ab, c, ac])]
        }
    };
    out.into_iter().flatten()
}

/// Rows per band; several bands per worker keep the pool busy when geometry
/// is unevenly spread over the screen.
fn band_rows(height: usize) -> usize {
    let bands = num_cpus::get().max(1) * 4;
    height.div_ceil(bands).max(1)
}

/// Rasterize `triangles` into `frame`.
///
/// The frame is split into horizontal bands processed in parallel. Every band
/// owns its rows exclusively and walks the triangles in input order, so the
/// depth-test-then-write on each pixel is race free. A fragment replaces the
/// stored one only if it is strictly nearer. Returns the number of pixels written.
pub fn rasterize(frame: &mut FrameBuffer, triangles: &[ScreenTriangle]) -> usize {
    let rows = band_rows(frame.height());
    let width = frame.width();
    frame
        .par_bands_mut(rows)
        .map(|mut band| {
            let top = band.top as f32;
            let bottom = (band.top + band.rows()) as f32;
            triangles
                .iter()
                .filter(|t| {
                    let (lo, hi) = t.y_range();
                    hi >= top && lo < bottom
                })
                .map(|t| fill(&mut band, width, t))
                .sum::<usize>()
        })
        .sum()
}

/// Edge function: twice the signed area of `(a, b, p)`.
#[inline]
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Scan one triangle inside a band, sampling at pixel centers.
fn fill(band: &mut Band<'_>, width: usize, triangle: &ScreenTriangle) -> usize {
    let [p0, p1, p2] = triangle.points;
    let (a, b, c) = (p0.truncate(), p1.truncate(), p2.truncate());
    let area = edge(a, b, c);
    if area == 0.0 || !area.is_finite() {
        return 0;
    }
    // Depth is interpolated as 1/z, which is linear in screen space.
    let inv_z = [1.0 / p0.z, 1.0 / p1.z, 1.0 / p2.z];

    let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as usize;
    let max_x = (a.x.max(b.x).max(c.x).ceil().max(0.0) as usize).min(width);
    let min_y = (a.y.min(b.y).min(c.y).floor().max(band.top as f32) as usize).max(band.top);
    let max_y = (a.y.max(b.y).max(c.y).ceil().max(0.0) as usize).min(band.top + band.rows());

    let mut written = 0;
    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(b, c, p) / area;
            let w1 = edge(c, a, p) / area;
            let w2 = edge(a, b, p) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }
            let depth = 1.0 / (w0 * inv_z[0] + w1 * inv_z[1] + w2 * inv_z[2]);
            if band.plot(x, y, depth, triangle.color) {
                written += 1;
            }
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(depth: f32, color: Color) -> ScreenTriangle {
        ScreenTriangle {
            points: [
                Vec3::new(1.0, 1.0, depth),
                Vec3::new(30.0, 2.0, depth),
                Vec3::new(4.0, 30.0, depth),
            ],
            color,
        }
    }

    fn render(triangles: &[ScreenTriangle]) -> FrameBuffer {
        let mut frame = FrameBuffer::new(32, 32);
        frame.clear(Color::BLACK);
        rasterize(&mut frame, triangles);
        frame
    }

    #[test]
    fn test_depth_order_independence() {
        let near = flat(2.0, Color::WHITE);
        let far = flat(5.0, Color::ROCK);
        let skew = ScreenTriangle {
            points: [
                Vec3::new(0.0, 16.0, 1.0),
                Vec3::new(31.0, 0.0, 9.0),
                Vec3::new(31.0, 31.0, 9.0),
            ],
            color: Color::SAND,
        };
        let a = render(&[near, far, skew]);
        let b = render(&[skew, far, near]);
        let c = render(&[far, skew, near]);
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!(a.colors().contains(&Color::WHITE));
        assert!(!a.colors().contains(&Color::ROCK), "far triangle is fully hidden");
    }

    #[test]
    fn test_winding_does_not_matter() {
        let t = flat(3.0, Color::WHITE);
        let reversed = ScreenTriangle {
            points: [t.points[0], t.points[2], t.points[1]],
            ..t
        };
        assert_eq!(render(&[t]).colors(), render(&[reversed]).colors());
    }

    #[test]
    fn test_pixels_outside_untouched() {
        let frame = render(&[flat(3.0, Color::WHITE)]);
        assert_eq!(frame.color_at(31, 31), Some(Color::BLACK));
        assert_eq!(frame.depth_at(31, 31), Some(f32::INFINITY));
        assert_eq!(frame.color_at(5, 5), Some(Color::WHITE));
        assert!((frame.depth_at(5, 5).unwrap() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_offscreen_triangle_is_clipped_to_buffer() {
        let huge = ScreenTriangle {
            points: [
                Vec3::new(-500.0, -500.0, 1.0),
                Vec3::new(900.0, -500.0, 1.0),
                Vec3::new(-500.0, 900.0, 1.0),
            ],
            color: Color::SNOW,
        };
        let mut frame = FrameBuffer::new(16, 16);
        let written = rasterize(&mut frame, &[huge]);
        assert_eq!(written, 256);
    }

    #[test]
    fn test_clip_keeps_triangles_in_front() {
        let all_in = [Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 2.0)];
        assert_eq!(clip_near(all_in).count(), 1);

        let all_out = all_in.map(|p| p - Vec3::Z * 5.0);
        assert_eq!(clip_near(all_out).count(), 0);

        let one_in = [Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, -1.0), Vec3::new(0.0, 1.0, -1.0)];
        let pieces: Vec<_> = clip_near(one_in).collect();
        assert_eq!(pieces.len(), 1);

        let two_in = [Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.0, 1.0, -1.0)];
        let pieces: Vec<_> = clip_near(two_in).collect();
        assert_eq!(pieces.len(), 2);

        for piece in clip_near(one_in).chain(clip_near(two_in)) {
            assert!(piece.iter().all(|p| p.z >= NEAR_PLANE - 1e-6), "{piece:?}");
        }
    }

    #[test]
    fn test_clip_preserves_winding() {
        let normal = |t: [Vec3; 3]| (t[1] - t[0]).cross(t[2] - t[0]);
        let tri = [Vec3::new(0.0, 0.0, 2.0), Vec3::new(1.0, 0.0, -1.0), Vec3::new(0.0, 1.0, 2.0)];
        let reference = normal(tri);
        for piece in clip_near(tri) {
            assert!(normal(piece).dot(reference) > 0.0);
        }
    }

    #[test]
    fn test_projection_center_and_orientation() {
        let projector = Projector::new(90.0, 100, 100);
        let center = projector.project(Vec3::new(0.0, 0.0, 5.0));
        assert!((center.x - 50.0).abs() < 1e-4 && (center.y - 50.0).abs() < 1e-4);
        let up_right = projector.project(Vec3::new(1.0, 1.0, 1.0));
        assert!(up_right.x > 50.0 && up_right.y < 50.0, "{up_right}");
        // 90° vertical fov: y == z lands on the top edge.
        assert!(up_right.y.abs() < 1e-3);
    }
}
