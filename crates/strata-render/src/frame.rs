//! Color + depth frame buffer.

use rayon::prelude::*;
use strata_mesh::Color;

/// A `width × height` color buffer with a same-length depth buffer.
///
/// Depth holds the nearest view distance written this frame; [`clear`](Self::clear)
/// resets it to `+inf`.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    color: Vec<Color>,
    depth: Vec<f32>,
}

/// One horizontal strip of the frame buffer, borrowed mutably.
pub(crate) struct Band<'a> {
    pub top: usize,
    pub width: usize,
    color: &'a mut [Color],
    depth: &'a mut [f32],
}

impl Band<'_> {
    pub fn rows(&self) -> usize {
        self.depth.len() / self.width
    }

    /// Write `color` at `(x, y)` if `depth` is strictly nearer than what is stored.
    ///
    /// `y` is in frame coordinates and must lie within this band.
    #[inline]
    pub fn plot(&mut self, x: usize, y: usize, depth: f32, color: Color) -> bool {
        let index = (y - self.top) * self.width + x;
        if depth < self.depth[index] {
            self.depth[index] = depth;
            self.color[index] = color;
            true
        } else {
            false
        }
    }
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let len = width * height;
        Self {
            width,
            height,
            color: vec![Color::BLACK; len],
            depth: vec![f32::INFINITY; len],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocate for new dimensions. Contents are cleared.
    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.width, self.height) {
            *self = Self::new(width, height);
        }
    }

    /// Fill color with `background` and reset every depth entry to `+inf`.
    pub fn clear(&mut self, background: Color) {
        self.color.fill(background);
        self.depth.fill(f32::INFINITY);
    }

    pub fn color_at(&self, x: usize, y: usize) -> Option<Color> {
        (x < self.width && y < self.height).then(|| self.color[y * self.width + x])
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        (x < self.width && y < self.height).then(|| self.depth[y * self.width + x])
    }

    pub fn colors(&self) -> &[Color] {
        &self.color
    }

    /// Row-major RGBA8 bytes, ready for an image encoder or a window surface.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.color.iter().flat_map(|c| c.to_rgba()).collect()
    }

    /// Split into horizontal bands of at most `rows` rows each. Bands are
    /// disjoint, so each one can be written by a different worker.
    pub(crate) fn par_bands_mut(&mut self, rows: usize) -> impl IndexedParallelIterator<Item = Band<'_>> {
        let width = self.width;
        let chunk = (rows.max(1) * width).max(1);
        self.color
            .par_chunks_mut(chunk)
            .zip(self.depth.par_chunks_mut(chunk))
            .enumerate()
            .map(move |(i, (color, depth))| Band {
                top: i * rows.max(1),
                width,
                color,
                depth,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_depth_is_infinite() {
        let frame = FrameBuffer::new(4, 3);
        assert_eq!(frame.colors().len(), 12);
        assert_eq!(frame.depth_at(3, 2), Some(f32::INFINITY));
        assert_eq!(frame.depth_at(4, 0), None);
    }

    #[test]
    fn test_plot_is_strictly_nearer() {
        let mut frame = FrameBuffer::new(2, 2);
        {
            let mut bands: Vec<_> = frame.par_bands_mut(2).collect();
            let band = &mut bands[0];
            assert!(band.plot(1, 1, 5.0, Color::WHITE));
            assert!(!band.plot(1, 1, 5.0, Color::SNOW), "equal depth must not overwrite");
            assert!(!band.plot(1, 1, 6.0, Color::SNOW));
            assert!(band.plot(1, 1, 4.0, Color::ROCK));
        }
        assert_eq!(frame.color_at(1, 1), Some(Color::ROCK));
        assert_eq!(frame.depth_at(1, 1), Some(4.0));
    }

    #[test]
    fn test_clear_resets_depth() {
        let mut frame = FrameBuffer::new(2, 2);
        let mut bands: Vec<_> = frame.par_bands_mut(1).collect();
        bands[1].plot(0, 1, 1.0, Color::WHITE);
        drop(bands);
        frame.clear(Color::SKY_BLUE);
        assert_eq!(frame.depth_at(0, 1), Some(f32::INFINITY));
        assert_eq!(frame.color_at(0, 1), Some(Color::SKY_BLUE));
    }

    #[test]
    fn test_bands_cover_every_row_once() {
        let mut frame = FrameBuffer::new(3, 10);
        let bands: Vec<_> = frame.par_bands_mut(4).map(|b| (b.top, b.rows())).collect();
        assert_eq!(bands, [(0, 4), (4, 4), (8, 2)]);
    }

    #[test]
    fn test_resize_reallocates() {
        let mut frame = FrameBuffer::new(2, 2);
        frame.resize(5, 1);
        assert_eq!((frame.width(), frame.height()), (5, 1));
        assert_eq!(frame.to_rgba8().len(), 20);
    }
}
