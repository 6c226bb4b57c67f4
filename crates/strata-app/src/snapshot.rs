//! PNG export of a finished frame.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use strata_render::FrameBuffer;

use crate::error::AppError;

/// Encode `frame` as an 8-bit RGBA PNG at `path`.
pub fn write_png(path: &Path, frame: &FrameBuffer) -> Result<(), AppError> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(AppError::EmptyFrame);
    }
    let png_error = |source| AppError::Png {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), frame.width() as u32, frame.height() as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header().map_err(png_error)?;
    writer.write_image_data(&frame.to_rgba8()).map_err(png_error)?;
    writer.finish().map_err(png_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_png_decodes_with_frame_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let frame = FrameBuffer::new(7, 5);
        write_png(&path, &frame).unwrap();

        let decoder = png::Decoder::new(File::open(&path).unwrap());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (7, 5));
        assert_eq!(info.color_type, png::ColorType::Rgba);
        // A fresh buffer is opaque black.
        assert_eq!(&buf[..4], &[0, 0, 0, 255]);
    }

    #[test]
    fn test_empty_frame_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_png(&dir.path().join("x.png"), &FrameBuffer::new(0, 4)).unwrap_err();
        assert!(matches!(err, AppError::EmptyFrame));
    }

    #[test]
    fn test_unwritable_path_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.png");
        let err = write_png(&path, &FrameBuffer::new(2, 2)).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }
}
