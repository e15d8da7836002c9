//! Lossy WebP encoding of raster sources.

use anyhow::{Context, Result};

/// Decode PNG/JPEG bytes and re-encode them as WebP at `quality` (0..=100).
pub fn to_webp(data: &[u8], quality: u8) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data).context("Failed to decode image")?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let encoded = webp::Encoder::from_rgba(rgba.as_raw(), width, height).encode(f32::from(quality));
    Ok(encoded.to_vec())
}

/// Whether a source extension gets a WebP sibling.
pub fn is_raster(ext: &str) -> bool {
    matches!(ext, "png" | "jpg" | "jpeg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_fn(16, 16, |x, y| image::Rgba([x as u8 * 16, y as u8 * 16, 0, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_png_to_webp() {
        let webp = to_webp(&png_bytes(), 70).unwrap();
        assert_eq!(&webp[..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(to_webp(b"not an image", 70).is_err());
    }

    #[test]
    fn test_is_raster() {
        assert!(is_raster("png"));
        assert!(is_raster("jpeg"));
        assert!(!is_raster("svg"));
        assert!(!is_raster("webp"));
    }
}
