//! Decode/resize/encode helpers for attachment previews.

use std::path::Path;

use thiserror::Error;

/// Failure while turning an attachment into a preview PNG.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("decode: {0}")]
    Decode(#[from] image::ImageError),
    #[error("resize: {0}")]
    Resize(String),
}

/// Decoded image payload encoded as PNG bytes, with original dimensions.
#[derive(Debug, Clone)]
pub struct DecodedImagePng {
    pub png_bytes: Vec<u8>,
    pub source_width: u32,
    pub source_height: u32,
}

/// Scales `(width, height)` so the longest edge is at most `max_edge`,
/// preserving aspect ratio. Never returns a zero dimension.
#[must_use]
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let max_edge = max_edge.max(1);
    let longest = width.max(height);
    if longest <= max_edge {
        return (width.max(1), height.max(1));
    }

    let scale = f64::from(max_edge) / f64::from(longest);
    let w = (f64::from(width) * scale).round() as u32;
    let h = (f64::from(height) * scale).round() as u32;
    (w.clamp(1, max_edge), h.clamp(1, max_edge))
}

/// Decodes an image file and returns PNG bytes whose longest edge is at
/// most `max_edge`.
///
/// If the source file is already PNG and small enough, bytes are returned
/// as-is (fast path).
///
/// # Errors
/// Returns an error if file I/O, format detection/decoding, resizing,
/// or PNG encoding fails.
pub fn decode_image_to_png(image_path: &Path, max_edge: u32) -> Result<DecodedImagePng, DecodeError> {
    let data = std::fs::read(image_path).map_err(|source| DecodeError::Io {
        path: image_path.display().to_string(),
        source,
    })?;
    let is_png = data.len() >= 8 && data[..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    let (width, height) = image::ImageReader::new(std::io::Cursor::new(data.as_slice()))
        .with_guessed_format()
        .map_err(|source| DecodeError::Io {
            path: image_path.display().to_string(),
            source,
        })?
        .into_dimensions()?;

    let (dst_w, dst_h) = fit_within(width, height, max_edge);
    let needs_resize = dst_w != width || dst_h != height;

    let png_bytes = if is_png && !needs_resize {
        data
    } else {
        let reader = image::ImageReader::new(std::io::Cursor::new(data))
            .with_guessed_format()
            .map_err(|source| DecodeError::Io {
                path: image_path.display().to_string(),
                source,
            })?;

        let dyn_img = reader.decode()?;
        let resized = if needs_resize {
            resize_image_fast(&dyn_img, dst_w, dst_h)?
        } else {
            dyn_img
        };

        encode_png_fast(&resized)?
    };

    Ok(DecodedImagePng {
        png_bytes,
        source_width: width,
        source_height: height,
    })
}

fn resize_image_fast(
    src: &image::DynamicImage,
    dst_w: u32,
    dst_h: u32,
) -> Result<image::DynamicImage, DecodeError> {
    use fast_image_resize as fir;

    let src_rgba = src.to_rgba8();
    let src_w = src_rgba.width();
    let src_h = src_rgba.height();
    let src_pixels = src_rgba.into_raw();

    let src_image = fir::images::Image::from_vec_u8(src_w, src_h, src_pixels, fir::PixelType::U8x4)
        .map_err(|e| DecodeError::Resize(e.to_string()))?;

    let mut dst_image = fir::images::Image::new(dst_w, dst_h, fir::PixelType::U8x4);
    let mut resizer = fir::Resizer::new();
    let options = fir::ResizeOptions::new().resize_alg(fir::ResizeAlg::Convolution(
        fir::FilterType::Bilinear,
    ));
    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| DecodeError::Resize(e.to_string()))?;

    let rgba = image::RgbaImage::from_raw(dst_w, dst_h, dst_image.into_vec())
        .ok_or_else(|| DecodeError::Resize("invalid output buffer".to_string()))?;
    Ok(image::DynamicImage::ImageRgba8(rgba))
}

fn encode_png_fast(img: &image::DynamicImage) -> Result<Vec<u8>, DecodeError> {
    use image::ImageEncoder as _;
    use image::codecs::png::{CompressionType, FilterType, PngEncoder};

    let mut buf = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buf, CompressionType::Fast, FilterType::Adaptive);

    if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        encoder.write_image(rgba.as_raw(), w, h, image::ExtendedColorType::Rgba8)?;
    } else {
        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        encoder.write_image(rgb.as_raw(), w, h, image::ExtendedColorType::Rgb8)?;
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 10, 10]));
        img.save(path).unwrap();
    }

    #[test]
    fn test_fit_within_keeps_small_images() {
        assert_eq!(fit_within(640, 480, 1024), (640, 480));
    }

    #[test]
    fn test_fit_within_scales_longest_edge() {
        assert_eq!(fit_within(4000, 2000, 1000), (1000, 500));
        assert_eq!(fit_within(100, 5000, 500), (10, 500));
        assert_eq!(fit_within(10_000, 1, 100), (100, 1));
    }

    #[test]
    fn test_small_png_passes_through_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("small.png");
        write_png(&path, 8, 4);

        let decoded = decode_image_to_png(&path, 64).unwrap();
        assert_eq!(decoded.png_bytes, std::fs::read(&path).unwrap());
        assert_eq!((decoded.source_width, decoded.source_height), (8, 4));
    }

    #[test]
    fn test_large_png_is_downscaled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("large.png");
        write_png(&path, 200, 100);

        let decoded = decode_image_to_png(&path, 50).unwrap();
        assert_eq!((decoded.source_width, decoded.source_height), (200, 100));

        let out = image::load_from_memory(&decoded.png_bytes).unwrap();
        assert_eq!((out.width(), out.height()), (50, 25));
    }

    #[test]
    fn test_non_image_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fake.png");
        std::fs::write(&path, b"not an image").unwrap();

        assert!(decode_image_to_png(&path, 64).is_err());
    }
}
