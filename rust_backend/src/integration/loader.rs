//! Frame decoding through the `image` crate.

use image::{DynamicImage, ImageBuffer, Luma, Rgb};
use std::fs;
use std::path::Path;

use crate::core::domain::Subframe;
use crate::core::error::{AnalysisError, AnalysisResult};
use crate::core::image::Image;

use super::FrameLoader;

/// Loads PNG/TIFF subframes from disk, normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFrameLoader;

impl FrameLoader for FileFrameLoader {
    fn load(&self, subframe: &Subframe) -> AnalysisResult<Image> {
        load_image(subframe.path())
    }
}

/// Decode an image file into planar f32.
///
/// Gray sources give one plane, everything else three.
pub fn load_image(path: &Path) -> AnalysisResult<Image> {
    if !path.is_file() {
        return Err(AnalysisError::ImageNotFound(path.to_path_buf()));
    }
    let decoded = image::open(path).map_err(|e| {
        AnalysisError::Integration(format!("failed to decode {}: {}", path.display(), e))
    })?;
    Ok(from_dynamic(decoded))
}

/// Convert a decoded image to planar f32 layout.
pub fn from_dynamic(decoded: DynamicImage) -> Image {
    let width = decoded.width() as usize;
    let height = decoded.height() as usize;

    if decoded.color().has_color() {
        let rgb = decoded.to_rgb32f().into_raw();
        let mut img = Image::new(width, height, 3);
        let n = img.plane_len();
        for (i, px) in rgb.chunks_exact(3).enumerate() {
            for (c, &v) in px.iter().enumerate() {
                img.data[c * n + i] = v;
            }
        }
        img
    } else {
        let luma = decoded.to_luma32f().into_raw();
        let mut img = Image::new(width, height, 1);
        img.data.copy_from_slice(&luma);
        img
    }
}

/// Write `image` as a 16-bit TIFF (gray for one plane, RGB otherwise).
pub fn save_tiff16(image: &Image, path: &Path) -> AnalysisResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
        }
    }

    let to_u16 = |v: f32| (v.clamp(0.0, 1.0) * 65535.0).round() as u16;
    let (w, h) = (image.width as u32, image.height as u32);
    let n = image.plane_len();

    let dynamic = if image.channels == 1 {
        let raw: Vec<u16> = image.channel(0).iter().map(|&v| to_u16(v)).collect();
        let buf: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_raw(w, h, raw)
            .ok_or_else(|| AnalysisError::Integration("buffer size mismatch".to_string()))?;
        DynamicImage::ImageLuma16(buf)
    } else {
        let mut raw = Vec::with_capacity(n * 3);
        for i in 0..n {
            for c in 0..3 {
                // missing planes repeat the last one
                let plane = c.min(image.channels - 1);
                raw.push(to_u16(image.data[plane * n + i]));
            }
        }
        let buf: ImageBuffer<Rgb<u16>, Vec<u16>> = ImageBuffer::from_raw(w, h, raw)
            .ok_or_else(|| AnalysisError::Integration("buffer size mismatch".to_string()))?;
        DynamicImage::ImageRgb16(buf)
    };

    dynamic.save(path).map_err(|e| {
        AnalysisError::Integration(format!("failed to write {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_image_not_found() {
        let dir = tempdir().unwrap();
        let sub = Subframe::new(dir.path().join("L_0001.tif"), 300.0);
        match FileFrameLoader.load(&sub) {
            Err(AnalysisError::ImageNotFound(path)) => assert!(path.ends_with("L_0001.tif")),
            other => panic!("expected ImageNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_mono_tiff_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mono.tif");

        let mut img = Image::filled(6, 4, 0.25);
        img.set(0, 2, 1, 1.0);
        save_tiff16(&img, &path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!((loaded.width, loaded.height, loaded.channels), (6, 4, 1));
        assert!((loaded.get(0, 0, 0) - 0.25).abs() < 1e-4);
        assert!((loaded.get(0, 2, 1) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_rgb_png_loads_planar() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("color.png");

        let mut buf = image::RgbImage::new(3, 2);
        buf.put_pixel(1, 1, image::Rgb([255, 0, 51]));
        buf.save(&path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.channels, 3);
        assert!((loaded.get(0, 1, 1) - 1.0).abs() < 1e-6);
        assert_eq!(loaded.get(1, 1, 1), 0.0);
        assert!((loaded.get(2, 1, 1) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_corrupt_file_is_integration_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not an image").unwrap();
        assert!(matches!(load_image(&path), Err(AnalysisError::Integration(_))));
    }
}
