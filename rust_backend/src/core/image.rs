//! Owned planar f32 image, one plane per channel, row-major (stride == width).
//!
//! Values are normalized to `[0, 1]` by the loaders. Integration produces one
//! of these per depth job; the stretch mutates it in place and the measurer
//! reads regions out of it.

use super::domain::Rectangle;

#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
    /// Number of planes (1 for mono, 3 for RGB)
    pub channels: usize,
    /// Planes stored back to back, each `width * height` long
    pub data: Vec<f32>,
}

impl Image {
    /// Construct a zero-initialized image.
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![0.0; width * height * channels],
        }
    }

    /// Wrap existing planar data. Returns `None` when the length does not match.
    pub fn from_planes(width: usize, height: usize, channels: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == width * height * channels).then_some(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Single-channel image filled with one value.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            channels: 1,
            data: vec![value; width * height],
        }
    }

    #[inline]
    pub fn plane_len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn channel(&self, c: usize) -> &[f32] {
        let n = self.plane_len();
        &self.data[c * n..(c + 1) * n]
    }

    #[inline]
    pub fn channel_mut(&mut self, c: usize) -> &mut [f32] {
        let n = self.plane_len();
        &mut self.data[c * n..(c + 1) * n]
    }

    #[inline]
    pub fn get(&self, c: usize, x: usize, y: usize) -> f32 {
        self.data[c * self.plane_len() + y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, c: usize, x: usize, y: usize, v: f32) {
        let i = c * self.plane_len() + y * self.width + x;
        self.data[i] = v;
    }

    pub fn same_shape(&self, other: &Image) -> bool {
        self.width == other.width && self.height == other.height && self.channels == other.channels
    }

    /// Pixel values inside `rect`, averaged across channels.
    ///
    /// Callers must check `rect.fits_within(width, height)` first.
    pub fn crop_luminance(&self, rect: &Rectangle) -> Vec<f32> {
        let (x0, x1) = (rect.x0 as usize, rect.x1 as usize);
        let (y0, y1) = (rect.y0 as usize, rect.y1 as usize);
        let mut out = Vec::with_capacity((x1 - x0) * (y1 - y0));
        let scale = 1.0 / self.channels as f32;
        for y in y0..y1 {
            for x in x0..x1 {
                let sum: f32 = (0..self.channels).map(|c| self.get(c, x, y)).sum();
                out.push(sum * scale);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_planes_checks_length() {
        assert!(Image::from_planes(2, 2, 3, vec![0.0; 12]).is_some());
        assert!(Image::from_planes(2, 2, 3, vec![0.0; 11]).is_none());
    }

    #[test]
    fn test_crop_luminance_averages_channels() {
        let mut img = Image::new(4, 4, 3);
        img.set(0, 1, 1, 0.3);
        img.set(1, 1, 1, 0.6);
        img.set(2, 1, 1, 0.9);
        let rect = Rectangle::new(1, 1, 2, 2).unwrap();
        let values = img.crop_luminance(&rect);
        assert_eq!(values.len(), 1);
        assert!((values[0] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_crop_mono_region() {
        let mut img = Image::filled(8, 6, 0.1);
        for y in 2..4 {
            for x in 3..6 {
                img.set(0, x, y, 0.5);
            }
        }
        let rect = Rectangle::new(3, 2, 6, 4).unwrap();
        let values = img.crop_luminance(&rect);
        assert_eq!(values.len(), 6);
        assert!(values.iter().all(|&v| v == 0.5));
    }
}
