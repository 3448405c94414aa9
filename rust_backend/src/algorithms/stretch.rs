//! Automatic nonlinear stretch applied before every measurement.
//!
//! Each channel gets a shadow clip derived from its median and MAD and a
//! midtones balance chosen so the channel median lands on a fixed target
//! background. All depths of a sweep go through the same rule, so their SNR
//! values are comparable with each other. Because the curve is nonlinear the
//! resulting SNR is a comparative index across depths, not a photometric SNR.

use serde::{Deserialize, Serialize};

use crate::algorithms::statistics::median_and_mad;
use crate::core::image::Image;

/// Shadow clipping point in MAD units below the median.
pub const SHADOWS_CLIP: f64 = -2.8;

/// Where the channel median ends up after stretching.
pub const TARGET_BACKGROUND: f64 = 0.25;

/// Midtones transfer function.
///
/// Maps 0 → 0, `m` → 0.5, 1 → 1 with a rational curve.
#[inline]
pub fn mtf(m: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    ((m - 1.0) * x) / ((2.0 * m - 1.0) * x - m)
}

/// Histogram transformation parameters for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StretchParams {
    pub shadow_clip: f64,
    pub midtone_balance: f64,
    pub highlight_clip: f64,
    pub output_shadow: f64,
    pub output_highlight: f64,
}

impl StretchParams {
    pub const IDENTITY: StretchParams = StretchParams {
        shadow_clip: 0.0,
        midtone_balance: 0.5,
        highlight_clip: 1.0,
        output_shadow: 0.0,
        output_highlight: 1.0,
    };

    /// Shadow/highlight clip, midtones transfer, then output range rescale.
    #[inline]
    pub fn apply_value(&self, x: f64) -> f64 {
        let range = self.highlight_clip - self.shadow_clip;
        let y = if x <= self.shadow_clip {
            0.0
        } else if x >= self.highlight_clip || range <= 0.0 {
            1.0
        } else {
            (x - self.shadow_clip) / range
        };
        let y = mtf(self.midtone_balance, y);
        self.output_shadow + y * (self.output_highlight - self.output_shadow)
    }
}

impl Default for StretchParams {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Computes and applies the automatic stretch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StretchNormalizer {
    pub shadows_clip: f64,
    pub target_background: f64,
}

impl Default for StretchNormalizer {
    fn default() -> Self {
        Self {
            shadows_clip: SHADOWS_CLIP,
            target_background: TARGET_BACKGROUND,
        }
    }
}

impl StretchNormalizer {
    /// Stretch parameters for a single channel's pixel values.
    pub fn channel_params(&self, values: &[f32]) -> StretchParams {
        let (median, mad) = median_and_mad(values);
        let shadow_clip = (median + self.shadows_clip * mad).clamp(0.0, 1.0);

        let span = 1.0 - shadow_clip;
        let normalized_median = if span > 0.0 {
            (median - shadow_clip) / span
        } else {
            0.0
        };

        let midtone_balance = if normalized_median > 0.0 && normalized_median < 1.0 {
            mtf(self.target_background, normalized_median)
        } else {
            log::warn!(
                "Degenerate channel (median={:.6}, mad={:.6}), keeping linear midtones",
                median,
                mad
            );
            0.5
        };

        StretchParams {
            shadow_clip,
            midtone_balance,
            highlight_clip: 1.0,
            output_shadow: 0.0,
            output_highlight: 1.0,
        }
    }

    /// Per-channel parameters for `image`.
    pub fn compute_auto_stretch(&self, image: &Image) -> Vec<StretchParams> {
        (0..image.channels)
            .map(|c| self.channel_params(image.channel(c)))
            .collect()
    }

    /// Compute and apply the stretch in place; returns the parameters used.
    pub fn normalize(&self, image: &mut Image) -> Vec<StretchParams> {
        let params = self.compute_auto_stretch(image);
        apply_stretch(image, &params);
        params
    }
}

/// Apply per-channel parameters in place.
///
/// Channels without a matching entry are left untouched.
pub fn apply_stretch(image: &mut Image, params: &[StretchParams]) {
    for (c, p) in params.iter().enumerate().take(image.channels) {
        for v in image.channel_mut(c).iter_mut() {
            *v = p.apply_value(*v as f64) as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::statistics::median;

    fn gradient_image(width: usize, height: usize) -> Image {
        let mut img = Image::new(width, height, 1);
        for y in 0..height {
            for x in 0..width {
                // faint sky around 0.05 with a small spread
                let v = 0.04 + 0.02 * ((x * 7 + y * 13) % 17) as f32 / 17.0;
                img.set(0, x, y, v);
            }
        }
        img
    }

    #[test]
    fn test_mtf_fixed_points() {
        for m in [0.1, 0.25, 0.5, 0.8] {
            assert_eq!(mtf(m, 0.0), 0.0);
            assert_eq!(mtf(m, 1.0), 1.0);
            assert!((mtf(m, m) - 0.5).abs() < 1e-12);
        }
        assert!((mtf(0.5, 0.3) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_identity_params() {
        let p = StretchParams::IDENTITY;
        for x in [0.0, 0.1, 0.5, 0.9, 1.0] {
            assert!((p.apply_value(x) - x).abs() < 1e-12);
        }
    }

    #[test]
    fn test_channel_params_shape() {
        let img = gradient_image(31, 21);
        let params = StretchNormalizer::default().compute_auto_stretch(&img);
        assert_eq!(params.len(), 1);
        let p = params[0];
        assert!(p.shadow_clip >= 0.0 && p.shadow_clip < 0.05);
        assert!(p.midtone_balance > 0.0 && p.midtone_balance < 0.5);
        assert_eq!(p.highlight_clip, 1.0);
        assert_eq!(p.output_shadow, 0.0);
        assert_eq!(p.output_highlight, 1.0);
    }

    /// Test that the stretched median lands on the target background
    #[test]
    fn test_median_maps_to_target() {
        let mut img = gradient_image(31, 21);
        StretchNormalizer::default().normalize(&mut img);
        let m = median(img.channel(0));
        assert!((m - TARGET_BACKGROUND).abs() < 1e-4, "median after stretch: {m}");
    }

    #[test]
    fn test_stretch_is_monotonic() {
        let img = gradient_image(31, 21);
        let p = StretchNormalizer::default().compute_auto_stretch(&img)[0];
        let mut last = -1.0;
        for i in 0..=100 {
            let y = p.apply_value(i as f64 / 100.0);
            assert!(y >= last);
            assert!((0.0..=1.0).contains(&y));
            last = y;
        }
    }

    #[test]
    fn test_each_channel_gets_own_params() {
        let mut img = Image::new(9, 9, 3);
        for c in 0..3 {
            for (i, v) in img.channel_mut(c).iter_mut().enumerate() {
                *v = 0.02 * (c + 1) as f32 + 0.001 * (i % 7) as f32;
            }
        }
        let params = StretchNormalizer::default().normalize(&mut img);
        assert_eq!(params.len(), 3);
        assert_ne!(params[0], params[2]);
        for c in 0..3 {
            let m = median(img.channel(c));
            assert!((m - TARGET_BACKGROUND).abs() < 1e-3, "channel {c} median {m}");
        }
    }

    #[test]
    fn test_flat_channel_keeps_linear_midtones() {
        let img = Image::filled(5, 5, 0.3);
        let p = StretchNormalizer::default().compute_auto_stretch(&img)[0];
        assert_eq!(p.midtone_balance, 0.5);
        assert!((p.shadow_clip - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_clipped_sky_stays_linear() {
        // more than half the pixels at zero gives a zero MAD
        let mut img = Image::filled(5, 5, 0.0);
        for x in 0..5 {
            img.set(0, x, 0, 0.8);
            img.set(0, x, 1, 0.4);
        }
        let normalizer = StretchNormalizer::default();
        let p = normalizer.compute_auto_stretch(&img)[0];
        assert_eq!(p.shadow_clip, 0.0);
        assert_eq!(p.midtone_balance, 0.5);

        normalizer.normalize(&mut img);
        assert_eq!(img.get(0, 2, 4), 0.0);
        assert!((img.get(0, 2, 1) - 0.4).abs() < 1e-6);
    }
}
