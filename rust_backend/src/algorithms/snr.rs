//! Region statistics and the SNR figure for one integrated image.
//!
//! `snr = (fg_median - bg_median) / fg_sigma`. A zero (or non-finite)
//! foreground sigma makes the ratio undefined and is reported as an error
//! instead of leaking `inf`/`NaN` into the results. Negative values are valid.

use crate::algorithms::statistics::{median, std_dev};
use crate::core::domain::{Rectangle, RegionStats, RoiPair, SnrMeasurement};
use crate::core::error::{AnalysisError, AnalysisResult};
use crate::core::image::Image;

/// Median and standard deviation of the pixels inside `rect`.
///
/// Multi-channel images are reduced to the channel mean per pixel.
pub fn measure_region(image: &Image, rect: &Rectangle, label: &str) -> AnalysisResult<RegionStats> {
    if !rect.fits_within(image.width, image.height) {
        return Err(AnalysisError::Snr {
            label: label.to_string(),
            reason: format!(
                "region {} exceeds image bounds {}x{}",
                rect, image.width, image.height
            ),
        });
    }
    let values = image.crop_luminance(rect);
    Ok(RegionStats {
        median: median(&values),
        sigma: std_dev(&values),
    })
}

/// SNR from already measured region statistics.
///
/// # Examples
///
/// ```
/// use subframe_snr::algorithms::snr::snr_from_stats;
/// use subframe_snr::core::domain::RegionStats;
///
/// let bg = RegionStats { median: 0.2, sigma: 0.02 };
/// let fg = RegionStats { median: 0.6, sigma: 0.1 };
/// let snr = snr_from_stats(&bg, &fg, "N12").unwrap();
/// assert!((snr - 4.0).abs() < 1e-12);
///
/// let flat = RegionStats { median: 0.6, sigma: 0.0 };
/// assert!(snr_from_stats(&bg, &flat, "N12").is_err());
/// ```
pub fn snr_from_stats(background: &RegionStats, foreground: &RegionStats, label: &str) -> AnalysisResult<f64> {
    if foreground.sigma == 0.0 || !foreground.sigma.is_finite() {
        return Err(AnalysisError::Snr {
            label: label.to_string(),
            reason: format!("foreground sigma is {}", foreground.sigma),
        });
    }
    let snr = (foreground.median - background.median) / foreground.sigma;
    if !snr.is_finite() {
        return Err(AnalysisError::Snr {
            label: label.to_string(),
            reason: format!("non-finite ratio {}", snr),
        });
    }
    Ok(snr)
}

/// Measure both regions of `rois` on `image`.
pub fn measure(image: &Image, rois: &RoiPair, label: &str) -> AnalysisResult<SnrMeasurement> {
    let background = measure_region(image, &rois.background, label)?;
    let foreground = measure_region(image, &rois.foreground, label)?;
    let snr = snr_from_stats(&background, &foreground, label)?;

    log::debug!(
        "{}: bg median={:.6} sigma={:.6}, fg median={:.6} sigma={:.6}, snr={:.4}",
        label,
        background.median,
        background.sigma,
        foreground.median,
        foreground.sigma,
        snr
    );

    Ok(SnrMeasurement {
        background,
        foreground,
        snr,
    })
}
