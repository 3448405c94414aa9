//! Domain models for subframes, regions of interest, and depth jobs.
//!
//! This module provides the value types that flow through the analysis:
//! the ordered subframe list, the two measurement rectangles, the depth
//! strategy configuration, and the per-depth job record that is filled in
//! stage by stage and then handed to the aggregator and exporters.

use qtty::Seconds;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::{AnalysisError, AnalysisResult};

/// One raw exposure prior to stacking.
///
/// Subframes are kept in acquisition order; the first `depth` entries of the
/// list are the ones integrated for a job of that depth.
///
/// # Examples
///
/// ```
/// use subframe_snr::core::domain::Subframe;
///
/// let sub = Subframe::new("lights/L_0001.tif", 300.0).with_filter("Ha");
/// assert_eq!(sub.exposure.value(), 300.0);
/// assert_eq!(sub.filter.as_deref(), Some("Ha"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Subframe {
    pub path: PathBuf,
    pub exposure: Seconds,
    pub filter: Option<String>,
}

impl Subframe {
    pub fn new(path: impl Into<PathBuf>, exposure_seconds: f64) -> Self {
        Self {
            path: path.into(),
            exposure: Seconds::new(exposure_seconds),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// File name without directories, used for checksums and log messages.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Axis-aligned pixel rectangle with exclusive upper bounds.
///
/// A rectangle always has a positive area: `x1 > x0` and `y1 > y0`.
///
/// # Examples
///
/// ```
/// use subframe_snr::core::domain::Rectangle;
///
/// let rect = Rectangle::new(10, 20, 50, 40).unwrap();
/// assert_eq!(rect.width(), 40);
/// assert_eq!(rect.area(), 800);
/// assert!(Rectangle::new(10, 20, 10, 40).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Rectangle {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> AnalysisResult<Self> {
        let rect = Self { x0, y0, x1, y1 };
        rect.validate()?;
        Ok(rect)
    }

    /// Reject zero-area rectangles. Used after deserialization.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.x1 <= self.x0 || self.y1 <= self.y0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "degenerate rectangle {}: x1 must exceed x0 and y1 must exceed y0",
                self
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Whether the rectangle lies entirely inside a `width × height` image.
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        self.x1 as usize <= width && self.y1 as usize <= height
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x0, self.y0, self.x1, self.y1)
    }
}

/// Background and foreground measurement regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiPair {
    pub background: Rectangle,
    pub foreground: Rectangle,
}

impl RoiPair {
    /// Build a pair, rejecting degenerate or identical rectangles.
    pub fn new(background: Rectangle, foreground: Rectangle) -> AnalysisResult<Self> {
        background.validate()?;
        foreground.validate()?;
        if background == foreground {
            return Err(AnalysisError::RoiMissing(format!(
                "background and foreground cover the same region {}",
                background
            )));
        }
        Ok(Self {
            background,
            foreground,
        })
    }
}

/// Rule used to choose the sub-counts that get measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthStrategy {
    PresetOsc,
    Doubling,
    Fibonacci,
    Logarithmic,
    Custom,
}

impl DepthStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepthStrategy::PresetOsc => "preset_osc",
            DepthStrategy::Doubling => "doubling",
            DepthStrategy::Fibonacci => "fibonacci",
            DepthStrategy::Logarithmic => "logarithmic",
            DepthStrategy::Custom => "custom",
        }
    }
}

impl fmt::Display for DepthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepthStrategy {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "preset_osc" => Ok(DepthStrategy::PresetOsc),
            "doubling" => Ok(DepthStrategy::Doubling),
            "fibonacci" => Ok(DepthStrategy::Fibonacci),
            "logarithmic" => Ok(DepthStrategy::Logarithmic),
            "custom" => Ok(DepthStrategy::Custom),
            other => Err(AnalysisError::DepthStrategy {
                name: other.to_string(),
            }),
        }
    }
}

/// Explicit planning configuration passed to each component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    pub strategy: DepthStrategy,
    pub max_subs: usize,
    pub custom_depths: Option<String>,
    pub include_full_depth: bool,
}

impl AnalysisConfig {
    pub fn new(strategy: DepthStrategy, max_subs: usize) -> Self {
        Self {
            strategy,
            max_subs,
            custom_depths: None,
            include_full_depth: false,
        }
    }

    pub fn with_custom_depths(mut self, depths: impl Into<String>) -> Self {
        self.custom_depths = Some(depths.into());
        self
    }

    pub fn with_full_depth(mut self, include: bool) -> Self {
        self.include_full_depth = include;
        self
    }
}

/// Median and standard deviation of the pixels inside one rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    pub median: f64,
    pub sigma: f64,
}

/// Statistics of both regions plus the derived SNR for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnrMeasurement {
    pub background: RegionStats,
    pub foreground: RegionStats,
    pub snr: f64,
}

impl SnrMeasurement {
    pub fn bg_median(&self) -> f64 {
        self.background.median
    }

    pub fn bg_sigma(&self) -> f64 {
        self.background.sigma
    }

    pub fn fg_median(&self) -> f64 {
        self.foreground.median
    }

    pub fn fg_sigma(&self) -> f64 {
        self.foreground.sigma
    }
}

/// Wall-clock durations of the processing stages of one job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JobTiming {
    pub integration: Seconds,
    pub star_removal: Seconds,
    pub stretch: Seconds,
}

impl Default for JobTiming {
    fn default() -> Self {
        Self {
            integration: Seconds::new(0.0),
            star_removal: Seconds::new(0.0),
            stretch: Seconds::new(0.0),
        }
    }
}

/// One measurement point of the depth sweep.
///
/// Created by the planner with only `label` and `depth` set, then completed
/// through `with_exposure`, `with_timing` and `with_measurement`. Each stage
/// consumes the previous value, so a job appended to the results is never
/// touched again.
///
/// # Examples
///
/// ```
/// use subframe_snr::core::domain::DepthJob;
/// use qtty::Seconds;
///
/// let job = DepthJob::new(24).with_exposure(Seconds::new(7200.0));
/// assert_eq!(job.label, "N24");
/// assert_eq!(job.total_exposure.value(), 7200.0);
/// assert_eq!(job.snr, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthJob {
    pub label: String,
    pub depth: usize,
    #[serde(rename = "totalExposureSeconds")]
    pub total_exposure: Seconds,
    #[serde(rename = "integrationTimeSeconds")]
    pub integration_time: Seconds,
    #[serde(rename = "starRemovalTimeSeconds")]
    pub star_removal_time: Seconds,
    #[serde(rename = "stretchTimeSeconds")]
    pub stretch_time: Seconds,
    pub bg_median: f64,
    pub fg_median: f64,
    pub fg_sigma: f64,
    pub snr: f64,
}

impl DepthJob {
    pub fn new(depth: usize) -> Self {
        Self {
            label: format!("N{}", depth),
            depth,
            total_exposure: Seconds::new(0.0),
            integration_time: Seconds::new(0.0),
            star_removal_time: Seconds::new(0.0),
            stretch_time: Seconds::new(0.0),
            bg_median: 0.0,
            fg_median: 0.0,
            fg_sigma: 0.0,
            snr: 0.0,
        }
    }

    pub fn with_exposure(mut self, total: Seconds) -> Self {
        self.total_exposure = total;
        self
    }

    pub fn with_timing(mut self, timing: JobTiming) -> Self {
        self.integration_time = timing.integration;
        self.star_removal_time = timing.star_removal;
        self.stretch_time = timing.stretch;
        self
    }

    pub fn with_measurement(mut self, measurement: &SnrMeasurement) -> Self {
        self.bg_median = measurement.bg_median();
        self.fg_median = measurement.fg_median();
        self.fg_sigma = measurement.fg_sigma();
        self.snr = measurement.snr;
        self
    }

    /// Total exposure in hours, as shown on graphs and in log lines.
    pub fn exposure_hours(&self) -> f64 {
        self.total_exposure.value() / 3600.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_round_trip_names() {
        for strategy in [
            DepthStrategy::PresetOsc,
            DepthStrategy::Doubling,
            DepthStrategy::Fibonacci,
            DepthStrategy::Logarithmic,
            DepthStrategy::Custom,
        ] {
            assert_eq!(strategy.as_str().parse::<DepthStrategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let err = "quadratic".parse::<DepthStrategy>().unwrap_err();
        match err {
            AnalysisError::DepthStrategy { name } => assert_eq!(name, "quadratic"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_roi_pair_rejects_identical_rectangles() {
        let rect = Rectangle::new(0, 0, 10, 10).unwrap();
        assert!(RoiPair::new(rect, rect).is_err());

        let other = Rectangle::new(20, 20, 30, 30).unwrap();
        assert!(RoiPair::new(rect, other).is_ok());
    }

    #[test]
    fn test_rectangle_bounds() {
        let rect = Rectangle::new(5, 5, 15, 25).unwrap();
        assert!(rect.fits_within(15, 25));
        assert!(!rect.fits_within(14, 25));
        assert!(!rect.fits_within(15, 24));
    }

    #[test]
    fn test_depth_job_stages() {
        let measurement = SnrMeasurement {
            background: RegionStats {
                median: 0.2,
                sigma: 0.01,
            },
            foreground: RegionStats {
                median: 0.6,
                sigma: 0.1,
            },
            snr: 4.0,
        };
        let job = DepthJob::new(48)
            .with_exposure(Seconds::new(14400.0))
            .with_timing(JobTiming {
                integration: Seconds::new(12.5),
                star_removal: Seconds::new(0.0),
                stretch: Seconds::new(0.25),
            })
            .with_measurement(&measurement);

        assert_eq!(job.label, "N48");
        assert_eq!(job.exposure_hours(), 4.0);
        assert_eq!(job.integration_time.value(), 12.5);
        assert_eq!(job.bg_median, 0.2);
        assert_eq!(job.fg_sigma, 0.1);
        assert_eq!(job.snr, 4.0);
    }

    #[test]
    fn test_depth_job_json_field_names() {
        let job = DepthJob::new(12).with_exposure(Seconds::new(3600.0));
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["label"], "N12");
        assert_eq!(json["totalExposureSeconds"], 3600.0);
        assert!(json.get("fgSigma").is_some());
        assert!(json.get("starRemovalTimeSeconds").is_some());
    }
}
