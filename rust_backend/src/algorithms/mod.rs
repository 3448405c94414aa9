//! Depth planning and measurement algorithms.
//!
//! This module provides the numeric core of the analysis: which depths to
//! test, how much exposure each depth represents, the automatic stretch, and
//! the region statistics behind the SNR figure.
//!
//! # Components
//!
//! - [`depth_plan`]: Depth sequence generation per strategy
//! - [`exposure`]: Cumulative exposure per depth
//! - [`stretch`]: Automatic nonlinear stretch (shadow clip + midtones transfer)
//! - [`snr`]: Region statistics and SNR
//! - [`statistics`]: Median, MAD, mean and standard deviation
//!
//! # Example
//!
//! ```
//! use subframe_snr::algorithms::DepthPlanner;
//! use subframe_snr::core::domain::{AnalysisConfig, DepthStrategy};
//!
//! let plan = DepthPlanner::plan(&AnalysisConfig::new(DepthStrategy::PresetOsc, 500)).unwrap();
//! assert_eq!(plan.depths(), vec![12, 24, 48, 96, 192, 384]);
//! ```

pub mod depth_plan;
pub mod exposure;
pub mod snr;
pub mod statistics;
pub mod stretch;


pub use depth_plan::{DepthPlan, DepthPlanner};
pub use exposure::accumulate;
pub use snr::{measure, measure_region, snr_from_stats};
pub use stretch::{StretchNormalizer, StretchParams};
