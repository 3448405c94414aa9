//! Core domain models for integration-depth analysis.
//!
//! This module defines the fundamental data structures used throughout the crate:
//! subframes, measurement regions, depth jobs, the image buffer, and the error type.

pub mod domain;
pub mod error;
pub mod image;

pub use domain::{
    AnalysisConfig, DepthJob, DepthStrategy, JobTiming, Rectangle, RegionStats, RoiPair,
    SnrMeasurement, Subframe,
};
pub use error::{AnalysisError, AnalysisResult};
pub use image::Image;
