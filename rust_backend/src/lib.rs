//! # Subframe SNR
//!
//! Integration depth analysis for astrophotography subframes.
//!
//! The crate stacks growing prefixes of an ordered subframe list, applies the
//! same automatic stretch to every stack, and measures a foreground region
//! against a background region. The resulting SNR curve shows how much each
//! additional block of exposure time still improves the image.
//!
//! ## Features
//!
//! - **Depth Planning**: Preset, doubling, Fibonacci, logarithmic and custom depth sequences
//! - **Measurement**: Automatic stretch and median/sigma region statistics
//! - **Regions of Interest**: Stored region catalogs with interactive confirmation
//! - **Insights**: Relative gain per depth step and the diminishing-returns point
//! - **Outputs**: CSV and JSON results plus an SVG graph
//!
//! ## Architecture
//!
//! - [`core`]: Domain types, image buffer and error enumeration
//! - [`algorithms`]: Depth planner, exposure accumulation, stretch and SNR
//! - [`roi`]: Region catalog and providers
//! - [`integration`]: Stacking and star removal capabilities
//! - [`services`]: Depth sweep, aggregation and the full run
//! - [`io`]: Subframe discovery, exporters and graph rendering
//! - [`parsing`]: Manifest and report parsers
//! - [`config`]: TOML settings
//!
//! Reported SNR is measured on stretched data. It compares depths within
//! one run and is not a photometric signal-to-noise ratio.

pub mod algorithms;
pub mod checksum;
pub mod config;
pub mod core;
pub mod integration;
pub mod io;
pub mod parsing;
pub mod roi;
pub mod services;

pub use crate::core::error::{AnalysisError, AnalysisResult};
