//! Loading subframes and writing results.
//!
//! This module provides the file-facing side of the analysis: discovering
//! the subframe list, writing the tabular and structured results, and
//! drawing the SNR graph.
//!
//! # Example
//!
//! ```no_run
//! use subframe_snr::config::InputSettings;
//! use subframe_snr::io::loaders::SubframeLoader;
//!
//! let loaded = SubframeLoader::load(&InputSettings::default())
//!     .expect("Failed to load");
//! println!("Loaded {} subframes", loaded.subframes.len());
//! ```

pub mod export;
pub mod graph;
pub mod loaders;

#[cfg(test)]
mod loaders_tests;

pub use export::{AnalysisReport, Exporter, ReportSettings};
pub use graph::{GraphRenderer, SvgGraphRenderer};
pub use loaders::{SubframeLoadResult, SubframeLoader, SubframeSource};
