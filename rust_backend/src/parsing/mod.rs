//! Parsers for the JSON and CSV files around an analysis run.
//!
//! # Parsers
//!
//! - [`manifest`]: Subframe manifest with per-sub exposure and filter
//! - [`report_parser`]: Read back the results written by the exporter
//!
//! # Example
//!
//! ```no_run
//! use subframe_snr::parsing::report_parser::parse_report;
//! use std::path::Path;
//!
//! let report = parse_report(Path::new("snr_analysis/snr_results.json"))
//!     .expect("Failed to parse report");
//! println!("{} depths measured", report.results.len());
//! ```

pub mod manifest;
pub mod report_parser;

#[cfg(test)]
mod manifest_tests;

pub use manifest::ManifestEntry;
