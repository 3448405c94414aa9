//! Service layer for running the analysis.
//!
//! This module sits between the numeric algorithms and the binary. It runs
//! the depth sweep, aggregates the results into insights and hands them to
//! the exporters.

pub mod insights;
pub mod sweep;

#[cfg(test)]
mod insights_tests;

pub use insights::{Insight, InsightSummary, ResultsAggregator};
pub use sweep::{AnalysisPipeline, DepthSweep, GroupOutcome, JobFailure, SweepConfig};
