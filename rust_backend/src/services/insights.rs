//! Results aggregation and diminishing-returns insights.
//!
//! Completed jobs arrive in ascending depth order. Each consecutive pair
//! becomes one [`Insight`] comparing the measured relative SNR change with the
//! √N change expected from pure noise averaging. The first transition whose
//! relative gain falls below the threshold marks the diminishing-returns depth.

use serde::{Deserialize, Serialize};

use crate::core::domain::DepthJob;

/// Relative gain below which another step in depth is considered not worth it.
pub const DEFAULT_DIMINISHING_THRESHOLD: f64 = 0.10;

/// Comparison of two consecutive depths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub from_label: String,
    pub to_label: String,
    pub from_depth: usize,
    pub to_depth: usize,
    pub snr_gain: f64,
    pub relative_gain: f64,
    pub ideal_relative_gain: f64,
    pub efficiency: f64,
    pub below_threshold: bool,
}

/// Everything derived from one ordered result list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSummary {
    pub insights: Vec<Insight>,
    pub diminishing_returns_depth: Option<usize>,
    /// False when fewer than two points exist; graphing is skipped.
    pub graphable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Collects completed jobs in ascending depth order.
#[derive(Debug, Clone)]
pub struct ResultsAggregator {
    threshold: f64,
    results: Vec<DepthJob>,
}

impl Default for ResultsAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_DIMINISHING_THRESHOLD)
    }
}

impl ResultsAggregator {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            results: Vec::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Append a completed job.
    ///
    /// Jobs are expected in plan order; one arriving out of order is
    /// inserted at its depth position.
    pub fn push(&mut self, job: DepthJob) {
        match self.results.last() {
            Some(last) if last.depth >= job.depth => {
                log::warn!(
                    "{} arrived after {}, inserting in depth order",
                    job.label,
                    last.label
                );
                let pos = self.results.partition_point(|j| j.depth < job.depth);
                self.results.insert(pos, job);
            }
            _ => self.results.push(job),
        }
    }

    pub fn results(&self) -> &[DepthJob] {
        &self.results
    }

    pub fn into_results(self) -> Vec<DepthJob> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn summarize(&self) -> InsightSummary {
        compute_insights(&self.results, self.threshold)
    }
}

/// Derive transition insights from ordered results.
pub fn compute_insights(results: &[DepthJob], threshold: f64) -> InsightSummary {
    if results.len() < 2 {
        log::info!(
            "{} result(s), no depth transitions to compare",
            results.len()
        );
        return InsightSummary::default();
    }

    let mut insights = Vec::with_capacity(results.len() - 1);
    let mut warnings = Vec::new();

    for pair in results.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        if from.snr == 0.0 {
            let msg = format!(
                "Skipping {} -> {}: relative gain from zero SNR is undefined",
                from.label, to.label
            );
            log::warn!("{}", msg);
            warnings.push(msg);
            continue;
        }

        let snr_gain = to.snr - from.snr;
        let relative_gain = snr_gain / from.snr;
        let ideal_relative_gain = (to.depth as f64 / from.depth as f64).sqrt() - 1.0;
        let efficiency = if ideal_relative_gain > 0.0 {
            relative_gain / ideal_relative_gain
        } else {
            0.0
        };

        insights.push(Insight {
            from_label: from.label.clone(),
            to_label: to.label.clone(),
            from_depth: from.depth,
            to_depth: to.depth,
            snr_gain,
            relative_gain,
            ideal_relative_gain,
            efficiency,
            below_threshold: relative_gain < threshold,
        });
    }

    let diminishing_returns_depth = insights
        .iter()
        .find(|i| i.below_threshold)
        .map(|i| i.to_depth);

    match diminishing_returns_depth {
        Some(depth) => log::info!(
            "Diminishing returns at {} subs (relative gain below {:.0}%)",
            depth,
            threshold * 100.0
        ),
        None => log::info!(
            "Relative gain stayed above {:.0}% across all depths",
            threshold * 100.0
        ),
    }

    InsightSummary {
        insights,
        diminishing_returns_depth,
        graphable: true,
        warnings,
    }
}
