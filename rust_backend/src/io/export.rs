//! Tabular and structured output of a depth sweep.
//!
//! The CSV file has one row per measured job with a fixed column order. The
//! JSON file wraps the same rows in an envelope with the settings, regions,
//! insights and failures of the run so it can be read back later.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AnalysisSettings;
use crate::core::domain::{AnalysisConfig, DepthJob, DepthStrategy, RoiPair};
use crate::core::error::{AnalysisError, AnalysisResult};
use crate::integration::StarRemovalMethod;
use crate::services::insights::{Insight, InsightSummary};
use crate::services::sweep::JobFailure;

/// Envelope format version.
pub const REPORT_VERSION: &str = "1.0";

pub const CSV_HEADER: &str =
    "label,nSubs,totalExposure_s,intTime_s,starRemovalTime_s,stretchTime_s,bgMedian,fgMedian,fgSigma,snr";

/// Settings snapshot stored in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSettings {
    pub input_dir: String,
    pub file_pattern: String,
    pub analyze_all_filters: bool,
    pub depth_strategy: DepthStrategy,
    pub custom_depths: Option<String>,
    pub generate_starless: bool,
    pub star_removal_method: StarRemovalMethod,
    pub apply_stretch: bool,
    pub max_subs: usize,
    pub include_full_depth: bool,
}

impl ReportSettings {
    pub fn new(settings: &AnalysisSettings, config: &AnalysisConfig) -> AnalysisResult<Self> {
        Ok(Self {
            input_dir: settings.input.dir.display().to_string(),
            file_pattern: settings.input.file_pattern.clone(),
            analyze_all_filters: settings.input.analyze_all_filters,
            depth_strategy: config.strategy,
            custom_depths: config.custom_depths.clone(),
            generate_starless: settings.processing.generate_starless,
            star_removal_method: settings.star_removal_method()?,
            apply_stretch: settings.processing.apply_stretch,
            max_subs: config.max_subs,
            include_full_depth: config.include_full_depth,
        })
    }
}

/// Structured output of one sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub version: String,
    pub timestamp: String,
    pub settings: ReportSettings,
    pub rois: RoiPair,
    pub results: Vec<DepthJob>,
    pub insights: Vec<Insight>,
    pub diminishing_returns_depth: Option<usize>,
    #[serde(default)]
    pub failures: Vec<JobFailure>,
    #[serde(default)]
    pub input_checksum: String,
}

impl AnalysisReport {
    pub fn new(
        settings: ReportSettings,
        rois: RoiPair,
        results: Vec<DepthJob>,
        summary: InsightSummary,
        failures: Vec<JobFailure>,
        input_checksum: String,
    ) -> Self {
        Self {
            version: REPORT_VERSION.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            settings,
            rois,
            results,
            insights: summary.insights,
            diminishing_returns_depth: summary.diminishing_returns_depth,
            failures,
            input_checksum,
        }
    }
}

/// One CSV row.
pub fn csv_row(job: &DepthJob) -> String {
    format!(
        "{},{},{:.1},{:.2},{:.2},{:.2},{:.8},{:.8},{:.8},{:.4}",
        job.label,
        job.depth,
        job.total_exposure.value(),
        job.integration_time.value(),
        job.star_removal_time.value(),
        job.stretch_time.value(),
        job.bg_median,
        job.fg_median,
        job.fg_sigma,
        job.snr
    )
}

/// Header plus one row per job, newline terminated.
pub fn results_to_csv(results: &[DepthJob]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + results.len() * 96);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for job in results {
        out.push_str(&csv_row(job));
        out.push('\n');
    }
    out
}

fn ensure_parent_dir(path: &Path) -> AnalysisResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
        }
    }
    Ok(())
}

pub fn write_csv(path: &Path, results: &[DepthJob]) -> AnalysisResult<()> {
    ensure_parent_dir(path)?;
    fs::write(path, results_to_csv(results)).map_err(|e| AnalysisError::io(path, e))
}

pub fn write_json(path: &Path, report: &AnalysisReport) -> AnalysisResult<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| AnalysisError::io(path, std::io::Error::other(e)))?;
    fs::write(path, json).map_err(|e| AnalysisError::io(path, e))
}

/// Files written and errors hit by one export.
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub written: Vec<PathBuf>,
    pub errors: Vec<AnalysisError>,
}

impl ExportSummary {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Writes both formats into one output directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn csv_path(&self, label_suffix: &str) -> PathBuf {
        self.output_dir.join(format!("snr_results{}.csv", label_suffix))
    }

    pub fn json_path(&self, label_suffix: &str) -> PathBuf {
        self.output_dir.join(format!("snr_results{}.json", label_suffix))
    }

    /// Write CSV and JSON; a failure in one does not stop the other.
    pub fn export(&self, report: &AnalysisReport, label_suffix: &str) -> ExportSummary {
        let mut summary = ExportSummary::default();

        let csv_path = self.csv_path(label_suffix);
        match write_csv(&csv_path, &report.results) {
            Ok(()) => {
                log::info!("Results written to {}", csv_path.display());
                summary.written.push(csv_path);
            }
            Err(e) => {
                log::warn!("{}", e);
                summary.errors.push(e);
            }
        }

        let json_path = self.json_path(label_suffix);
        match write_json(&json_path, report) {
            Ok(()) => {
                log::info!("Report written to {}", json_path.display());
                summary.written.push(json_path);
            }
            Err(e) => {
                log::warn!("{}", e);
                summary.errors.push(e);
            }
        }

        summary
    }
}
