use anyhow::{Context, Result};
use qtty::Seconds;
use std::path::Path;

use crate::core::domain::DepthJob;
use crate::io::export::{AnalysisReport, CSV_HEADER};

/// Parse a structured report written by the exporter.
pub fn parse_report(json_path: &Path) -> Result<AnalysisReport> {
    let content = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read report: {}", json_path.display()))?;
    parse_report_str(&content)
}

/// Parse a structured report from a string.
pub fn parse_report_str(json: &str) -> Result<AnalysisReport> {
    let de = &mut serde_json::Deserializer::from_str(json);
    let report: AnalysisReport = serde_path_to_error::deserialize(de)
        .map_err(|e| anyhow::anyhow!("Invalid report at '{}': {}", e.path(), e.inner()))?;

    if report.results.windows(2).any(|w| w[0].depth >= w[1].depth) {
        anyhow::bail!("Report results are not in ascending depth order");
    }
    Ok(report)
}

/// Parse the tabular results file back into jobs.
pub fn parse_results_csv(csv_path: &Path) -> Result<Vec<DepthJob>> {
    let content = std::fs::read_to_string(csv_path)
        .with_context(|| format!("Failed to read CSV file: {}", csv_path.display()))?;
    parse_results_csv_str(&content)
}

/// Parse tabular results from a string.
pub fn parse_results_csv_str(csv: &str) -> Result<Vec<DepthJob>> {
    let mut lines = csv.lines().filter(|l| !l.trim().is_empty());
    let header = lines.next().context("CSV is empty")?;
    if header.trim() != CSV_HEADER {
        anyhow::bail!("Unexpected CSV header: {}", header);
    }

    lines
        .enumerate()
        .map(|(idx, line)| parse_row(line).with_context(|| format!("Invalid CSV row {}", idx + 1)))
        .collect()
}

fn parse_row(line: &str) -> Result<DepthJob> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 10 {
        anyhow::bail!("expected 10 columns, found {}", fields.len());
    }

    let number = |i: usize| -> Result<f64> {
        fields[i]
            .parse::<f64>()
            .with_context(|| format!("column {} is not a number: '{}'", i + 1, fields[i]))
    };

    let depth: usize = fields[1]
        .parse()
        .with_context(|| format!("nSubs is not a count: '{}'", fields[1]))?;

    let mut job = DepthJob::new(depth);
    job.label = fields[0].to_string();
    job.total_exposure = Seconds::new(number(2)?);
    job.integration_time = Seconds::new(number(3)?);
    job.star_removal_time = Seconds::new(number(4)?);
    job.stretch_time = Seconds::new(number(5)?);
    job.bg_median = number(6)?;
    job.fg_median = number(7)?;
    job.fg_sigma = number(8)?;
    job.snr = number(9)?;
    Ok(job)
}
