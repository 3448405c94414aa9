//! SNR-versus-depth chart.

use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::domain::DepthJob;
use crate::core::error::{AnalysisError, AnalysisResult};

/// Draws the results of one sweep into a viewable file.
pub trait GraphRenderer {
    /// Returns the path of the written file.
    fn render(
        &self,
        results: &[DepthJob],
        output_dir: &Path,
        label_suffix: &str,
        title: &str,
    ) -> AnalysisResult<PathBuf>;
}

/// Measured SNR plus an ideal √N curve anchored at the first point.
#[derive(Debug, Clone, Copy)]
pub struct SvgGraphRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgGraphRenderer {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
        }
    }
}

/// File name of the graph for a label suffix.
pub fn graph_file_name(label_suffix: &str) -> String {
    format!("snr_graph{}.svg", label_suffix)
}

/// `snr₀ · √(n / n₀)` evaluated at each result depth.
pub fn ideal_curve(results: &[DepthJob]) -> Vec<(f64, f64)> {
    let Some(first) = results.first() else {
        return Vec::new();
    };
    let n0 = first.depth as f64;
    results
        .iter()
        .map(|j| (j.depth as f64, first.snr * (j.depth as f64 / n0).sqrt()))
        .collect()
}

fn draw_error<E: std::fmt::Display>(path: &Path, e: E) -> AnalysisError {
    AnalysisError::io(path, std::io::Error::other(e.to_string()))
}

impl GraphRenderer for SvgGraphRenderer {
    fn render(
        &self,
        results: &[DepthJob],
        output_dir: &Path,
        label_suffix: &str,
        title: &str,
    ) -> AnalysisResult<PathBuf> {
        if results.len() < 2 {
            return Err(AnalysisError::InvalidConfig(format!(
                "graph needs at least 2 results, got {}",
                results.len()
            )));
        }
        fs::create_dir_all(output_dir).map_err(|e| AnalysisError::io(output_dir, e))?;
        let path = output_dir.join(graph_file_name(label_suffix));

        let measured: Vec<(f64, f64)> = results
            .iter()
            .map(|j| (j.depth as f64, j.snr))
            .collect();
        let ideal = ideal_curve(results);

        let x_max = measured.iter().map(|p| p.0).fold(0.0, f64::max) * 1.05;
        let (y_min, y_max) = measured
            .iter()
            .chain(ideal.iter())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.1), hi.max(p.1))
            });
        let pad = ((y_max - y_min) * 0.1).max(0.1);
        let y_range = (y_min.min(0.0) - pad)..(y_max + pad);

        {
            let root = SVGBackend::new(&path, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE).map_err(|e| draw_error(&path, e))?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 24))
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(55)
                .build_cartesian_2d(0.0..x_max, y_range)
                .map_err(|e| draw_error(&path, e))?;

            chart
                .configure_mesh()
                .x_desc("Subframes integrated")
                .y_desc("SNR (stretched)")
                .x_label_formatter(&|x| format!("{x:.0}"))
                .y_label_formatter(&|y| format!("{y:.2}"))
                .draw()
                .map_err(|e| draw_error(&path, e))?;

            chart
                .draw_series(LineSeries::new(
                    ideal.clone(),
                    BLACK.mix(0.4).stroke_width(1),
                ))
                .map_err(|e| draw_error(&path, e))?
                .label("ideal √N")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], BLACK.mix(0.4)));

            chart
                .draw_series(LineSeries::new(measured.clone(), &BLUE))
                .map_err(|e| draw_error(&path, e))?
                .label("measured")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], BLUE));

            chart
                .draw_series(
                    measured
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())),
                )
                .map_err(|e| draw_error(&path, e))?;

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(|e| draw_error(&path, e))?;

            root.present().map_err(|e| draw_error(&path, e))?;
        }

        log::info!("Graph written to {}", path.display());
        Ok(path)
    }
}
