//! The depth sweep and the top-level analysis run.
//!
//! A sweep takes the planned jobs of one subframe group and, strictly one
//! after another, integrates the first `depth` subframes, optionally removes
//! stars, stretches, measures the two regions and appends the completed job.
//! A job that fails with an image, integration or SNR error is recorded as a
//! [`JobFailure`] and left out of the results; the sweep moves on.
//!
//! [`AnalysisPipeline`] wraps one or more sweeps (one per filter group) with
//! planning, region acquisition and export.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;

use qtty::Seconds;

use crate::algorithms::{accumulate, measure, DepthPlanner, StretchNormalizer};
use crate::checksum::subframes_checksum;
use crate::config::AnalysisSettings;
use crate::core::domain::{AnalysisConfig, DepthJob, JobTiming, RoiPair, Subframe};
use crate::core::error::{AnalysisError, AnalysisResult};
use crate::integration::{IntegrationEngine, StarRemover};
use crate::io::export::{AnalysisReport, ExportSummary, Exporter, ReportSettings};
use crate::io::graph::GraphRenderer;
use crate::roi::RoiProvider;
use crate::services::insights::{InsightSummary, ResultsAggregator, DEFAULT_DIMINISHING_THRESHOLD};

/// A job that was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFailure {
    pub label: String,
    pub depth: usize,
    pub message: String,
}

/// Per-job processing switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepConfig {
    pub apply_stretch: bool,
    pub generate_starless: bool,
    pub diminishing_threshold: f64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            apply_stretch: true,
            generate_starless: false,
            diminishing_threshold: DEFAULT_DIMINISHING_THRESHOLD,
        }
    }
}

/// Completed and failed jobs of one sweep plus their insights.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub results: Vec<DepthJob>,
    pub failures: Vec<JobFailure>,
    pub summary: InsightSummary,
}

/// Runs planned jobs against one subframe list.
pub struct DepthSweep<'a> {
    config: SweepConfig,
    engine: &'a mut dyn IntegrationEngine,
    star_remover: Option<&'a mut dyn StarRemover>,
    normalizer: StretchNormalizer,
}

impl<'a> DepthSweep<'a> {
    pub fn new(engine: &'a mut dyn IntegrationEngine) -> Self {
        Self {
            config: SweepConfig::default(),
            engine,
            star_remover: None,
            normalizer: StretchNormalizer::default(),
        }
    }

    pub fn with_config(mut self, config: SweepConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_star_remover(mut self, remover: &'a mut dyn StarRemover) -> Self {
        self.star_remover = Some(remover);
        self
    }

    pub fn with_normalizer(mut self, normalizer: StretchNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Process every job in order.
    ///
    /// # Errors
    /// Only run-terminating errors are returned; per-job errors become
    /// [`JobFailure`] entries.
    pub fn run(
        &mut self,
        jobs: Vec<DepthJob>,
        subframes: &[Subframe],
        rois: &RoiPair,
    ) -> AnalysisResult<SweepOutcome> {
        if self.config.generate_starless && self.star_remover.is_none() {
            log::warn!("Starless measurement requested without a star remover, measuring as-is");
        }

        let total = jobs.len();
        let mut aggregator = ResultsAggregator::new(self.config.diminishing_threshold);
        let mut failures = Vec::new();

        for (i, job) in jobs.into_iter().enumerate() {
            log::info!("[{}/{}] {} ({} subs)", i + 1, total, job.label, job.depth);
            let (label, depth) = (job.label.clone(), job.depth);
            match self.run_job(job, subframes, rois) {
                Ok(done) => {
                    log::info!(
                        "{}: {:.2} h, SNR {:.4}",
                        done.label,
                        done.exposure_hours(),
                        done.snr
                    );
                    aggregator.push(done);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::warn!("Skipping {}: {}", label, e);
                    failures.push(JobFailure {
                        label,
                        depth,
                        message: e.to_string(),
                    });
                }
            }
        }

        let summary = aggregator.summarize();
        Ok(SweepOutcome {
            results: aggregator.into_results(),
            failures,
            summary,
        })
    }

    /// Integrate, clean, stretch and measure a single job.
    pub fn run_job(
        &mut self,
        job: DepthJob,
        subframes: &[Subframe],
        rois: &RoiPair,
    ) -> AnalysisResult<DepthJob> {
        let n = job.depth.min(subframes.len());
        if n == 0 {
            return Err(AnalysisError::Integration(format!(
                "{}: no subframes available",
                job.label
            )));
        }
        let mut timing = JobTiming::default();

        let started = Instant::now();
        let mut image = self.engine.integrate(&subframes[..n])?;
        timing.integration = Seconds::new(started.elapsed().as_secs_f64());

        if self.config.generate_starless {
            if let Some(remover) = self.star_remover.as_mut() {
                let started = Instant::now();
                image = remover.remove_stars(&image)?;
                timing.star_removal = Seconds::new(started.elapsed().as_secs_f64());
            }
        }

        if self.config.apply_stretch {
            let started = Instant::now();
            let params = self.normalizer.normalize(&mut image);
            timing.stretch = Seconds::new(started.elapsed().as_secs_f64());
            log::debug!("{}: stretch {:?}", job.label, params);
        }

        log::debug!(
            "{}: integration {:.2}s, star removal {:.2}s, stretch {:.2}s",
            job.label,
            timing.integration.value(),
            timing.star_removal.value(),
            timing.stretch.value()
        );

        let measurement = measure(&image, rois, &job.label)?;
        Ok(job.with_timing(timing).with_measurement(&measurement))
    }
}

/// Subframes analysed together.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetGroup {
    pub filter: Option<String>,
    /// `_<filter>` for per-filter groups, empty otherwise.
    pub label_suffix: String,
    pub subframes: Vec<Subframe>,
}

/// Split subframes by filter in first-appearance order, or keep them together.
pub fn group_by_filter(subframes: Vec<Subframe>, analyze_all_filters: bool) -> Vec<TargetGroup> {
    if !analyze_all_filters {
        return vec![TargetGroup {
            filter: None,
            label_suffix: String::new(),
            subframes,
        }];
    }

    let mut groups: Vec<TargetGroup> = Vec::new();
    for sub in subframes {
        match groups.iter_mut().find(|g| g.filter == sub.filter) {
            Some(group) => group.subframes.push(sub),
            None => groups.push(TargetGroup {
                label_suffix: sub
                    .filter
                    .as_deref()
                    .map(|f| format!("_{}", f))
                    .unwrap_or_default(),
                filter: sub.filter.clone(),
                subframes: vec![sub],
            }),
        }
    }
    groups
}

/// Outcome of one group of a run.
#[derive(Debug)]
pub struct GroupOutcome {
    pub label_suffix: String,
    pub report: AnalysisReport,
    pub export: ExportSummary,
    pub graph: Option<PathBuf>,
    pub warnings: Vec<String>,
}

struct PlannedGroup {
    group: TargetGroup,
    config: AnalysisConfig,
    jobs: Vec<DepthJob>,
    warnings: Vec<String>,
}

/// Settings, collaborators and the full run.
pub struct AnalysisPipeline<'a> {
    settings: &'a AnalysisSettings,
    engine: &'a mut dyn IntegrationEngine,
    roi_provider: &'a mut dyn RoiProvider,
    star_remover: Option<&'a mut dyn StarRemover>,
    renderer: Option<&'a dyn GraphRenderer>,
}

impl<'a> AnalysisPipeline<'a> {
    pub fn new(
        settings: &'a AnalysisSettings,
        engine: &'a mut dyn IntegrationEngine,
        roi_provider: &'a mut dyn RoiProvider,
    ) -> Self {
        Self {
            settings,
            engine,
            roi_provider,
            star_remover: None,
            renderer: None,
        }
    }

    pub fn with_star_remover(mut self, remover: &'a mut dyn StarRemover) -> Self {
        self.star_remover = Some(remover);
        self
    }

    pub fn with_renderer(mut self, renderer: &'a dyn GraphRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Plan every group, acquire regions, then sweep and export each group.
    ///
    /// Planning and region errors abort before any frame is integrated.
    pub fn run(&mut self, subframes: Vec<Subframe>) -> AnalysisResult<Vec<GroupOutcome>> {
        for warning in self.settings.validate()? {
            log::warn!("{}", warning);
        }
        if subframes.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "no subframes to analyse".to_string(),
            ));
        }

        let planned = self.plan_groups(subframes)?;
        let rois = self.roi_provider.regions()?;
        log::info!("Background {} / foreground {}", rois.background, rois.foreground);

        let mut outcomes = Vec::with_capacity(planned.len());
        for group in planned {
            outcomes.push(self.run_group(group, &rois)?);
        }
        Ok(outcomes)
    }

    fn plan_groups(&self, subframes: Vec<Subframe>) -> AnalysisResult<Vec<PlannedGroup>> {
        let groups = group_by_filter(subframes, self.settings.input.analyze_all_filters);
        let mut planned = Vec::with_capacity(groups.len());

        for group in groups {
            let config = self.settings.analysis_config(group.subframes.len())?;
            let plan = DepthPlanner::plan(&config)?;
            log::info!(
                "Group '{}': {} subframes, depths {:?}",
                group.filter.as_deref().unwrap_or("all"),
                group.subframes.len(),
                plan.depths()
            );
            let jobs = accumulate(plan.jobs, &group.subframes);
            planned.push(PlannedGroup {
                group,
                config,
                jobs,
                warnings: plan.warnings,
            });
        }
        Ok(planned)
    }

    fn run_group(&mut self, planned: PlannedGroup, rois: &RoiPair) -> AnalysisResult<GroupOutcome> {
        let PlannedGroup {
            group,
            config,
            jobs,
            mut warnings,
        } = planned;

        let sweep_config = SweepConfig {
            apply_stretch: self.settings.processing.apply_stretch,
            generate_starless: self.settings.starless_enabled()?,
            diminishing_threshold: self.settings.output.diminishing_threshold,
        };
        let mut sweep = DepthSweep::new(&mut *self.engine).with_config(sweep_config);
        if let Some(remover) = self.star_remover.as_mut() {
            sweep = sweep.with_star_remover(&mut **remover);
        }
        let outcome = sweep.run(jobs, &group.subframes, rois)?;
        warnings.extend(outcome.summary.warnings.iter().cloned());

        let report = AnalysisReport::new(
            ReportSettings::new(self.settings, &config)?,
            *rois,
            outcome.results,
            outcome.summary.clone(),
            outcome.failures,
            subframes_checksum(&group.subframes),
        );

        let exporter = Exporter::new(&self.settings.output.dir);
        let export = exporter.export(&report, &group.label_suffix);

        let graph = match self.renderer {
            Some(renderer) if self.settings.output.render_graph && outcome.summary.graphable => {
                let title = match &group.filter {
                    Some(filter) => format!("SNR vs integration depth ({})", filter),
                    None => "SNR vs integration depth".to_string(),
                };
                match renderer.render(
                    &report.results,
                    exporter.output_dir(),
                    &group.label_suffix,
                    &title,
                ) {
                    Ok(path) => Some(path),
                    Err(e) => {
                        log::warn!("Graph not written: {}", e);
                        None
                    }
                }
            }
            Some(_) if !outcome.summary.graphable => {
                log::info!("Fewer than 2 results, skipping graph");
                None
            }
            _ => None,
        };

        Ok(GroupOutcome {
            label_suffix: group.label_suffix,
            report,
            export,
            graph,
            warnings,
        })
    }
}
