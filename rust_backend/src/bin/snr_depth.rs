//! Integration depth SNR analysis.
//!
//! Stacks increasing numbers of subframes, measures the SNR of a foreground
//! region against a background region at each depth, and reports where more
//! integration stops paying off.
//!
//! # Usage
//!
//! ```bash
//! # Settings from ./snr_depth.toml (or defaults), regions confirmed interactively
//! cargo run --bin snr-depth -- --input-dir /data/M31 --pattern "Light_*.tif"
//!
//! # Headless run with stored regions and a custom depth list
//! cargo run --bin snr-depth -- --config m31.toml --non-interactive \
//!     --strategy custom --custom-depths "10,20,40,80"
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use subframe_snr::config::AnalysisSettings;
use subframe_snr::integration::{AverageIntegrator, FileFrameLoader, StarNetRemover, StarRemovalMethod};
use subframe_snr::io::graph::SvgGraphRenderer;
use subframe_snr::io::loaders::SubframeLoader;
use subframe_snr::roi::{CatalogRoiProvider, InteractiveRoiProvider, RoiProvider};
use subframe_snr::services::sweep::{AnalysisPipeline, GroupOutcome};

#[derive(Parser)]
#[command(name = "snr-depth")]
#[command(about = "Measure how SNR grows with integration depth")]
#[command(version)]
struct Args {
    /// Settings file (default: snr_depth.toml or config/snr_depth.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the subframes
    #[arg(short, long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Glob matched against subframe file names
    #[arg(short, long)]
    pattern: Option<String>,

    /// JSON manifest listing subframes, exposures and filters
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Depth strategy: preset_osc, doubling, fibonacci, logarithmic or custom
    #[arg(short, long)]
    strategy: Option<String>,

    /// Largest depth to test
    #[arg(short, long)]
    max_subs: Option<usize>,

    /// Comma-separated depths for the custom strategy
    #[arg(long)]
    custom_depths: Option<String>,

    /// Always measure the full depth as the last point
    #[arg(long)]
    include_full_depth: bool,

    /// Run one sweep per filter
    #[arg(long)]
    all_filters: bool,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Region catalog file
    #[arg(long, value_name = "FILE")]
    regions: Option<PathBuf>,

    /// Use stored regions without prompting
    #[arg(long)]
    non_interactive: bool,

    /// Measure without the automatic stretch
    #[arg(long)]
    no_stretch: bool,

    /// Skip the SNR graph
    #[arg(long)]
    no_graph: bool,
}

impl Args {
    fn apply_to(&self, settings: &mut AnalysisSettings) {
        if let Some(dir) = &self.input_dir {
            settings.input.dir = dir.clone();
        }
        if let Some(pattern) = &self.pattern {
            settings.input.file_pattern = pattern.clone();
        }
        if let Some(manifest) = &self.manifest {
            settings.input.manifest = Some(manifest.clone());
        }
        if let Some(strategy) = &self.strategy {
            settings.depths.strategy = strategy.clone();
        }
        if let Some(max) = self.max_subs {
            settings.depths.max_subs = Some(max);
        }
        if let Some(custom) = &self.custom_depths {
            settings.depths.custom = Some(custom.clone());
        }
        if let Some(dir) = &self.output_dir {
            settings.output.dir = dir.clone();
        }
        if let Some(regions) = &self.regions {
            settings.roi.regions_file = regions.clone();
        }
        settings.depths.include_full_depth |= self.include_full_depth;
        settings.input.analyze_all_filters |= self.all_filters;
        if self.non_interactive {
            settings.roi.interactive = false;
        }
        if self.no_stretch {
            settings.processing.apply_stretch = false;
        }
        if self.no_graph {
            settings.output.render_graph = false;
        }
    }
}

fn load_settings(args: &Args) -> Result<AnalysisSettings> {
    let mut settings = match &args.config {
        Some(path) => AnalysisSettings::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => AnalysisSettings::from_default_location()?.unwrap_or_default(),
    };
    args.apply_to(&mut settings);
    Ok(settings)
}

fn report(outcome: &GroupOutcome) {
    let name = if outcome.label_suffix.is_empty() {
        "all subframes"
    } else {
        outcome.label_suffix.trim_start_matches('_')
    };
    info!("== {} ==", name);
    for job in &outcome.report.results {
        info!(
            "{:>8}  {:>5} subs  {:>7.2} h  SNR {:>8.4}",
            job.label,
            job.depth,
            job.exposure_hours(),
            job.snr
        );
    }
    for failure in &outcome.report.failures {
        warn!("{} skipped: {}", failure.label, failure.message);
    }
    match outcome.report.diminishing_returns_depth {
        Some(depth) => info!("Diminishing returns from {} subs", depth),
        None => info!("No diminishing-returns point within the tested depths"),
    }
    for path in outcome.export.written.iter().chain(outcome.graph.iter()) {
        info!("Wrote {}", path.display());
    }
}

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let settings = load_settings(&args)?;

    let loaded = SubframeLoader::load(&settings.input).context("Failed to collect subframes")?;
    let reference = loaded
        .subframes
        .first()
        .map(|s| s.file_name())
        .unwrap_or_default();

    let mut engine = AverageIntegrator::new(FileFrameLoader);
    let mut star_remover = match (settings.starless_enabled()?, settings.star_removal_method()?) {
        (true, StarRemovalMethod::StarNet) => {
            let command = settings.processing.starnet_command.as_deref().unwrap_or_default();
            Some(StarNetRemover::new(command)?)
        }
        _ => None,
    };
    let mut roi_provider: Box<dyn RoiProvider> = if settings.roi.interactive {
        Box::new(
            InteractiveRoiProvider::new(&settings.roi.regions_file, io::stdin().lock(), io::stdout())
                .with_reference_image(reference),
        )
    } else {
        Box::new(CatalogRoiProvider::new(&settings.roi.regions_file))
    };
    let renderer = SvgGraphRenderer::default();

    let mut pipeline = AnalysisPipeline::new(&settings, &mut engine, roi_provider.as_mut())
        .with_renderer(&renderer);
    if let Some(remover) = star_remover.as_mut() {
        pipeline = pipeline.with_star_remover(remover);
    }

    let outcomes = pipeline
        .run(loaded.subframes)
        .context("Analysis aborted")?;

    for outcome in &outcomes {
        report(outcome);
    }
    if outcomes.iter().any(|o| !o.export.is_complete()) {
        anyhow::bail!("Some outputs could not be written");
    }
    Ok(())
}
