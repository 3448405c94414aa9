//! Depth planning: which sub-counts get integrated and measured.
//!
//! Every strategy yields a strictly increasing list of depths bounded by
//! `max_subs`. The optional full-depth flag appends `max_subs` itself.

use std::collections::BTreeSet;
use std::num::IntErrorKind;

use crate::core::domain::{AnalysisConfig, DepthJob, DepthStrategy};
use crate::core::error::{AnalysisError, AnalysisResult};

/// Fixed depths tuned for one-shot-colour sessions.
pub const PRESET_OSC_DEPTHS: [usize; 7] = [12, 24, 48, 96, 192, 384, 720];

/// First depth of the doubling, Fibonacci and logarithmic sequences.
pub const BASE_DEPTH: usize = 8;

/// Number of samples in the logarithmic strategy.
pub const LOGARITHMIC_POINTS: usize = 7;

/// Ordered depth jobs plus the non-fatal issues found while planning.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthPlan {
    pub jobs: Vec<DepthJob>,
    pub warnings: Vec<String>,
}

impl DepthPlan {
    pub fn depths(&self) -> Vec<usize> {
        self.jobs.iter().map(|j| j.depth).collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Builds depth plans from an [`AnalysisConfig`].
pub struct DepthPlanner;

impl DepthPlanner {
    /// Plan the depth sweep for `config`.
    ///
    /// # Errors
    /// * `CustomDepth` when the custom list is empty or has no usable entry
    /// * `InvalidConfig` when `max_subs` is zero
    ///
    /// # Examples
    ///
    /// ```
    /// use subframe_snr::algorithms::depth_plan::DepthPlanner;
    /// use subframe_snr::core::domain::{AnalysisConfig, DepthStrategy};
    ///
    /// let config = AnalysisConfig::new(DepthStrategy::Doubling, 40).with_full_depth(true);
    /// let plan = DepthPlanner::plan(&config).unwrap();
    /// assert_eq!(plan.depths(), vec![8, 16, 32, 40]);
    /// ```
    pub fn plan(config: &AnalysisConfig) -> AnalysisResult<DepthPlan> {
        let max_subs = config.max_subs;
        if max_subs == 0 {
            return Err(AnalysisError::InvalidConfig(
                "maxSubs must be at least 1".to_string(),
            ));
        }

        let mut warnings = Vec::new();
        let mut depths = match config.strategy {
            DepthStrategy::PresetOsc => preset_osc_depths(max_subs),
            DepthStrategy::Doubling => doubling_depths(max_subs),
            DepthStrategy::Fibonacci => fibonacci_depths(max_subs),
            DepthStrategy::Logarithmic => logarithmic_depths(max_subs),
            DepthStrategy::Custom => {
                let input = config.custom_depths.as_deref().unwrap_or("");
                let (depths, custom_warnings) = parse_custom_depths(input, max_subs)?;
                warnings.extend(custom_warnings);
                depths
            }
        };

        if config.include_full_depth && !depths.contains(&max_subs) {
            depths.push(max_subs);
            depths.sort_unstable();
        }

        if depths.is_empty() {
            let msg = format!(
                "strategy {} produced no depth for maxSubs={}, measuring the full stack only",
                config.strategy, max_subs
            );
            log::warn!("{}", msg);
            warnings.push(msg);
            depths.push(max_subs);
        }

        log::info!(
            "Depth plan ({}, maxSubs={}): {:?}",
            config.strategy,
            max_subs,
            depths
        );

        Ok(DepthPlan {
            jobs: depths.into_iter().map(DepthJob::new).collect(),
            warnings,
        })
    }

    /// Plan from a strategy name, as read from settings or the command line.
    ///
    /// # Errors
    /// `DepthStrategy` when the name is not one of the known strategies, plus
    /// everything [`DepthPlanner::plan`] can return.
    pub fn plan_named(
        strategy: &str,
        max_subs: usize,
        custom_depths: Option<&str>,
        include_full_depth: bool,
    ) -> AnalysisResult<DepthPlan> {
        let config = AnalysisConfig {
            strategy: strategy.parse()?,
            max_subs,
            custom_depths: custom_depths.map(str::to_string),
            include_full_depth,
        };
        Self::plan(&config)
    }
}

/// Preset values that fit, or a single fallback job when none does.
pub fn preset_osc_depths(max_subs: usize) -> Vec<usize> {
    let depths: Vec<usize> = PRESET_OSC_DEPTHS
        .iter()
        .copied()
        .filter(|&d| d <= max_subs)
        .collect();
    if depths.is_empty() && max_subs >= BASE_DEPTH {
        return vec![max_subs.min(PRESET_OSC_DEPTHS[0])];
    }
    depths
}

/// 8, 16, 32, ... up to `max_subs`.
pub fn doubling_depths(max_subs: usize) -> Vec<usize> {
    let mut depths = Vec::new();
    let mut d = BASE_DEPTH;
    while d <= max_subs {
        depths.push(d);
        d *= 2;
    }
    if depths.is_empty() && max_subs >= 4 {
        depths.push(max_subs.min(BASE_DEPTH));
    }
    depths
}

/// Fibonacci recurrence seeded with (8, 13).
pub fn fibonacci_depths(max_subs: usize) -> Vec<usize> {
    let mut depths = Vec::new();
    if max_subs >= BASE_DEPTH {
        depths.push(BASE_DEPTH);
    }
    let (mut a, mut b) = (BASE_DEPTH, 13usize);
    while b <= max_subs {
        depths.push(b);
        let next = a + b;
        a = b;
        b = next;
    }
    depths
}

/// Seven points spaced evenly in log space between `min(8, max_subs)` and `max_subs`.
pub fn logarithmic_depths(max_subs: usize) -> Vec<usize> {
    let start = BASE_DEPTH.min(max_subs);
    if max_subs <= start {
        return vec![max_subs];
    }

    let ln_start = (start as f64).ln();
    let ln_end = (max_subs as f64).ln();
    let step = (ln_end - ln_start) / (LOGARITHMIC_POINTS - 1) as f64;

    let mut depths: Vec<usize> = Vec::with_capacity(LOGARITHMIC_POINTS);
    for i in 0..LOGARITHMIC_POINTS {
        let d = (ln_start + step * i as f64).exp().round() as usize;
        if d == 0 || d > max_subs {
            continue;
        }
        if depths.last().is_some_and(|&last| last >= d) {
            continue;
        }
        depths.push(d);
    }
    depths
}

/// Parse a comma-separated custom depth list.
///
/// Entries that are not positive integers are dropped with a warning; values
/// above `max_subs` are clamped; duplicates are removed and the result sorted.
/// Blank entries (e.g. from a trailing comma) are ignored.
///
/// # Errors
/// `CustomDepth` when the input is blank or nothing usable remains.
///
/// # Examples
///
/// ```
/// use subframe_snr::algorithms::depth_plan::parse_custom_depths;
///
/// let (depths, warnings) = parse_custom_depths("5,5,-1,abc,300", 50).unwrap();
/// assert_eq!(depths, vec![5, 50]);
/// assert_eq!(warnings.len(), 2);
/// ```
pub fn parse_custom_depths(input: &str, max_subs: usize) -> AnalysisResult<(Vec<usize>, Vec<String>)> {
    if input.trim().is_empty() {
        return Err(AnalysisError::CustomDepth {
            input: input.to_string(),
            reason: "custom depth list is empty".to_string(),
        });
    }

    let mut warnings = Vec::new();
    let mut depths = BTreeSet::new();

    for token in input.split(',').map(str::trim) {
        if token.is_empty() {
            continue;
        }
        match token.parse::<i64>() {
            Ok(v) if v > 0 => {
                let v = v as usize;
                if v > max_subs {
                    log::info!("Custom depth {} exceeds maxSubs, clamped to {}", v, max_subs);
                    depths.insert(max_subs);
                } else {
                    depths.insert(v);
                }
            }
            Ok(v) => {
                let msg = format!("Ignoring non-positive custom depth: {}", v);
                log::warn!("{}", msg);
                warnings.push(msg);
            }
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
                log::info!("Custom depth {} exceeds maxSubs, clamped to {}", token, max_subs);
                depths.insert(max_subs);
            }
            Err(e) if *e.kind() == IntErrorKind::NegOverflow => {
                let msg = format!("Ignoring non-positive custom depth: {}", token);
                log::warn!("{}", msg);
                warnings.push(msg);
            }
            Err(_) => {
                let msg = format!("Ignoring non-numeric custom depth: '{}'", token);
                log::warn!("{}", msg);
                warnings.push(msg);
            }
        }
    }

    if depths.is_empty() {
        return Err(AnalysisError::CustomDepth {
            input: input.to_string(),
            reason: "no valid positive depth found".to_string(),
        });
    }

    Ok((depths.into_iter().collect(), warnings))
}
