//! Analysis settings file support.
//!
//! Settings are read from a TOML file with one table per concern. Every
//! field has a default so a partial file (or none at all) is valid. The
//! pipeline never reads these settings directly; it receives the explicit
//! values produced by [`AnalysisSettings::analysis_config`] and friends.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::domain::{AnalysisConfig, DepthStrategy};
use crate::core::error::{AnalysisError, AnalysisResult};
use crate::integration::StarRemovalMethod;
use crate::services::insights::DEFAULT_DIMINISHING_THRESHOLD;

/// Full settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    #[serde(default)]
    pub input: InputSettings,
    #[serde(default)]
    pub depths: DepthSettings,
    #[serde(default)]
    pub processing: ProcessingSettings,
    #[serde(default)]
    pub roi: RoiSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Where subframes come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSettings {
    #[serde(default = "default_input_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
    /// JSON manifest with per-sub exposure and filter; overrides the pattern.
    #[serde(default)]
    pub manifest: Option<PathBuf>,
    #[serde(default = "default_exposure_s")]
    pub default_exposure_s: f64,
    #[serde(default)]
    pub analyze_all_filters: bool,
}

/// Depth plan settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSettings {
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Upper bound on depth; the subframe count when unset.
    #[serde(default)]
    pub max_subs: Option<usize>,
    #[serde(default)]
    pub custom: Option<String>,
    #[serde(default)]
    pub include_full_depth: bool,
}

/// Per-job image processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSettings {
    #[serde(default = "default_true")]
    pub apply_stretch: bool,
    #[serde(default)]
    pub generate_starless: bool,
    #[serde(default = "default_star_removal_method")]
    pub star_removal_method: String,
    #[serde(default)]
    pub starnet_command: Option<String>,
}

/// Region of interest source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiSettings {
    #[serde(default = "default_regions_file")]
    pub regions_file: PathBuf,
    #[serde(default = "default_true")]
    pub interactive: bool,
}

/// Output files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_threshold")]
    pub diminishing_threshold: f64,
    #[serde(default = "default_true")]
    pub render_graph: bool,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_pattern() -> String {
    "*.tif".to_string()
}

fn default_exposure_s() -> f64 {
    300.0
}

fn default_strategy() -> String {
    DepthStrategy::PresetOsc.as_str().to_string()
}

fn default_star_removal_method() -> String {
    StarRemovalMethod::None.as_str().to_string()
}

fn default_regions_file() -> PathBuf {
    PathBuf::from("regions.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("snr_analysis")
}

fn default_threshold() -> f64 {
    DEFAULT_DIMINISHING_THRESHOLD
}

fn default_true() -> bool {
    true
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            dir: default_input_dir(),
            file_pattern: default_file_pattern(),
            manifest: None,
            default_exposure_s: default_exposure_s(),
            analyze_all_filters: false,
        }
    }
}

impl Default for DepthSettings {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            max_subs: None,
            custom: None,
            include_full_depth: false,
        }
    }
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            apply_stretch: true,
            generate_starless: false,
            star_removal_method: default_star_removal_method(),
            starnet_command: None,
        }
    }
}

impl Default for RoiSettings {
    fn default() -> Self {
        Self {
            regions_file: default_regions_file(),
            interactive: true,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            diminishing_threshold: default_threshold(),
            render_graph: true,
        }
    }
}

impl AnalysisSettings {
    /// Load settings from a TOML file.
    ///
    /// # Errors
    /// * `InvalidConfig` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AnalysisError::InvalidConfig(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> AnalysisResult<Self> {
        toml::from_str(content).map_err(|e| {
            AnalysisError::InvalidConfig(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load settings from the first default location that exists.
    ///
    /// Searches for `snr_depth.toml` in:
    /// 1. Current directory
    /// 2. `config/` directory
    ///
    /// # Returns
    /// * `Ok(Some(settings))` if a file was found and parsed
    /// * `Ok(None)` if no file exists in any location
    pub fn from_default_location() -> AnalysisResult<Option<Self>> {
        let search_paths = [
            PathBuf::from("snr_depth.toml"),
            PathBuf::from("./config/snr_depth.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                log::info!("Loading settings from {}", path.display());
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    pub fn depth_strategy(&self) -> AnalysisResult<DepthStrategy> {
        DepthStrategy::from_str(&self.depths.strategy)
    }

    pub fn star_removal_method(&self) -> AnalysisResult<StarRemovalMethod> {
        StarRemovalMethod::from_str(&self.processing.star_removal_method)
    }

    /// Whether starless images should be measured, i.e. a removal tool is selected.
    pub fn starless_enabled(&self) -> AnalysisResult<bool> {
        Ok(self.processing.generate_starless
            && self.star_removal_method()? != StarRemovalMethod::None)
    }

    /// Depth bound for a group of `available` subframes.
    pub fn effective_max_subs(&self, available: usize) -> usize {
        match self.depths.max_subs {
            Some(max) => max.min(available),
            None => available,
        }
    }

    /// Planning configuration for a group of `available` subframes.
    pub fn analysis_config(&self, available: usize) -> AnalysisResult<AnalysisConfig> {
        let mut config = AnalysisConfig::new(self.depth_strategy()?, self.effective_max_subs(available))
            .with_full_depth(self.depths.include_full_depth);
        if let Some(custom) = &self.depths.custom {
            config = config.with_custom_depths(custom.clone());
        }
        Ok(config)
    }

    /// Check values that cannot be expressed in the types.
    ///
    /// Returns warnings for settings that are valid but probably unintended.
    pub fn validate(&self) -> AnalysisResult<Vec<String>> {
        let mut warnings = Vec::new();

        self.depth_strategy()?;
        let method = self.star_removal_method()?;

        if !(self.input.default_exposure_s.is_finite() && self.input.default_exposure_s > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "input.default_exposure_s must be positive, got {}",
                self.input.default_exposure_s
            )));
        }
        glob::Pattern::new(&self.input.file_pattern).map_err(|e| {
            AnalysisError::InvalidConfig(format!(
                "input.file_pattern '{}' is not a valid glob: {}",
                self.input.file_pattern, e
            ))
        })?;
        if self.depths.max_subs == Some(0) {
            return Err(AnalysisError::InvalidConfig(
                "depths.max_subs must be at least 1".to_string(),
            ));
        }
        let threshold = self.output.diminishing_threshold;
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "output.diminishing_threshold must be positive, got {}",
                threshold
            )));
        }

        if self.processing.generate_starless {
            match method {
                StarRemovalMethod::None => warnings.push(
                    "generate_starless is set but star_removal_method is 'none'; measuring stars-in images"
                        .to_string(),
                ),
                StarRemovalMethod::StarNet => {
                    if self.processing.starnet_command.as_deref().map_or(true, |c| c.trim().is_empty()) {
                        return Err(AnalysisError::InvalidConfig(
                            "star_removal_method 'starnet' requires processing.starnet_command".to_string(),
                        ));
                    }
                }
            }
        }
        if !self.processing.apply_stretch {
            warnings.push(
                "apply_stretch is off; SNR values are only comparable with other unstretched runs"
                    .to_string(),
            );
        }
        if self.depths.custom.is_some() && self.depth_strategy()? != DepthStrategy::Custom {
            warnings.push(format!(
                "depths.custom is ignored with strategy '{}'",
                self.depths.strategy
            ));
        }

        Ok(warnings)
    }
}
