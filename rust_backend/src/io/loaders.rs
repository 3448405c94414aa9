use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::path::Path;

use crate::config::InputSettings;
use crate::core::domain::Subframe;
use crate::core::error::AnalysisError;
use crate::parsing::manifest;

/// Filter names recognised in file names.
pub const KNOWN_FILTERS: &[&str] = &[
    "L", "R", "G", "B", "Ha", "OIII", "SII", "Hb", "NII", "UVIR", "LPro", "LeXtreme", "LEnhance",
];

/// Where a subframe list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubframeSource {
    Directory,
    Manifest,
}

/// Subframes in acquisition order plus their origin.
#[derive(Debug)]
pub struct SubframeLoadResult {
    pub subframes: Vec<Subframe>,
    pub source: SubframeSource,
}

/// Unified interface for building the subframe list from the input settings
pub struct SubframeLoader;

impl SubframeLoader {
    /// Load from the manifest when one is configured, otherwise scan the directory.
    pub fn load(input: &InputSettings) -> Result<SubframeLoadResult> {
        let result = match &input.manifest {
            Some(manifest_path) => {
                let subframes = manifest::parse_manifest(manifest_path, input.default_exposure_s)
                    .context("Failed to load subframe manifest")?;
                if subframes.is_empty() {
                    return Err(AnalysisError::InvalidConfig(format!(
                        "manifest {} lists no subframes",
                        manifest_path.display()
                    ))
                    .into());
                }
                SubframeLoadResult {
                    subframes,
                    source: SubframeSource::Manifest,
                }
            }
            None => {
                let mut subframes =
                    discover_subframes(&input.dir, &input.file_pattern, input.default_exposure_s)?;
                if input.analyze_all_filters {
                    subframes = subframes
                        .into_iter()
                        .map(|sub| match filter_from_file_name(&sub.file_name()) {
                            Some(filter) => sub.with_filter(filter),
                            None => sub,
                        })
                        .collect();
                }
                SubframeLoadResult {
                    subframes,
                    source: SubframeSource::Directory,
                }
            }
        };

        log::info!(
            "Loaded {} subframes from {:?}",
            result.subframes.len(),
            result.source
        );
        Ok(result)
    }
}

/// Files in `dir` whose name matches `pattern`, sorted by name.
///
/// File names sort in acquisition order for the usual sequence-numbered
/// capture naming.
pub fn discover_subframes(dir: &Path, pattern: &str, default_exposure_s: f64) -> Result<Vec<Subframe>> {
    let matcher = Pattern::new(pattern)
        .map_err(|e| AnalysisError::InvalidConfig(format!("bad file pattern '{}': {}", pattern, e)))?;
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory: {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| matcher.matches_with(name, options));
        if matches {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(AnalysisError::InvalidConfig(format!(
            "no files matching '{}' in {}",
            pattern,
            dir.display()
        ))
        .into());
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths
        .into_iter()
        .map(|p| Subframe::new(p, default_exposure_s))
        .collect())
}

/// Filter token in a capture file name such as `Light_M31_300.0s_Bin1_Ha_0012.tif`.
pub fn filter_from_file_name(name: &str) -> Option<String> {
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    stem.split(|c: char| c == '_' || c == '-' || c == ' ')
        .find_map(|token| {
            let token = token
                .strip_prefix("FILTER")
                .or_else(|| token.strip_prefix("filter"))
                .unwrap_or(token);
            KNOWN_FILTERS
                .iter()
                .find(|f| f.eq_ignore_ascii_case(token))
                .map(|f| f.to_string())
        })
}
