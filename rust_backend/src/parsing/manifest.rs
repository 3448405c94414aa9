use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::domain::Subframe;
use crate::core::error::AnalysisError;

/// One manifest line: a file plus optional exposure and filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub file: String,
    #[serde(default)]
    pub exposure_seconds: Option<f64>,
    #[serde(default)]
    pub filter: Option<String>,
}

/// Parse a subframe manifest file.
///
/// Relative file names resolve against the manifest's directory. Entry order
/// is acquisition order.
pub fn parse_manifest(manifest_path: &Path, default_exposure_s: f64) -> Result<Vec<Subframe>> {
    if !manifest_path.is_file() {
        return Err(AnalysisError::ImageNotFound(manifest_path.to_path_buf()).into());
    }
    let content = std::fs::read_to_string(manifest_path)
        .with_context(|| format!("Failed to read manifest: {}", manifest_path.display()))?;
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    parse_manifest_str(&content, base_dir, default_exposure_s)
        .with_context(|| format!("Invalid manifest: {}", manifest_path.display()))
}

/// Parse manifest JSON from a string.
pub fn parse_manifest_str(json: &str, base_dir: &Path, default_exposure_s: f64) -> Result<Vec<Subframe>> {
    let de = &mut serde_json::Deserializer::from_str(json);
    let entries: Vec<ManifestEntry> = serde_path_to_error::deserialize(de)
        .map_err(|e| anyhow::anyhow!("at '{}': {}", e.path(), e.inner()))?;

    entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| convert_entry(entry, idx, base_dir, default_exposure_s))
        .collect()
}

fn convert_entry(
    entry: ManifestEntry,
    idx: usize,
    base_dir: &Path,
    default_exposure_s: f64,
) -> Result<Subframe> {
    let file = entry.file.trim();
    if file.is_empty() {
        anyhow::bail!("entry {} has an empty file name", idx);
    }

    let exposure = entry.exposure_seconds.unwrap_or(default_exposure_s);
    if !(exposure.is_finite() && exposure > 0.0) {
        anyhow::bail!("entry {} ({}) has non-positive exposure {}", idx, file, exposure);
    }

    let path = Path::new(file);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    };

    let sub = Subframe::new(path, exposure);
    Ok(match entry.filter.map(|f| f.trim().to_string()) {
        Some(filter) if !filter.is_empty() => sub.with_filter(filter),
        _ => sub,
    })
}
