//! Named rectangles marked on a reference image, persisted as JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core::domain::{Rectangle, RoiPair};
use crate::core::error::{AnalysisError, AnalysisResult};

/// Name of the background region.
pub const BACKGROUND_REGION: &str = "BG";
/// Name of the foreground region.
pub const FOREGROUND_REGION: &str = "FG";

/// Regions of interest attached to a reference image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCatalog {
    #[serde(default)]
    pub reference_image: Option<String>,
    #[serde(default)]
    pub regions: BTreeMap<String, Rectangle>,
}

impl RegionCatalog {
    pub fn new(reference_image: Option<String>) -> Self {
        Self {
            reference_image,
            regions: BTreeMap::new(),
        }
    }

    /// Read a catalog file.
    ///
    /// # Errors
    /// * `InvalidConfig` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AnalysisError::InvalidConfig(format!(
                "Failed to read region file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&content).map_err(|e| match e {
            AnalysisError::InvalidConfig(msg) => {
                AnalysisError::InvalidConfig(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_json_str(json: &str) -> AnalysisResult<Self> {
        let de = &mut serde_json::Deserializer::from_str(json);
        let catalog: RegionCatalog = serde_path_to_error::deserialize(de).map_err(|e| {
            AnalysisError::InvalidConfig(format!(
                "Failed to parse region catalog at '{}': {}",
                e.path(),
                e.inner()
            ))
        })?;
        for (name, rect) in &catalog.regions {
            rect.validate().map_err(|_| {
                AnalysisError::InvalidConfig(format!("region '{}' has zero area: {}", name, rect))
            })?;
        }
        Ok(catalog)
    }

    /// Read the catalog if the file exists, otherwise start an empty one.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            log::debug!("No region file at {}, starting empty", path.display());
            Ok(Self::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> AnalysisResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
            }
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            AnalysisError::InvalidConfig(format!("Failed to serialize region catalog: {}", e))
        })?;
        fs::write(path, json).map_err(|e| AnalysisError::io(path, e))
    }

    pub fn get(&self, name: &str) -> Option<&Rectangle> {
        self.regions.get(name)
    }

    pub fn set(&mut self, name: &str, rect: Rectangle) {
        self.regions.insert(name.to_string(), rect);
    }

    /// The BG/FG pair, or `None` when either region is missing.
    ///
    /// # Errors
    /// `RoiMissing` when both exist but describe the same rectangle.
    pub fn lookup(&self) -> AnalysisResult<Option<RoiPair>> {
        match (self.get(BACKGROUND_REGION), self.get(FOREGROUND_REGION)) {
            (Some(bg), Some(fg)) => RoiPair::new(*bg, *fg).map(Some),
            _ => Ok(None),
        }
    }
}
