//! Sources of the background/foreground rectangle pair.
//!
//! The pipeline only sees [`RoiProvider`]. Headless runs use a fixed pair or
//! a stored catalog; the interactive provider talks to an operator through
//! any reader/writer pair so it can be driven from tests.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::core::domain::{Rectangle, RoiPair};
use crate::core::error::{AnalysisError, AnalysisResult};

use super::catalog::{RegionCatalog, BACKGROUND_REGION, FOREGROUND_REGION};

/// Supplies the rectangle pair used by every measurement of a run.
pub trait RoiProvider {
    fn regions(&mut self) -> AnalysisResult<RoiPair>;
}

/// Pre-supplied rectangles.
#[derive(Debug, Clone, Copy)]
pub struct FixedRoiProvider {
    pair: RoiPair,
}

impl FixedRoiProvider {
    pub fn new(pair: RoiPair) -> Self {
        Self { pair }
    }
}

impl RoiProvider for FixedRoiProvider {
    fn regions(&mut self) -> AnalysisResult<RoiPair> {
        Ok(self.pair)
    }
}

/// Reads BG/FG from a region catalog without asking anything.
#[derive(Debug, Clone)]
pub struct CatalogRoiProvider {
    catalog_path: PathBuf,
}

impl CatalogRoiProvider {
    pub fn new(catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
        }
    }
}

impl RoiProvider for CatalogRoiProvider {
    fn regions(&mut self) -> AnalysisResult<RoiPair> {
        let catalog = RegionCatalog::load_or_default(&self.catalog_path)?;
        match catalog.lookup()? {
            Some(pair) => {
                log::info!(
                    "Using regions BG {} and FG {} from {}",
                    pair.background,
                    pair.foreground,
                    self.catalog_path.display()
                );
                Ok(pair)
            }
            None => Err(AnalysisError::RoiMissing(format!(
                "{} does not define both '{}' and '{}'",
                self.catalog_path.display(),
                BACKGROUND_REGION,
                FOREGROUND_REGION
            ))),
        }
    }
}

/// Asks the operator to confirm stored regions or to create new ones.
///
/// Newly created regions are saved to the catalog and the run stops with
/// `RoiMissing`; the next run finds and confirms them.
pub struct InteractiveRoiProvider<R: BufRead, W: Write> {
    catalog_path: PathBuf,
    reference_image: Option<String>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> InteractiveRoiProvider<R, W> {
    pub fn new(catalog_path: impl Into<PathBuf>, input: R, output: W) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            reference_image: None,
            input,
            output,
        }
    }

    /// Image the regions should be drawn on, recorded in the catalog.
    pub fn with_reference_image(mut self, reference: impl Into<String>) -> Self {
        self.reference_image = Some(reference.into());
        self
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    fn say(&mut self, text: &str) -> AnalysisResult<()> {
        write!(self.output, "{}", text)
            .and_then(|_| self.output.flush())
            .map_err(|e| AnalysisError::RoiMissing(format!("prompt failed: {}", e)))
    }

    /// One trimmed line, or `None` at end of input.
    fn read_line(&mut self) -> AnalysisResult<Option<String>> {
        let mut line = String::new();
        let n = self
            .input
            .read_line(&mut line)
            .map_err(|e| AnalysisError::RoiMissing(format!("failed to read answer: {}", e)))?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn confirm(&mut self, pair: &RoiPair) -> AnalysisResult<Option<bool>> {
        self.say(&format!(
            "Found BG {} and FG {} in {}.\nUse these regions? [y/n]: ",
            pair.background,
            pair.foreground,
            self.catalog_path.display()
        ))?;
        Ok(self
            .read_line()?
            .map(|answer| matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")))
    }

    /// Prompt until a valid rectangle is entered; `None` when the operator cancels.
    fn ask_rectangle(&mut self, name: &str, description: &str) -> AnalysisResult<Option<Rectangle>> {
        loop {
            self.say(&format!(
                "{} ({}) as x0 y0 x1 y1, empty to cancel: ",
                name, description
            ))?;
            let line = match self.read_line()? {
                Some(line) if !line.is_empty() => line,
                _ => return Ok(None),
            };
            match parse_rectangle(&line) {
                Ok(rect) => return Ok(Some(rect)),
                Err(e) => self.say(&format!("{}\n", e))?,
            }
        }
    }

    fn create(&mut self) -> AnalysisResult<RoiPair> {
        let cancelled = || AnalysisError::RoiMissing("region creation cancelled".to_string());

        self.say("Mark a background sample and a foreground target on the reference image.\n")?;
        let background = self
            .ask_rectangle(BACKGROUND_REGION, "background")?
            .ok_or_else(cancelled)?;
        let foreground = self
            .ask_rectangle(FOREGROUND_REGION, "foreground")?
            .ok_or_else(cancelled)?;
        let pair = RoiPair::new(background, foreground)?;

        let mut catalog = RegionCatalog::load_or_default(&self.catalog_path)?;
        if self.reference_image.is_some() {
            catalog.reference_image = self.reference_image.clone();
        }
        catalog.set(BACKGROUND_REGION, pair.background);
        catalog.set(FOREGROUND_REGION, pair.foreground);
        catalog.save(&self.catalog_path)?;
        log::info!("Saved regions to {}", self.catalog_path.display());

        self.say(&format!(
            "Regions saved to {}. Rerun the analysis to confirm them.\n",
            self.catalog_path.display()
        ))?;
        Err(AnalysisError::RoiMissing(format!(
            "regions created in {}, rerun to confirm them",
            self.catalog_path.display()
        )))
    }
}

impl<R: BufRead, W: Write> RoiProvider for InteractiveRoiProvider<R, W> {
    fn regions(&mut self) -> AnalysisResult<RoiPair> {
        let catalog = RegionCatalog::load_or_default(&self.catalog_path)?;
        if let Some(pair) = catalog.lookup()? {
            match self.confirm(&pair)? {
                Some(true) => return Ok(pair),
                Some(false) => {}
                None => {
                    return Err(AnalysisError::RoiMissing(
                        "no answer to region confirmation".to_string(),
                    ))
                }
            }
        }
        self.create()
    }
}

/// Parse `x0 y0 x1 y1`; commas and whitespace both separate values.
pub fn parse_rectangle(input: &str) -> AnalysisResult<Rectangle> {
    let values: Vec<&str> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    if values.len() != 4 {
        return Err(AnalysisError::InvalidConfig(format!(
            "expected 4 coordinates, got {} in '{}'",
            values.len(),
            input
        )));
    }
    let mut coords = [0u32; 4];
    for (slot, raw) in coords.iter_mut().zip(&values) {
        *slot = raw.parse().map_err(|_| {
            AnalysisError::InvalidConfig(format!("'{}' is not a pixel coordinate", raw))
        })?;
    }
    Rectangle::new(coords[0], coords[1], coords[2], coords[3])
}
