//! Starless image generation through an external StarNet-compatible tool.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Command;
use std::str::FromStr;

use crate::core::error::{AnalysisError, AnalysisResult};
use crate::core::image::Image;

use super::loader::{load_image, save_tiff16};
use super::StarRemover;

/// Which star removal tool to run when starless measurement is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StarRemovalMethod {
    #[default]
    None,
    StarNet,
}

impl StarRemovalMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            StarRemovalMethod::None => "none",
            StarRemovalMethod::StarNet => "starnet",
        }
    }
}

impl fmt::Display for StarRemovalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StarRemovalMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(StarRemovalMethod::None),
            "starnet" | "starnet++" => Ok(StarRemovalMethod::StarNet),
            other => Err(AnalysisError::InvalidConfig(format!(
                "unknown star removal method '{}'",
                other
            ))),
        }
    }
}

/// Runs `<command> <input.tif> <output.tif>` on a scratch copy of the image.
///
/// The command string may carry leading arguments, e.g. `starnet++ --stride 256`.
#[derive(Debug, Clone)]
pub struct StarNetRemover {
    program: String,
    args: Vec<String>,
}

impl StarNetRemover {
    pub fn new(command: &str) -> AnalysisResult<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| {
            AnalysisError::InvalidConfig("star removal command is empty".to_string())
        })?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl StarRemover for StarNetRemover {
    fn remove_stars(&mut self, image: &Image) -> AnalysisResult<Image> {
        let scratch = tempfile::tempdir()
            .map_err(|e| AnalysisError::io(std::env::temp_dir(), e))?;
        let input = scratch.path().join("starnet_in.tif");
        let output = scratch.path().join("starnet_out.tif");
        save_tiff16(image, &input)?;

        log::debug!("Running {} on {}", self.program, input.display());
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&input)
            .arg(&output)
            .status()
            .map_err(|e| {
                AnalysisError::Integration(format!("failed to start {}: {}", self.program, e))
            })?;
        if !status.success() {
            return Err(AnalysisError::Integration(format!(
                "{} exited with {}",
                self.program, status
            )));
        }

        let starless = load_image(&output)?;
        if starless.width != image.width || starless.height != image.height {
            return Err(AnalysisError::Integration(format!(
                "{} returned a {}x{} image for a {}x{} input",
                self.program, starless.width, starless.height, image.width, image.height
            )));
        }
        Ok(starless)
    }
}
