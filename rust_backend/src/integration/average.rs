//! Per-pixel mean stacking.

use crate::core::domain::Subframe;
use crate::core::error::{AnalysisError, AnalysisResult};
use crate::core::image::Image;

use super::{FrameLoader, IntegrationEngine};

/// Streams frames through a running sum so only one frame is held at a time.
#[derive(Debug, Clone)]
pub struct AverageIntegrator<L: FrameLoader> {
    loader: L,
}

impl<L: FrameLoader> AverageIntegrator<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<L: FrameLoader> IntegrationEngine for AverageIntegrator<L> {
    fn integrate(&mut self, subframes: &[Subframe]) -> AnalysisResult<Image> {
        let (first, rest) = subframes
            .split_first()
            .ok_or_else(|| AnalysisError::Integration("no subframes to integrate".to_string()))?;

        let reference = self.loader.load(first)?;
        let mut sum: Vec<f64> = reference.data.iter().map(|&v| v as f64).collect();

        for sub in rest {
            let frame = self.loader.load(sub)?;
            if !frame.same_shape(&reference) {
                return Err(AnalysisError::Integration(format!(
                    "{} is {}x{}x{}, expected {}x{}x{}",
                    sub.file_name(),
                    frame.width,
                    frame.height,
                    frame.channels,
                    reference.width,
                    reference.height,
                    reference.channels
                )));
            }
            for (acc, &v) in sum.iter_mut().zip(&frame.data) {
                *acc += v as f64;
            }
        }

        let count = subframes.len() as f64;
        log::debug!(
            "Averaged {} frames of {}x{}x{}",
            subframes.len(),
            reference.width,
            reference.height,
            reference.channels
        );

        let data = sum.into_iter().map(|s| (s / count) as f32).collect();
        Image::from_planes(reference.width, reference.height, reference.channels, data)
            .ok_or_else(|| AnalysisError::Integration("stacked buffer size mismatch".to_string()))
    }
}
