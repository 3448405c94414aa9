//! Stacking and star removal capabilities consumed by the depth sweep.
//!
//! The sweep never decodes or stacks frames itself. It calls an
//! [`IntegrationEngine`] with the first `depth` subframes and, when starless
//! measurement is requested, a [`StarRemover`] on the result. Both are traits
//! so runs can be driven by the built-in implementations, an external tool,
//! or synthetic frames in tests.

pub mod average;
pub mod loader;
pub mod star_removal;

use crate::core::domain::Subframe;
use crate::core::error::AnalysisResult;
use crate::core::image::Image;

pub use average::AverageIntegrator;
pub use loader::{save_tiff16, FileFrameLoader};
pub use star_removal::{StarNetRemover, StarRemovalMethod};

/// Stacks an ordered run of subframes into one image.
pub trait IntegrationEngine {
    fn integrate(&mut self, subframes: &[Subframe]) -> AnalysisResult<Image>;
}

/// Produces the pixels of a single subframe.
pub trait FrameLoader {
    fn load(&self, subframe: &Subframe) -> AnalysisResult<Image>;
}

/// Removes point sources from an integrated image.
pub trait StarRemover {
    fn remove_stars(&mut self, image: &Image) -> AnalysisResult<Image>;
}
