//! Regions of interest: stored catalogs and the providers built on them.

pub mod catalog;
pub mod provider;

pub use catalog::{RegionCatalog, BACKGROUND_REGION, FOREGROUND_REGION};
pub use provider::{
    parse_rectangle, CatalogRoiProvider, FixedRoiProvider, InteractiveRoiProvider, RoiProvider,
};
