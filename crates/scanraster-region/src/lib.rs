//! scanraster-region - Connected components, despeckling and picture detection
//!
//! This crate provides the region-level steps of the output engine:
//!
//! - Union-find connected component labeling ([`label`])
//! - Removal of small black components ([`despeckle`])
//! - Picture mask estimation and picture rectangle detection ([`picture`])

pub mod despeckle;
mod error;
pub mod label;
pub mod picture;

pub use despeckle::{DespecklePolicy, DespeckleReport, despeckle, despeckle_with_report};
pub use error::{RegionError, RegionResult};
pub use label::{ConnectedComponent, Labeling, label_binary, label_mask};
pub use picture::{PictureMask, detect, estimate_picture_mask, picture_mask_raster, rects_to_mask};
