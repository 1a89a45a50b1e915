//! scanraster-morph - Morphology for the output engine
//!
//! This crate provides the morphological building blocks used by
//! thresholding and picture detection:
//!
//! - Local min / max over a rectangular window (van Herk / Gil-Werman)
//! - Grayscale erosion, dilation and morphological gradient
//! - Grayscale reconstruction by dilation with a bounded iteration count
//! - Grayscale hole filling
//! - Hit-miss smoothing of binarized edges

pub mod binary;
mod error;
pub mod grayscale;
pub mod reconstruct;

pub use binary::smooth_edges;
pub use error::{MorphError, MorphResult};

pub use grayscale::{dilate_gray, erode_gray, gradient_gray, local_min_max};
pub use reconstruct::{
    Reconstruction, fill_holes_gray, grayscale_reconstruct, grayscale_reconstruct_with_limit,
    iteration_limit,
};
