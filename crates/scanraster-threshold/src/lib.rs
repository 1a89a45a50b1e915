//! scanraster-threshold - Global and adaptive thresholding
//!
//! Turns a gray page into a 1-bit page. Four methods are available:
//!
//! - **Otsu**: one global threshold from the page histogram
//! - **Sauvola**: local mean / deviation threshold
//! - **Wolf**: Sauvola variant normalized by the page's contrast range
//! - **Gatos**: background-surface threshold on a Wiener-filtered page
//!
//! Local statistics use integral images so that the cost per pixel does
//! not depend on the window size.
//!
//! # Usage
//!
//! ```ignore
//! use scanraster_threshold::{ThresholdMethod, estimate};
//!
//! let est = estimate(&page, &ThresholdMethod::sauvola())?;
//! let bw = est.binarize(&page.to_gray())?;
//! ```

pub mod adaptive;
mod error;
pub mod estimate;
pub mod gatos;
pub mod integral;
pub mod method;
pub mod otsu;
pub mod surface;
pub mod window;

pub use error::{ThresholdError, ThresholdResult};
pub use estimate::{binarize, estimate, estimate_with_mask};
pub use gatos::{GatosResult, wiener_filter};
pub use integral::{IntegralImage, LocalStats, local_stats, local_stats_naive};
pub use method::ThresholdMethod;
pub use otsu::{adjust_threshold, between_class_variance, otsu_threshold};
pub use surface::{Estimate, ThresholdField, ThresholdSurface};
pub use window::WindowSize;
