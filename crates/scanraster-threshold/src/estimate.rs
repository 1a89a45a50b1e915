//! Threshold estimation entry point
//!
//! Dispatches once on [`ThresholdMethod`] and returns an [`Estimate`].
//! Adaptive methods fall back to the global Otsu threshold when the page
//! has no local contrast to work with.

use crate::adaptive::{sauvola_field, wolf_field};
use crate::error::ThresholdResult;
use crate::gatos::gatos;
use crate::integral::local_stats;
use crate::method::ThresholdMethod;
use crate::otsu::{adjust_threshold, otsu_threshold};
use crate::surface::{Estimate, ThresholdSurface};
use crate::window::WindowSize;
use scanraster_core::{GrayHistogram, Mask, RasterBuffer};

/// Estimate a threshold surface for a page
///
/// # Arguments
///
/// * `image` - Page in any pixel format (converted to gray)
/// * `method` - Algorithm and parameters; out-of-range values are
///   normalized first
///
/// # Errors
///
/// Returns an error if an intermediate step fails.
pub fn estimate(image: &RasterBuffer, method: &ThresholdMethod) -> ThresholdResult<Estimate> {
    estimate_with_mask(image, method, None)
}

/// Estimate a threshold surface, restricting global statistics to a mask
///
/// The mask limits the histogram used by Otsu (and by the uniform-page
/// fallback of the adaptive methods) to pixels where it is set. Picture
/// areas are typically excluded this way.
///
/// # Errors
///
/// Returns an error if the mask size differs from the image or an
/// intermediate step fails.
pub fn estimate_with_mask(
    image: &RasterBuffer,
    method: &ThresholdMethod,
    mask: Option<&Mask>,
) -> ThresholdResult<Estimate> {
    let gray = image.to_gray();
    let (w, h) = gray.size();

    match method.normalized() {
        ThresholdMethod::Otsu { adjustment } => global(&gray, mask, adjustment),
        ThresholdMethod::Sauvola {
            window,
            coefficient,
            adjustment,
        } => {
            let stats = local_stats(&gray, WindowSize::normalize(window, w, h))?;
            if stats.max_stddev() <= 0.0 {
                return global(&gray, mask, adjustment);
            }
            Ok(Estimate::direct(ThresholdSurface::Field(sauvola_field(
                &stats,
                coefficient,
                adjustment,
            ))))
        }
        ThresholdMethod::Wolf {
            window,
            coefficient,
            adjustment,
            lower_bound,
            upper_bound,
        } => {
            let stats = local_stats(&gray, WindowSize::normalize(window, w, h))?;
            let min_gray = gray.data().iter().copied().min().unwrap_or(0) as u8;
            match wolf_field(&stats, min_gray, coefficient, adjustment, (lower_bound, upper_bound)) {
                Some(field) => Ok(Estimate::direct(ThresholdSurface::Field(field))),
                None => global(&gray, mask, adjustment),
            }
        }
        ThresholdMethod::Gatos {
            window,
            coefficient,
            scale,
            noise_sigma,
            adjustment,
        } => {
            let window = WindowSize::normalize(window, w, h);
            match gatos(&gray, window, coefficient, scale, noise_sigma, adjustment)? {
                Some(result) => Ok(Estimate {
                    surface: ThresholdSurface::Field(result.field),
                    converged: result.converged,
                    iterations: Some(result.iterations),
                }),
                None => global(&gray, mask, adjustment),
            }
        }
    }
}

fn global(gray: &RasterBuffer, mask: Option<&Mask>, adjustment: i32) -> ThresholdResult<Estimate> {
    let hist = GrayHistogram::from_raster(gray, mask)?;
    let t = adjust_threshold(otsu_threshold(&hist), adjustment);
    Ok(Estimate::direct(ThresholdSurface::Global(t)))
}

/// Estimate and apply in one step
///
/// # Returns
///
/// The 1-bit binarization together with the estimate that produced it.
///
/// # Errors
///
/// See [`estimate_with_mask`].
pub fn binarize(
    image: &RasterBuffer,
    method: &ThresholdMethod,
    mask: Option<&Mask>,
) -> ThresholdResult<(RasterBuffer, Estimate)> {
    let est = estimate_with_mask(image, method, mask)?;
    let bw = est.binarize(&image.to_gray())?;
    Ok((bw, est))
}
