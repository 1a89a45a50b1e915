//! Gatos adaptive binarization
//!
//! 1. Wiener-filter the page with a 5x5 window.
//! 2. Niblack base binarization of the filtered page.
//! 3. Estimate the background surface: background pixels keep their
//!    filtered value, foreground pixels take the background value that
//!    grayscale reconstruction propagates into them from their
//!    surroundings.
//! 4. Per-pixel threshold on the distance to the background:
//!
//! ```text
//! d(b) = q·δ·((1 − p2) / (1 + exp(−4b / (B(1 − p1)) + 2(1 + p1)/(1 − p1))) + p2)
//! ```
//!
//! where `δ` is the mean background/foreground distance over the
//! foreground, `B` the mean background level over the background, `q` the
//! contrast scale, `p1 = 0.5`, `p2 = 0.8`. A pixel is black iff
//! `b − v > d(b)`.

use crate::adaptive::niblack_field;
use crate::error::{ThresholdResult, require_gray};
use crate::surface::{ThresholdField, ThresholdSurface};
use crate::window::WindowSize;
use scanraster_core::{ConnectivityType, PixelFormat, RasterBuffer};
use scanraster_morph::grayscale_reconstruct;

/// Wiener filter window side
pub const WIENER_WINDOW: u32 = 5;

const P1: f64 = 0.5;
const P2: f64 = 0.8;

/// Outcome of the Gatos pipeline
#[derive(Debug, Clone)]
pub struct GatosResult {
    /// Per-pixel thresholds
    pub field: ThresholdField,
    /// Whether background reconstruction converged
    pub converged: bool,
    /// Reconstruction iterations
    pub iterations: u32,
}

/// Wiener filter
///
/// Each pixel moves towards its local mean by the share of the local
/// variance attributed to noise:
/// `out = μ + max(0, σ² − ν²) / max(σ², ν²) · (v − μ)`.
///
/// # Arguments
///
/// * `gray` - 8-bit gray input
/// * `window` - Window side (normalized against the image)
/// * `noise_sigma` - Noise standard deviation `ν`
///
/// # Errors
///
/// Returns an error if the image is not 8-bit gray.
pub fn wiener_filter(gray: &RasterBuffer, window: u32, noise_sigma: f64) -> ThresholdResult<RasterBuffer> {
    require_gray(gray)?;
    let (w, h) = gray.size();
    let stats = crate::local_stats(gray, WindowSize::normalize(window, w, h))?;
    let noise_var = noise_sigma * noise_sigma;

    let mut out = gray.create_template(PixelFormat::Gray8)?;
    for (i, (d, &v)) in out.data_mut().iter_mut().zip(gray.data()).enumerate() {
        let mean = stats.mean[i];
        let var = stats.stddev[i] * stats.stddev[i];
        let denom = var.max(noise_var);
        let value = if denom <= 0.0 {
            mean
        } else {
            mean + ((var - noise_var).max(0.0) / denom) * (v as f64 - mean)
        };
        *d = value.round().clamp(0.0, 255.0) as u32;
    }
    Ok(out.into())
}

/// Run the Gatos pipeline
///
/// # Arguments
///
/// * `gray` - 8-bit gray input
/// * `window` - Normalized Niblack window
/// * `k` - Niblack coefficient
/// * `scale` - Contrast scale `q`
/// * `noise_sigma` - Wiener noise sigma
/// * `adjustment` - Adjustment applied to the Niblack base binarization
///
/// # Returns
///
/// `None` when the page has no foreground/background split (for example
/// a uniform page); the caller falls back to a global threshold.
///
/// # Errors
///
/// Returns an error if the image is not 8-bit gray.
pub fn gatos(
    gray: &RasterBuffer,
    window: WindowSize,
    k: f64,
    scale: f64,
    noise_sigma: f64,
    adjustment: i32,
) -> ThresholdResult<Option<GatosResult>> {
    require_gray(gray)?;
    let wiener = wiener_filter(gray, WIENER_WINDOW, noise_sigma)?;
    let base = ThresholdSurface::Field(niblack_field(&wiener, window, k, adjustment)?).binarize(&wiener)?;

    let foreground = base.data().iter().filter(|&&b| b != 0).count();
    if foreground == 0 || foreground == base.data().len() {
        return Ok(None);
    }

    // Reconstruct on the inverted page: background pixels seed their own
    // darkness, foreground pixels start at zero.
    let inverted = wiener.invert()?;
    let mut marker = inverted.to_mut();
    for (m, &b) in marker.data_mut().iter_mut().zip(base.data()) {
        if b != 0 {
            *m = 0;
        }
    }
    let rec = grayscale_reconstruct(&marker.into(), &inverted, ConnectivityType::EightWay)?;
    let background: Vec<f64> = rec.image.data().iter().map(|&v| 255.0 - v as f64).collect();

    let mut sum_diff = 0.0;
    let mut sum_bg = 0.0;
    let mut bg_count = 0usize;
    for ((&bg, &v), &b) in background.iter().zip(wiener.data()).zip(base.data()) {
        if b != 0 {
            sum_diff += bg - v as f64;
        } else {
            sum_bg += bg;
            bg_count += 1;
        }
    }
    let delta = sum_diff / foreground as f64;
    let mean_bg = sum_bg / bg_count as f64;
    if delta <= 0.0 || mean_bg <= 0.0 {
        return Ok(None);
    }

    let exp_scale = -4.0 / (mean_bg * (1.0 - P1));
    let exp_bias = 2.0 * (1.0 + P1) / (1.0 - P1);
    let threshold_scale = scale * delta * (1.0 - P2);
    let threshold_bias = scale * delta * P2;

    let values = background
        .iter()
        .map(|&bg| {
            let d = threshold_scale / (1.0 + (bg * exp_scale + exp_bias).exp()) + threshold_bias;
            // v < bg − d  <=>  v < ceil(bg − d) for integer v
            (bg - d).ceil() as i32
        })
        .collect();

    Ok(Some(GatosResult {
        field: ThresholdField::new(gray.width(), gray.height(), values),
        converged: rec.converged,
        iterations: rec.iterations,
    }))
}
