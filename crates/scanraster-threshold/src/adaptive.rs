//! Local adaptive threshold fields: Niblack, Sauvola and Wolf
//!
//! All three derive a per-pixel threshold from the local mean `μ` and
//! standard deviation `σ` ([`crate::local_stats`]):
//!
//! | Method  | Threshold                                   |
//! |---------|---------------------------------------------|
//! | Niblack | `μ − k·σ`                                   |
//! | Sauvola | `μ·(1 + k·(σ/128 − 1))`                     |
//! | Wolf    | `μ − k·(1 − σ/σmax)·(μ − min)`              |
//!
//! The raw threshold is clamped to `0..=255` and truncated before the
//! adjustment is added.

use crate::error::ThresholdResult;
use crate::integral::{LocalStats, local_stats};
use crate::surface::ThresholdField;
use crate::window::WindowSize;
use scanraster_core::RasterBuffer;

/// Dynamic range used to normalize the Sauvola deviation term
const SAUVOLA_RANGE: f64 = 128.0;

#[inline]
fn quantize(threshold: f64, adjustment: i32) -> i32 {
    threshold.clamp(0.0, 255.0) as u8 as i32 + adjustment
}

fn field_from(stats: &LocalStats, adjustment: i32, f: impl Fn(f64, f64) -> f64) -> ThresholdField {
    let values = stats
        .mean
        .iter()
        .zip(&stats.stddev)
        .map(|(&m, &s)| quantize(f(m, s), adjustment))
        .collect();
    ThresholdField::new(stats.width, stats.height, values)
}

/// Niblack threshold field
///
/// # Errors
///
/// Returns an error if the image is not 8-bit gray.
pub fn niblack_field(
    gray: &RasterBuffer,
    window: WindowSize,
    k: f64,
    adjustment: i32,
) -> ThresholdResult<ThresholdField> {
    let stats = local_stats(gray, window)?;
    Ok(field_from(&stats, adjustment, |m, s| m - k * s))
}

/// Sauvola threshold field from precomputed statistics
pub fn sauvola_field(stats: &LocalStats, k: f64, adjustment: i32) -> ThresholdField {
    field_from(stats, adjustment, |m, s| m * (1.0 + k * (s / SAUVOLA_RANGE - 1.0)))
}

/// Wolf threshold field from precomputed statistics
///
/// # Arguments
///
/// * `stats` - Local statistics of the page
/// * `min_gray` - Darkest gray level on the page
/// * `k` - Coefficient
/// * `adjustment` - Signed threshold adjustment
/// * `bounds` - Hard `(lower, upper)` bounds of the binarization rule
///
/// Returns `None` when the page has no local contrast at all (σmax = 0).
pub fn wolf_field(
    stats: &LocalStats,
    min_gray: u8,
    k: f64,
    adjustment: i32,
    bounds: (u8, u8),
) -> Option<ThresholdField> {
    let max_dev = stats.max_stddev();
    if max_dev <= 0.0 {
        return None;
    }
    let min_gray = min_gray as f64;
    let field = field_from(stats, adjustment, |m, s| {
        let a = 1.0 - s / max_dev;
        m - k * a * (m - min_gray)
    });
    Some(field.with_bounds(bounds.0, bounds.1))
}
