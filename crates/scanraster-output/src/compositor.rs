//! Layer compositing
//!
//! Builds the delivered page from the base image (gray or colour), the
//! 1-bit binarization and the layer masks, according to the output mode.

use crate::error::{OutputError, OutputResult};
use crate::masks::LayerMasks;
use crate::settings::OutputMode;
use scanraster_core::{PixelFormat, RasterBuffer, color};

/// Compose the final page
///
/// # Arguments
///
/// * `base` - Source image (already equalized if requested)
/// * `binarized` - 1-bit binarization; required by `BlackAndWhite` and `Mixed`
/// * `masks` - Layer masks, consulted only by `Mixed`
/// * `mode` - Output mode
///
/// # Returns
///
/// * `BlackAndWhite`: the binarization, masks ignored entirely.
/// * `ColorOrGrayscale`: the base image.
/// * `Mixed`: per pixel, the base pixel where `auto | picture_zones` is
///   set and black or white from the binarization elsewhere; then the base
///   pixel wherever the foreground mask is set. The result has the base
///   format (1-bit bases are promoted to gray).
///
/// # Errors
///
/// Returns [`OutputError::DimensionMismatch`] if the binarization or a
/// consulted mask differs in size from `base`.
pub fn compose(
    base: &RasterBuffer,
    binarized: Option<&RasterBuffer>,
    masks: &LayerMasks,
    mode: OutputMode,
) -> OutputResult<RasterBuffer> {
    if mode == OutputMode::ColorOrGrayscale {
        return Ok(base.clone());
    }

    let expected = base.size();
    let bw = binarized.ok_or_else(|| {
        OutputError::Core(scanraster_core::Error::InvalidParameter(format!(
            "{mode:?} output requires a binarization"
        )))
    })?;
    if bw.size() != expected {
        return Err(OutputError::DimensionMismatch {
            what: "binarized image",
            expected,
            actual: bw.size(),
        });
    }
    bw.require_format(PixelFormat::Bit1)?;

    if mode == OutputMode::BlackAndWhite {
        return Ok(bw.clone());
    }

    masks.check_size(expected)?;
    let base = if base.format() == PixelFormat::Bit1 {
        base.to_gray()
    } else {
        base.clone()
    };
    let (black, white) = match base.format() {
        PixelFormat::Rgb32 => (color::BLACK, color::WHITE),
        _ => (0, 255),
    };

    let mut out = base.to_mut();
    let auto = masks.auto.bits();
    let zones = masks.picture_zones.bits();
    for (i, (d, &b)) in out.data_mut().iter_mut().zip(bw.data()).enumerate() {
        if !(auto[i] || zones[i]) {
            *d = if b != 0 { black } else { white };
        }
    }

    if let Some(fg) = &masks.foreground {
        for ((d, &src), &keep) in out.data_mut().iter_mut().zip(base.data()).zip(fg.bits()) {
            if keep {
                *d = src;
            }
        }
    }

    Ok(out.into())
}
