//! Layer masks and zone application
//!
//! Three boolean layers decide where a Mixed page keeps its source pixels:
//!
//! - `auto`: pictures found by the picture mask estimator, plus
//!   `PictureAdd` zones, minus `PictureSubtract` zones
//! - `picture_zones`: rectangles reported by the picture zone detector
//! - `foreground`: black pixels of the foreground binarization, if that
//!   layer is enabled
//!
//! All layers have exactly the size of the working image.

use crate::error::{OutputError, OutputResult};
use crate::rasterize::{rasterize, rasterize_into};
use crate::zone::{Zone, ZoneTag};
use scanraster_core::{Mask, PixelFormat, RasterBuffer, color};

/// Layer masks of one page
#[derive(Debug, Clone)]
pub struct LayerMasks {
    /// Automatically detected picture areas (plus zone edits)
    pub auto: Mask,
    /// Rectangularized picture zones
    pub picture_zones: Mask,
    /// Pixels restored from the source by the foreground layer
    pub foreground: Option<Mask>,
}

impl LayerMasks {
    /// Empty layers for an image of the given size
    ///
    /// # Errors
    ///
    /// Returns an error if the size is invalid.
    pub fn empty(width: u32, height: u32) -> OutputResult<Self> {
        Ok(Self {
            auto: Mask::new(width, height)?,
            picture_zones: Mask::new(width, height)?,
            foreground: None,
        })
    }

    /// Size shared by all layers
    pub fn size(&self) -> (u32, u32) {
        self.auto.size()
    }

    /// Pixels kept from the source by the picture layers (`auto | picture_zones`)
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::DimensionMismatch`] if the layers differ in size.
    pub fn picture_area(&self) -> OutputResult<Mask> {
        let mut area = self.auto.clone();
        area.or_assign(&self.picture_zones).map_err(|_| OutputError::DimensionMismatch {
            what: "picture zones mask",
            expected: self.auto.size(),
            actual: self.picture_zones.size(),
        })?;
        Ok(area)
    }

    /// Check every layer against the working image size
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::DimensionMismatch`] naming the first
    /// mis-sized layer.
    pub fn check_size(&self, expected: (u32, u32)) -> OutputResult<()> {
        let layers = [
            ("auto layer mask", Some(&self.auto)),
            ("picture zones mask", Some(&self.picture_zones)),
            ("foreground mask", self.foreground.as_ref()),
        ];
        for (what, mask) in layers {
            if let Some(mask) = mask
                && mask.size() != expected
            {
                return Err(OutputError::DimensionMismatch {
                    what,
                    expected,
                    actual: mask.size(),
                });
            }
        }
        Ok(())
    }
}

/// Apply picture zones to the layer masks in document order
///
/// * `PictureAdd` is OR-ed into the auto layer.
/// * `PictureSubtract` is removed from the auto layer only.
/// * `PictureSubtractAll` is removed from all three layers.
/// * `Fill` zones are skipped here; see [`apply_fill_zones`].
///
/// Zones are expected to be validated already.
///
/// # Errors
///
/// Returns an error if the layers differ in size.
pub fn apply_zones(zones: &[Zone], masks: &mut LayerMasks) -> OutputResult<()> {
    let (w, h) = masks.size();
    masks.check_size((w, h))?;

    for zone in zones {
        match zone.tag {
            ZoneTag::Fill => {}
            ZoneTag::PictureAdd => rasterize_into(zone, &mut masks.auto, true),
            ZoneTag::PictureSubtract => rasterize_into(zone, &mut masks.auto, false),
            ZoneTag::PictureSubtractAll => {
                let area = rasterize(zone, w, h)?;
                masks.auto.and_not_assign(&area)?;
                masks.picture_zones.and_not_assign(&area)?;
                if let Some(fg) = masks.foreground.as_mut() {
                    fg.and_not_assign(&area)?;
                }
            }
        }
    }
    Ok(())
}

/// Paint every `Fill` zone into the final image
///
/// The fill colour defaults to white. On 1-bit output the colour becomes
/// black when its luminance is below 128; on gray output its luminance is
/// used.
///
/// # Errors
///
/// Returns an error if rasterization fails.
pub fn apply_fill_zones(image: &RasterBuffer, zones: &[Zone]) -> OutputResult<RasterBuffer> {
    let fills: Vec<&Zone> = zones.iter().filter(|z| z.tag == ZoneTag::Fill).collect();
    if fills.is_empty() {
        return Ok(image.clone());
    }

    let (w, h) = image.size();
    let mut out = image.to_mut();
    for zone in fills {
        let area = rasterize(zone, w, h)?;
        let value = fill_value(image.format(), zone.fill_color.unwrap_or(color::WHITE));
        for (d, &inside) in out.data_mut().iter_mut().zip(area.bits()) {
            if inside {
                *d = value;
            }
        }
    }
    Ok(out.into())
}

fn fill_value(format: PixelFormat, rgb: u32) -> u32 {
    let lum = color::luminance(rgb);
    match format {
        PixelFormat::Bit1 => u32::from(lum < 128),
        PixelFormat::Gray8 => lum as u32,
        PixelFormat::Rgb32 => rgb | 0xff,
    }
}
