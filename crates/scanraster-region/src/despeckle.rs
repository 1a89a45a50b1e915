//! Despeckling of bi-level pages
//!
//! Black 8-connected components whose bounding box is smaller than a
//! policy threshold in its smallest dimension are erased. The threshold is
//! defined at 300 DPI and scales with the page resolution, but never drops
//! below 2 pixels, so an isolated single pixel is always removed unless the
//! policy is [`DespecklePolicy::Off`].
//!
//! Removing a component never changes any other component, so applying
//! the filter twice gives the same result as applying it once.

use crate::error::{RegionError, RegionResult};
use crate::label::label_binary;
use scanraster_core::{ConnectivityType, Dpi, PixelFormat, RasterBuffer};
use serde::{Deserialize, Serialize};

/// Reference resolution for the policy thresholds
pub const REFERENCE_DPI: u32 = 300;

/// Smallest threshold after resolution scaling
pub const MIN_THRESHOLD: u32 = 2;

/// How aggressively small components are removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DespecklePolicy {
    /// Keep everything
    Off,
    /// Remove only the smallest specks
    Cautious,
    /// Balanced removal
    #[default]
    Normal,
    /// Remove the most
    Aggressive,
}

impl DespecklePolicy {
    /// Minimum retained bounding-box dimension at 300 DPI
    pub fn base_threshold(self) -> Option<u32> {
        match self {
            Self::Off => None,
            Self::Cautious => Some(2),
            Self::Normal => Some(3),
            Self::Aggressive => Some(5),
        }
    }

    /// Minimum retained bounding-box dimension at the given resolution
    ///
    /// Scales the 300 DPI threshold by `min(dpi) / 300`, rounding to the
    /// nearest pixel, with a floor of 2. `None` for [`DespecklePolicy::Off`].
    pub fn threshold(self, dpi: Dpi) -> Option<u32> {
        self.base_threshold().map(|base| {
            let scaled = (base as f64 * dpi.min_axis() as f64 / REFERENCE_DPI as f64).round() as u32;
            scaled.max(MIN_THRESHOLD)
        })
    }
}

/// Summary of a despeckle run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DespeckleReport {
    /// Effective threshold, `None` when the policy is off
    pub threshold: Option<u32>,
    /// Number of black components found
    pub components: usize,
    /// Number of components erased
    pub removed: usize,
    /// Number of black pixels erased
    pub removed_pixels: u64,
}

/// Remove small black components
///
/// # Arguments
///
/// * `image` - 1-bit page (1 = black)
/// * `policy` - Removal policy
/// * `dpi` - Resolution used to scale the policy threshold
///
/// # Errors
///
/// Returns an error if the image is not 1-bit.
pub fn despeckle(image: &RasterBuffer, policy: DespecklePolicy, dpi: Dpi) -> RegionResult<RasterBuffer> {
    despeckle_with_report(image, policy, dpi).map(|(out, _)| out)
}

/// Remove small black components and report what was removed
///
/// # Errors
///
/// Returns an error if the image is not 1-bit.
pub fn despeckle_with_report(
    image: &RasterBuffer,
    policy: DespecklePolicy,
    dpi: Dpi,
) -> RegionResult<(RasterBuffer, DespeckleReport)> {
    if image.format() != PixelFormat::Bit1 {
        return Err(RegionError::UnsupportedFormat {
            expected: "1-bit",
            actual: image.format().name(),
        });
    }

    let Some(threshold) = policy.threshold(dpi) else {
        return Ok((image.clone(), DespeckleReport::default()));
    };

    let labeling = label_binary(image, ConnectivityType::EightWay)?;
    let doomed: Vec<bool> = std::iter::once(false)
        .chain(
            labeling
                .components()
                .iter()
                .map(|c| (c.bounds.min_dimension() as u32) < threshold),
        )
        .collect();

    let mut report = DespeckleReport {
        threshold: Some(threshold),
        components: labeling.len(),
        removed: doomed.iter().filter(|&&d| d).count(),
        removed_pixels: 0,
    };
    if report.removed == 0 {
        return Ok((image.clone(), report));
    }

    let mut out = image.to_mut();
    for (d, &label) in out.data_mut().iter_mut().zip(labeling.labels()) {
        if doomed[label as usize] {
            *d = 0;
            report.removed_pixels += 1;
        }
    }

    Ok((out.into(), report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speck_page() -> RasterBuffer {
        let mut img = RasterBuffer::new(20, 20, PixelFormat::Bit1).unwrap().to_mut();
        img.set_pixel(2, 2, 1).unwrap();
        for y in 10..16 {
            for x in 10..16 {
                img.set_pixel(x, y, 1).unwrap();
            }
        }
        img.into()
    }

    #[test]
    fn test_threshold_scaling() {
        let dpi300 = Dpi::uniform(300);
        assert_eq!(DespecklePolicy::Off.threshold(dpi300), None);
        assert_eq!(DespecklePolicy::Cautious.threshold(dpi300), Some(2));
        assert_eq!(DespecklePolicy::Normal.threshold(dpi300), Some(3));
        assert_eq!(DespecklePolicy::Aggressive.threshold(Dpi::uniform(600)), Some(10));
        assert_eq!(DespecklePolicy::Cautious.threshold(Dpi::uniform(100)), Some(2));
        assert_eq!(DespecklePolicy::Normal.threshold(Dpi::new(600, 150)), Some(2));
    }

    #[test]
    fn test_single_pixel_removed() {
        let page = speck_page();
        let (out, report) = despeckle_with_report(&page, DespecklePolicy::Normal, Dpi::uniform(300)).unwrap();
        assert_eq!(out.get_pixel(2, 2), Some(0));
        assert_eq!(out.get_pixel(12, 12), Some(1));
        assert_eq!(report.components, 2);
        assert_eq!(report.removed, 1);
        assert_eq!(report.removed_pixels, 1);
    }

    #[test]
    fn test_off_is_noop() {
        let page = speck_page();
        let out = despeckle(&page, DespecklePolicy::Off, Dpi::uniform(300)).unwrap();
        assert_eq!(out.data(), page.data());
    }

    #[test]
    fn test_thin_line_uses_min_dimension() {
        // a 1-pixel-high line 15 pixels long is still a speck by its min dimension
        let mut img = RasterBuffer::new(20, 5, PixelFormat::Bit1).unwrap().to_mut();
        for x in 0..15 {
            img.set_pixel(x, 2, 1).unwrap();
        }
        let img: RasterBuffer = img.into();
        let out = despeckle(&img, DespecklePolicy::Cautious, Dpi::uniform(300)).unwrap();
        assert_eq!(out.count_black().unwrap(), 0);
    }

    #[test]
    fn test_rejects_gray() {
        let img = RasterBuffer::new(2, 2, PixelFormat::Gray8).unwrap();
        assert!(despeckle(&img, DespecklePolicy::Normal, Dpi::default()).is_err());
    }

    #[test]
    fn test_policy_serde_names() {
        let p: DespecklePolicy = serde_json::from_str("\"aggressive\"").unwrap();
        assert_eq!(p, DespecklePolicy::Aggressive);
    }
}
