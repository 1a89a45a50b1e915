//! Gray level histogram

use super::{PixelFormat, RasterBuffer};
use crate::error::{Error, Result};
use crate::mask::Mask;

/// 256-bin histogram of an 8-bit gray raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayHistogram {
    bins: [u64; 256],
}

impl GrayHistogram {
    /// Build a histogram from raw bin counts.
    pub fn from_bins(bins: [u64; 256]) -> Self {
        Self { bins }
    }

    /// Build a histogram of an 8-bit raster.
    ///
    /// If `mask` is given, only pixels where the mask is set are counted.
    ///
    /// # Errors
    ///
    /// Returns an error if the raster is not 8-bit gray or the mask size
    /// differs from the raster size.
    pub fn from_raster(image: &RasterBuffer, mask: Option<&Mask>) -> Result<Self> {
        image.require_format(PixelFormat::Gray8)?;
        if let Some(mask) = mask {
            mask.check_size(image.size())?;
        }

        let mut bins = [0u64; 256];
        match mask {
            None => {
                for &v in image.data() {
                    bins[(v & 0xff) as usize] += 1;
                }
            }
            Some(mask) => {
                for (&v, &keep) in image.data().iter().zip(mask.bits()) {
                    if keep {
                        bins[(v & 0xff) as usize] += 1;
                    }
                }
            }
        }
        Ok(Self { bins })
    }

    /// Get the bin counts.
    #[inline]
    pub fn bins(&self) -> &[u64; 256] {
        &self.bins
    }

    /// Get one bin count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `level > 255`.
    pub fn get(&self, level: usize) -> Result<u64> {
        self.bins
            .get(level)
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                index: level,
                len: 256,
            })
    }

    /// Total number of counted pixels.
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Sum of `level * count` over all bins.
    pub fn weighted_sum(&self) -> u64 {
        self.bins
            .iter()
            .enumerate()
            .map(|(level, &count)| level as u64 * count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts() {
        let img = RasterBuffer::from_gray_bytes(2, 2, &[0, 0, 255, 7]).unwrap();
        let hist = GrayHistogram::from_raster(&img, None).unwrap();
        assert_eq!(hist.get(0).unwrap(), 2);
        assert_eq!(hist.get(7).unwrap(), 1);
        assert_eq!(hist.get(255).unwrap(), 1);
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.weighted_sum(), 262);
        assert!(hist.get(256).is_err());
    }

    #[test]
    fn test_histogram_with_mask() {
        let img = RasterBuffer::from_gray_bytes(2, 2, &[10, 20, 30, 40]).unwrap();
        let mut mask = Mask::new(2, 2).unwrap();
        mask.set(1, 1, true);
        let hist = GrayHistogram::from_raster(&img, Some(&mask)).unwrap();
        assert_eq!(hist.total(), 1);
        assert_eq!(hist.get(40).unwrap(), 1);
    }

    #[test]
    fn test_histogram_mask_size_mismatch() {
        let img = RasterBuffer::from_gray_bytes(2, 2, &[10, 20, 30, 40]).unwrap();
        let mask = Mask::new(3, 2).unwrap();
        assert!(GrayHistogram::from_raster(&img, Some(&mask)).is_err());
    }
}
