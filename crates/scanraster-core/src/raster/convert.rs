//! Pixel format conversions
//!
//! Conversions between bi-level, gray and colour rasters, and between
//! 1-bit rasters and [`Mask`]s.

use super::{Dpi, PixelFormat, RasterBuffer, RasterData, sample_to_gray};
use crate::color;
use crate::error::{Error, Result};
use crate::mask::Mask;
use std::sync::Arc;

impl RasterBuffer {
    /// Convert to an 8-bit grayscale raster.
    ///
    /// Gray input is returned as a cheap clone. Colour input uses
    /// [`color::luminance`]; 1-bit black becomes 0 and white 255.
    pub fn to_gray(&self) -> RasterBuffer {
        if self.format() == PixelFormat::Gray8 {
            return self.clone();
        }
        let format = self.format();
        let data = self
            .data()
            .iter()
            .map(|&v| sample_to_gray(format, v) as u32)
            .collect();
        self.with_data(PixelFormat::Gray8, data)
    }

    /// Convert to a 32-bit colour raster.
    ///
    /// Colour input is returned as a cheap clone.
    pub fn to_rgb(&self) -> RasterBuffer {
        if self.format() == PixelFormat::Rgb32 {
            return self.clone();
        }
        let format = self.format();
        let data = self
            .data()
            .iter()
            .map(|&v| {
                let g = sample_to_gray(format, v);
                color::compose_rgb(g, g, g)
            })
            .collect();
        self.with_data(PixelFormat::Rgb32, data)
    }

    /// Convert a 1-bit raster into a mask where black pixels are set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] if the raster is not 1-bit.
    pub fn to_mask(&self) -> Result<Mask> {
        self.require_format(PixelFormat::Bit1)?;
        let bits = self.data().iter().map(|&v| v != 0).collect();
        Mask::from_bits(self.width(), self.height(), bits)
    }

    /// Create a 1-bit raster from a mask; set mask pixels become black.
    pub fn from_mask(mask: &Mask, dpi: Dpi) -> RasterBuffer {
        let data = mask.bits().iter().map(|&b| b as u32).collect();
        RasterBuffer {
            inner: Arc::new(RasterData {
                width: mask.width(),
                height: mask.height(),
                format: PixelFormat::Bit1,
                dpi,
                data,
            }),
        }
    }

    /// Invert a 1-bit or 8-bit raster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for colour rasters.
    pub fn invert(&self) -> Result<RasterBuffer> {
        let max = match self.format() {
            PixelFormat::Bit1 => 1,
            PixelFormat::Gray8 => 255,
            PixelFormat::Rgb32 => return Err(Error::UnsupportedFormat("1-bit or 8-bit gray")),
        };
        let data = self.data().iter().map(|&v| max - v).collect();
        Ok(self.with_data(self.format(), data))
    }

    /// Count black pixels of a 1-bit raster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] if the raster is not 1-bit.
    pub fn count_black(&self) -> Result<u64> {
        self.require_format(PixelFormat::Bit1)?;
        Ok(self.data().iter().filter(|&&v| v != 0).count() as u64)
    }

    /// Stretch the gray range so that the darkest `black_fraction` and the
    /// brightest `white_fraction` of pixels saturate to 0 and 255.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] if the raster is not 8-bit gray,
    /// or [`Error::InvalidParameter`] if the fractions are outside `0..0.5`.
    pub fn stretch_gray_range(&self, black_fraction: f64, white_fraction: f64) -> Result<RasterBuffer> {
        self.require_format(PixelFormat::Gray8)?;
        if !(0.0..0.5).contains(&black_fraction) || !(0.0..0.5).contains(&white_fraction) {
            return Err(Error::InvalidParameter(format!(
                "stretch fractions must be in [0, 0.5): {}, {}",
                black_fraction, white_fraction
            )));
        }

        let hist = super::GrayHistogram::from_raster(self, None)?;
        let total = hist.total() as f64;
        let black_count = (total * black_fraction) as u64;
        let white_count = (total * white_fraction) as u64;

        let mut low = 0usize;
        let mut acc = 0u64;
        for (level, &count) in hist.bins().iter().enumerate() {
            acc += count;
            if acc > black_count {
                low = level;
                break;
            }
        }

        let mut high = 255usize;
        acc = 0;
        for (level, &count) in hist.bins().iter().enumerate().rev() {
            acc += count;
            if acc > white_count {
                high = level;
                break;
            }
        }

        if high <= low {
            return Ok(self.clone());
        }

        let range = (high - low) as f64;
        let data = self
            .data()
            .iter()
            .map(|&v| {
                let v = v as f64;
                let scaled = ((v - low as f64) * 255.0 / range).round();
                scaled.clamp(0.0, 255.0) as u32
            })
            .collect();
        Ok(self.with_data(PixelFormat::Gray8, data))
    }

    fn with_data(&self, format: PixelFormat, data: Vec<u32>) -> RasterBuffer {
        RasterBuffer {
            inner: Arc::new(RasterData {
                width: self.width(),
                height: self.height(),
                format,
                dpi: self.dpi(),
                data,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_gray_from_rgb() {
        let img = RasterBuffer::from_rgb_bytes(2, 1, &[255, 255, 255, 0, 0, 0]).unwrap();
        let gray = img.to_gray();
        assert_eq!(gray.format(), PixelFormat::Gray8);
        assert_eq!(gray.get_pixel(0, 0), Some(255));
        assert_eq!(gray.get_pixel(1, 0), Some(0));
    }

    #[test]
    fn test_mask_round_trip_preserves_black() {
        let mut m = RasterBuffer::new(3, 3, PixelFormat::Bit1).unwrap().to_mut();
        m.set_pixel(1, 1, 1).unwrap();
        let img: RasterBuffer = m.into();
        let mask = img.to_mask().unwrap();
        assert!(mask.get(1, 1));
        assert_eq!(mask.count(), 1);
        let back = RasterBuffer::from_mask(&mask, img.dpi());
        assert_eq!(back.data(), img.data());
    }

    #[test]
    fn test_to_mask_requires_bit1() {
        let img = RasterBuffer::new(3, 3, PixelFormat::Gray8).unwrap();
        assert!(img.to_mask().is_err());
    }

    #[test]
    fn test_invert_binary() {
        let img = RasterBuffer::new(2, 2, PixelFormat::Bit1).unwrap();
        let inv = img.invert().unwrap();
        assert_eq!(inv.count_black().unwrap(), 4);
    }

    #[test]
    fn test_stretch_gray_range_expands() {
        let bytes: Vec<u8> = (0..100).map(|i| 100 + (i % 50) as u8).collect();
        let img = RasterBuffer::from_gray_bytes(10, 10, &bytes).unwrap();
        let stretched = img.stretch_gray_range(0.0, 0.0).unwrap();
        let min = stretched.data().iter().min().copied().unwrap();
        let max = stretched.data().iter().max().copied().unwrap();
        assert_eq!(min, 0);
        assert_eq!(max, 255);
    }

    #[test]
    fn test_stretch_gray_range_uniform_is_identity() {
        let img = RasterBuffer::new_filled(5, 5, PixelFormat::Gray8, 128).unwrap();
        let stretched = img.stretch_gray_range(0.01, 0.01).unwrap();
        assert_eq!(stretched.data(), img.data());
    }
}
