//! Image scaling
//!
//! - Sampling (nearest neighbor), used for 1-bit images
//! - Bilinear interpolation, used for gray and colour images

use super::{Dpi, PixelFormat, RasterBuffer, RasterData};
use crate::color;
use crate::error::{Error, Result};
use std::sync::Arc;

/// Scaling method to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleMethod {
    /// Nearest-neighbor sampling
    Sampling,
    /// Bilinear interpolation (falls back to sampling for 1-bit images)
    Linear,
}

impl RasterBuffer {
    /// Scale the image to an exact size.
    ///
    /// The resolution tag is scaled along with the pixel grid so that the
    /// physical page size is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if the target size is zero.
    pub fn scale_to_size(&self, width: u32, height: u32, method: ScaleMethod) -> Result<RasterBuffer> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        if (width, height) == self.size() {
            return Ok(self.clone());
        }

        let sx = self.width() as f64 / width as f64;
        let sy = self.height() as f64 / height as f64;
        let method = if self.format() == PixelFormat::Bit1 {
            ScaleMethod::Sampling
        } else {
            method
        };

        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let v = match method {
                    ScaleMethod::Sampling => self.sample_nearest(x, y, sx, sy),
                    ScaleMethod::Linear => self.sample_linear(x, y, sx, sy),
                };
                data.push(v);
            }
        }

        let dpi = self.dpi();
        let scaled_dpi = Dpi::new(
            ((dpi.horizontal as f64) / sx).round().max(1.0) as u32,
            ((dpi.vertical as f64) / sy).round().max(1.0) as u32,
        );

        Ok(RasterBuffer {
            inner: Arc::new(RasterData {
                width,
                height,
                format: self.format(),
                dpi: scaled_dpi,
                data,
            }),
        })
    }

    /// Rescale the image so that its resolution becomes `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if either resolution has a zero
    /// axis.
    pub fn scale_to_dpi(&self, target: Dpi) -> Result<RasterBuffer> {
        let source = self.dpi();
        if !source.is_valid() || !target.is_valid() {
            return Err(Error::InvalidParameter(format!(
                "resolution must be non-zero: source {:?}, target {:?}",
                source, target
            )));
        }
        if source == target {
            return Ok(self.clone());
        }

        let width = ((self.width() as u64 * target.horizontal as u64 + source.horizontal as u64 / 2)
            / source.horizontal as u64)
            .max(1) as u32;
        let height = ((self.height() as u64 * target.vertical as u64 + source.vertical as u64 / 2)
            / source.vertical as u64)
            .max(1) as u32;
        let scaled = self.scale_to_size(width, height, ScaleMethod::Linear)?;
        Ok(scaled.with_dpi(target))
    }

    fn sample_nearest(&self, x: u32, y: u32, sx: f64, sy: f64) -> u32 {
        let src_x = (((x as f64 + 0.5) * sx) as u32).min(self.width() - 1);
        let src_y = (((y as f64 + 0.5) * sy) as u32).min(self.height() - 1);
        self.data()[src_y as usize * self.width() as usize + src_x as usize]
    }

    fn sample_linear(&self, x: u32, y: u32, sx: f64, sy: f64) -> u32 {
        let fx = ((x as f64 + 0.5) * sx - 0.5).max(0.0);
        let fy = ((y as f64 + 0.5) * sy - 0.5).max(0.0);
        let x0 = (fx.floor() as u32).min(self.width() - 1);
        let y0 = (fy.floor() as u32).min(self.height() - 1);
        let x1 = (x0 + 1).min(self.width() - 1);
        let y1 = (y0 + 1).min(self.height() - 1);
        let dx = fx - x0 as f64;
        let dy = fy - y0 as f64;

        let w = self.width() as usize;
        let p00 = self.data()[y0 as usize * w + x0 as usize];
        let p10 = self.data()[y0 as usize * w + x1 as usize];
        let p01 = self.data()[y1 as usize * w + x0 as usize];
        let p11 = self.data()[y1 as usize * w + x1 as usize];

        let lerp = |a: u8, b: u8, c: u8, d: u8| -> u8 {
            let top = a as f64 * (1.0 - dx) + b as f64 * dx;
            let bottom = c as f64 * (1.0 - dx) + d as f64 * dx;
            (top * (1.0 - dy) + bottom * dy).round().clamp(0.0, 255.0) as u8
        };

        match self.format() {
            PixelFormat::Rgb32 => {
                let r = lerp(
                    color::red(p00),
                    color::red(p10),
                    color::red(p01),
                    color::red(p11),
                );
                let g = lerp(
                    color::green(p00),
                    color::green(p10),
                    color::green(p01),
                    color::green(p11),
                );
                let b = lerp(
                    color::blue(p00),
                    color::blue(p10),
                    color::blue(p01),
                    color::blue(p11),
                );
                color::compose_rgb(r, g, b)
            }
            _ => lerp(p00 as u8, p10 as u8, p01 as u8, p11 as u8) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_to_dpi_doubles_size() {
        let img = RasterBuffer::new_filled(10, 5, PixelFormat::Gray8, 90)
            .unwrap()
            .with_dpi(Dpi::uniform(150));
        let scaled = img.scale_to_dpi(Dpi::uniform(300)).unwrap();
        assert_eq!(scaled.size(), (20, 10));
        assert_eq!(scaled.dpi(), Dpi::uniform(300));
        assert!(scaled.data().iter().all(|&v| v == 90));
    }

    #[test]
    fn test_scale_to_dpi_same_is_identity() {
        let img = RasterBuffer::new(4, 4, PixelFormat::Rgb32).unwrap();
        let scaled = img.scale_to_dpi(img.dpi()).unwrap();
        assert_eq!(scaled.size(), img.size());
    }

    #[test]
    fn test_scale_binary_uses_sampling() {
        let mut m = RasterBuffer::new(2, 2, PixelFormat::Bit1).unwrap().to_mut();
        m.set_pixel(0, 0, 1).unwrap();
        let img: RasterBuffer = m.into();
        let scaled = img.scale_to_size(4, 4, ScaleMethod::Linear).unwrap();
        assert_eq!(scaled.count_black().unwrap(), 4);
        assert_eq!(scaled.get_pixel(1, 1), Some(1));
        assert_eq!(scaled.get_pixel(2, 2), Some(0));
    }

    #[test]
    fn test_scale_rejects_zero_dpi() {
        let img = RasterBuffer::new(4, 4, PixelFormat::Gray8).unwrap();
        assert!(img.scale_to_dpi(Dpi::new(0, 300)).is_err());
    }
}
