//! RasterBuffer - The page image container
//!
//! `RasterBuffer` is the image type passed between the steps of the
//! output stage. It holds bi-level, grayscale or colour samples plus the
//! physical resolution of the page.
//!
//! # Pixel layout
//!
//! - One 32-bit word per pixel, rows stored top to bottom
//! - 1-bit images store `1` for black (foreground) and `0` for white
//! - 8-bit images store the gray level in the low byte
//! - Colour images store `0xRRGGBBAA` (red in MSB), see [`crate::color`]
//!
//! # Ownership model
//!
//! `RasterBuffer` uses `Arc` for cheap cloning (shared ownership).
//! To modify pixel data, convert to `RasterBufferMut` via
//! [`RasterBuffer::try_into_mut`] or [`RasterBuffer::to_mut`], then convert
//! back with `Into<RasterBuffer>`.

mod convert;
mod histogram;
mod scale;

pub use histogram::GrayHistogram;
pub use scale::ScaleMethod;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Pixel format of a raster buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 1-bit bi-level image (1 = black)
    Bit1,
    /// 8-bit grayscale
    Gray8,
    /// 24-bit colour stored as `0xRRGGBBAA`
    Rgb32,
}

impl PixelFormat {
    /// Get the number of significant bits per pixel.
    pub fn bits(self) -> u32 {
        match self {
            PixelFormat::Bit1 => 1,
            PixelFormat::Gray8 => 8,
            PixelFormat::Rgb32 => 24,
        }
    }

    /// Get the maximum raw pixel value representable in this format.
    pub fn max_value(self) -> u32 {
        match self {
            PixelFormat::Bit1 => 1,
            PixelFormat::Gray8 => 255,
            PixelFormat::Rgb32 => u32::MAX,
        }
    }

    /// Human readable name, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::Bit1 => "1-bit",
            PixelFormat::Gray8 => "8-bit gray",
            PixelFormat::Rgb32 => "32-bit colour",
        }
    }
}

/// Physical resolution in dots per inch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dpi {
    /// Horizontal resolution
    pub horizontal: u32,
    /// Vertical resolution
    pub vertical: u32,
}

impl Dpi {
    /// Create a resolution with independent axes.
    pub const fn new(horizontal: u32, vertical: u32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Create a symmetric resolution.
    pub const fn uniform(dpi: u32) -> Self {
        Self::new(dpi, dpi)
    }

    /// The smaller of the two axes.
    pub fn min_axis(&self) -> u32 {
        self.horizontal.min(self.vertical)
    }

    /// Check that both axes are non-zero.
    pub fn is_valid(&self) -> bool {
        self.horizontal > 0 && self.vertical > 0
    }
}

impl Default for Dpi {
    fn default() -> Self {
        Self::uniform(300)
    }
}

/// Internal raster data
#[derive(Debug, Clone)]
struct RasterData {
    width: u32,
    height: u32,
    format: PixelFormat,
    dpi: Dpi,
    data: Vec<u32>,
}

/// Immutable, shareable page image
///
/// # Examples
///
/// ```
/// use scanraster_core::{PixelFormat, RasterBuffer};
///
/// let img = RasterBuffer::new(640, 480, PixelFormat::Gray8).unwrap();
/// assert_eq!(img.width(), 640);
/// assert_eq!(img.height(), 480);
/// ```
#[derive(Debug, Clone)]
pub struct RasterBuffer {
    inner: Arc<RasterData>,
}

impl RasterBuffer {
    /// Create a new raster with every pixel set to zero.
    ///
    /// Zero is white for 1-bit images and black for gray and colour.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        Self::new_filled(width, height, format, 0)
    }

    /// Create a new raster with every pixel set to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new_filled(width: u32, height: u32, format: PixelFormat, value: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let value = value.min(format.max_value());
        let data = vec![value; width as usize * height as usize];
        Ok(Self::from_parts(width, height, format, Dpi::default(), data))
    }

    /// Wrap 8-bit gray samples, one byte per pixel in row-major order.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are zero or the buffer length
    /// does not equal `width * height`.
    pub fn from_gray_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let expected = width as usize * height as usize;
        if bytes.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: bytes.len(),
            });
        }
        let data = bytes.iter().map(|&b| b as u32).collect();
        Ok(Self::from_parts(
            width,
            height,
            PixelFormat::Gray8,
            Dpi::default(),
            data,
        ))
    }

    /// Wrap packed RGB samples, three bytes per pixel in row-major order.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are zero or the buffer length
    /// does not equal `3 * width * height`.
    pub fn from_rgb_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let expected = 3 * width as usize * height as usize;
        if bytes.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: bytes.len(),
            });
        }
        let data = bytes
            .chunks_exact(3)
            .map(|c| crate::color::compose_rgb(c[0], c[1], c[2]))
            .collect();
        Ok(Self::from_parts(
            width,
            height,
            PixelFormat::Rgb32,
            Dpi::default(),
            data,
        ))
    }

    fn from_parts(width: u32, height: u32, format: PixelFormat, dpi: Dpi, data: Vec<u32>) -> Self {
        RasterBuffer {
            inner: Arc::new(RasterData {
                width,
                height,
                format,
                dpi,
                data,
            }),
        }
    }

    /// Return the same image tagged with a different resolution.
    pub fn with_dpi(mut self, dpi: Dpi) -> Self {
        Arc::make_mut(&mut self.inner).dpi = dpi;
        self
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get `(width, height)`.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.inner.width, self.inner.height)
    }

    /// Get the pixel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.inner.format
    }

    /// Get the physical resolution.
    #[inline]
    pub fn dpi(&self) -> Dpi {
        self.inner.dpi
    }

    /// Get raw access to the pixel words.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    /// Get the pixel words of one row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u32] {
        let w = self.inner.width as usize;
        let start = y as usize * w;
        &self.inner.data[start..start + w]
    }

    /// Get a raw pixel value, or `None` if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.inner.width || y >= self.inner.height {
            return None;
        }
        Some(self.inner.data[y as usize * self.inner.width as usize + x as usize])
    }

    /// Get the gray level of a pixel regardless of format.
    ///
    /// 1-bit black maps to 0 and white to 255; colour uses luminance.
    #[inline]
    pub fn get_gray(&self, x: u32, y: u32) -> Option<u8> {
        self.get_pixel(x, y)
            .map(|v| sample_to_gray(self.inner.format, v))
    }

    /// Check whether `other` has the same width and height.
    #[inline]
    pub fn same_size(&self, other: &RasterBuffer) -> bool {
        self.size() == other.size()
    }

    /// Verify that this image has the expected size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the sizes differ.
    pub fn check_size(&self, expected: (u32, u32)) -> Result<()> {
        if self.size() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: self.size(),
            });
        }
        Ok(())
    }

    /// Verify that the image has the given format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] naming the required format.
    pub fn require_format(&self, format: PixelFormat) -> Result<()> {
        if self.format() != format {
            return Err(Error::UnsupportedFormat(format.name()));
        }
        Ok(())
    }

    /// Get the number of strong references to this raster.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Try to convert into a mutable raster without copying.
    ///
    /// Succeeds only if this is the sole reference to the data.
    pub fn try_into_mut(self) -> std::result::Result<RasterBufferMut, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(data) => Ok(RasterBufferMut { inner: data }),
            Err(arc) => Err(RasterBuffer { inner: arc }),
        }
    }

    /// Create a mutable copy of this raster.
    pub fn to_mut(&self) -> RasterBufferMut {
        RasterBufferMut {
            inner: (*self.inner).clone(),
        }
    }

    /// Create a blank raster with the same size and resolution.
    ///
    /// # Errors
    ///
    /// Propagates dimension errors (never fails for a valid source).
    pub fn create_template(&self, format: PixelFormat) -> Result<RasterBufferMut> {
        let blank = Self::new(self.width(), self.height(), format)?.with_dpi(self.dpi());
        Ok(blank.try_into_mut().unwrap_or_else(|r| r.to_mut()))
    }
}

/// Convert a raw sample in `format` to a gray level.
#[inline]
pub(crate) fn sample_to_gray(format: PixelFormat, value: u32) -> u8 {
    match format {
        PixelFormat::Bit1 => {
            if value & 1 == 1 {
                0
            } else {
                255
            }
        }
        PixelFormat::Gray8 => (value & 0xff) as u8,
        PixelFormat::Rgb32 => crate::color::luminance(value),
    }
}

/// Mutable page image
///
/// Obtained from [`RasterBuffer::try_into_mut`] or [`RasterBuffer::to_mut`].
#[derive(Debug)]
pub struct RasterBufferMut {
    inner: RasterData,
}

impl RasterBufferMut {
    /// Get the image width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the pixel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.inner.format
    }

    /// Get the physical resolution.
    #[inline]
    pub fn dpi(&self) -> Dpi {
        self.inner.dpi
    }

    /// Set the physical resolution.
    pub fn set_dpi(&mut self, dpi: Dpi) {
        self.inner.dpi = dpi;
    }

    /// Get a raw pixel value, or `None` if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.inner.width || y >= self.inner.height {
            return None;
        }
        Some(self.inner.data[y as usize * self.inner.width as usize + x as usize])
    }

    /// Set a raw pixel value.
    ///
    /// The value is clamped to the range of the format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `(x, y)` lies outside the image.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: u32) -> Result<()> {
        if x >= self.inner.width || y >= self.inner.height {
            let len = self.inner.data.len();
            return Err(Error::IndexOutOfBounds {
                index: y as usize * self.inner.width as usize + x as usize,
                len,
            });
        }
        self.set_pixel_unchecked(x, y, value);
        Ok(())
    }

    /// Set a raw pixel value without a bounds check on the coordinates.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the image.
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, value: u32) {
        let idx = y as usize * self.inner.width as usize + x as usize;
        self.inner.data[idx] = value.min(self.inner.format.max_value());
    }

    /// Set every pixel to `value`.
    pub fn fill(&mut self, value: u32) {
        let value = value.min(self.inner.format.max_value());
        self.inner.data.fill(value);
    }

    /// Get raw access to the pixel words.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    /// Get mutable access to the pixel words.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.inner.data
    }
}

impl From<RasterBufferMut> for RasterBuffer {
    fn from(raster_mut: RasterBufferMut) -> Self {
        RasterBuffer {
            inner: Arc::new(raster_mut.inner),
        }
    }
}
