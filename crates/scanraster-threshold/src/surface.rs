//! Threshold surfaces and the binarization rule
//!
//! A surface assigns a threshold to every pixel: either one global value
//! or a per-pixel field. Binarization uses
//!
//! ```text
//! black  iff  v < lower  ||  (v <= upper && v < t(x, y))
//! ```
//!
//! with `lower = 0`, `upper = 255` for every method except Wolf.

use crate::error::{ThresholdResult, require_gray};
use scanraster_core::{PixelFormat, RasterBuffer};

/// Per-pixel thresholds
///
/// Values already include the method's adjustment and may therefore lie
/// outside `0..=255`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdField {
    width: u32,
    height: u32,
    values: Vec<i32>,
    lower: u8,
    upper: u8,
}

impl ThresholdField {
    /// Create a field with default bounds `0..=255`.
    pub fn new(width: u32, height: u32, values: Vec<i32>) -> Self {
        Self {
            width,
            height,
            values,
            lower: 0,
            upper: 255,
        }
    }

    /// Set the hard bounds used by the binarization rule.
    pub fn with_bounds(mut self, lower: u8, upper: u8) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// Field width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Field height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Threshold at (x, y), if inside the field
    pub fn get(&self, x: u32, y: u32) -> Option<i32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Row-major thresholds
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Lower and upper hard bounds
    pub fn bounds(&self) -> (u8, u8) {
        (self.lower, self.upper)
    }
}

/// Threshold over a whole page
#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdSurface {
    /// One threshold for every pixel
    Global(u8),
    /// Per-pixel thresholds
    Field(ThresholdField),
}

impl ThresholdSurface {
    /// Threshold at (x, y)
    pub fn threshold_at(&self, x: u32, y: u32) -> Option<i32> {
        match self {
            Self::Global(t) => Some(*t as i32),
            Self::Field(field) => field.get(x, y),
        }
    }

    /// Apply the surface to a gray image
    ///
    /// # Returns
    ///
    /// A 1-bit raster of the same size and resolution, 1 = black.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is not 8-bit gray, or if a field
    /// surface does not match the image size.
    pub fn binarize(&self, gray: &RasterBuffer) -> ThresholdResult<RasterBuffer> {
        require_gray(gray)?;
        let mut out = gray.create_template(PixelFormat::Bit1)?;

        match self {
            Self::Global(t) => {
                let t = *t as u32;
                for (d, &v) in out.data_mut().iter_mut().zip(gray.data()) {
                    *d = u32::from(v < t);
                }
            }
            Self::Field(field) => {
                gray.check_size((field.width, field.height))?;
                let lower = field.lower as i32;
                let upper = field.upper as i32;
                for ((d, &v), &t) in out
                    .data_mut()
                    .iter_mut()
                    .zip(gray.data())
                    .zip(&field.values)
                {
                    let v = v as i32;
                    *d = u32::from(v < lower || (v <= upper && v < t));
                }
            }
        }

        Ok(out.into())
    }
}

/// Result of threshold estimation
#[derive(Debug, Clone)]
pub struct Estimate {
    /// Threshold surface for the page
    pub surface: ThresholdSurface,
    /// False if an iterative step stopped at its cap
    pub converged: bool,
    /// Iterations used by the iterative step, if any
    pub iterations: Option<u32>,
}

impl Estimate {
    /// Estimate without an iterative step
    pub fn direct(surface: ThresholdSurface) -> Self {
        Self {
            surface,
            converged: true,
            iterations: None,
        }
    }

    /// Binarize a gray image with this estimate's surface
    ///
    /// # Errors
    ///
    /// See [`ThresholdSurface::binarize`].
    pub fn binarize(&self, gray: &RasterBuffer) -> ThresholdResult<RasterBuffer> {
        self.surface.binarize(gray)
    }
}
