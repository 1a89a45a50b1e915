//! Mask - Boolean grids aligned with a working image
//!
//! Masks select pixels for compositing decisions. They are always sized
//! exactly to the image they belong to; every combining operation checks
//! the sizes first and fails with [`Error::DimensionMismatch`] otherwise.

use crate::error::{Error, Result};
use crate::rect::Rect;

/// Boolean pixel mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// Create an empty mask (no pixel set).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::filled(width, height, false)
    }

    /// Create a mask with every pixel set to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn filled(width: u32, height: u32, value: bool) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        Ok(Self {
            width,
            height,
            bits: vec![value; width as usize * height as usize],
        })
    }

    /// Wrap a row-major vector of bits.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are zero or the vector length is
    /// not `width * height`.
    pub fn from_bits(width: u32, height: u32, bits: Vec<bool>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let expected = width as usize * height as usize;
        if bits.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: bits.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Get the mask width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the mask height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get `(width, height)`.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get the row-major bits.
    #[inline]
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Get one bit; out-of-bounds coordinates read as unset.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Set one bit; out-of-bounds coordinates are ignored.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if x < self.width && y < self.height {
            self.bits[y as usize * self.width as usize + x as usize] = value;
        }
    }

    /// Set or clear every pixel inside `rect` (clipped to the mask).
    pub fn fill_rect(&mut self, rect: &Rect, value: bool) {
        let bounds = Rect::new_unchecked(0, 0, self.width as i32, self.height as i32);
        let Some(clipped) = rect.intersect(&bounds) else {
            return;
        };
        for y in clipped.y..clipped.bottom() {
            let row = y as usize * self.width as usize;
            for x in clipped.x..clipped.right() {
                self.bits[row + x as usize] = value;
            }
        }
    }

    /// Number of set pixels.
    pub fn count(&self) -> u64 {
        self.bits.iter().filter(|&&b| b).count() as u64
    }

    /// True if no pixel is set.
    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|&b| b)
    }

    /// Verify that this mask has the expected size.
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

    /// `self |= other`
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the sizes differ.
    pub fn or_assign(&mut self, other: &Mask) -> Result<()> {
        other.check_size(self.size())?;
        for (a, &b) in self.bits.iter_mut().zip(&other.bits) {
            *a |= b;
        }
        Ok(())
    }

    /// `self &= other`
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the sizes differ.
    pub fn and_assign(&mut self, other: &Mask) -> Result<()> {
        other.check_size(self.size())?;
        for (a, &b) in self.bits.iter_mut().zip(&other.bits) {
            *a &= b;
        }
        Ok(())
    }

    /// `self &= !other`
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the sizes differ.
    pub fn and_not_assign(&mut self, other: &Mask) -> Result<()> {
        other.check_size(self.size())?;
        for (a, &b) in self.bits.iter_mut().zip(&other.bits) {
            *a &= !b;
        }
        Ok(())
    }

    /// Flip every bit in place.
    pub fn invert(&mut self) {
        for b in &mut self.bits {
            *b = !*b;
        }
    }

    /// Bounding rectangle of the set pixels, or `None` if empty.
    pub fn bounding_rect(&self) -> Option<Rect> {
        let (mut left, mut top) = (u32::MAX, u32::MAX);
        let (mut right, mut bottom) = (0u32, 0u32);
        let mut any = false;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    any = true;
                    left = left.min(x);
                    right = right.max(x);
                    top = top.min(y);
                    bottom = bottom.max(y);
                }
            }
        }
        any.then(|| Rect::from_inclusive(left as i32, top as i32, right as i32, bottom as i32))
    }
}
