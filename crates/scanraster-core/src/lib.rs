//! Scanraster Core - Basic data structures for page output processing
//!
//! This crate provides the fundamental data structures used throughout
//! the scanraster output engine:
//!
//! - [`RasterBuffer`] / [`RasterBufferMut`] - The page image container (immutable / mutable)
//! - [`Mask`] - Boolean grid aligned with a working image
//! - [`Rect`] - Rectangle regions
//! - [`GrayHistogram`] - 256-bin gray level histogram
//! - [`Dpi`] - Physical resolution
//! - [`ConnectivityType`] - 4-way / 8-way pixel neighborhoods
//!
//! # See also
//!
//! The `scanraster` facade crate re-exports the whole public API.

pub mod connectivity;
pub mod error;
pub mod mask;
pub mod raster;
pub mod rect;

pub use connectivity::ConnectivityType;
pub use error::{Error, Result};
pub use mask::Mask;
pub use raster::{Dpi, GrayHistogram, PixelFormat, RasterBuffer, RasterBufferMut, ScaleMethod};
pub use rect::Rect;

/// Color channel helpers for 32-bit pixels.
///
/// # Pixel format
///
/// 32-bit pixels are stored as `0xRRGGBBAA` (red in MSB, alpha in LSB).
/// Alpha is always opaque in rasters produced by this crate.
pub mod color {
    /// Shift amounts for extracting color channels
    pub const RED_SHIFT: u32 = 24;
    pub const GREEN_SHIFT: u32 = 16;
    pub const BLUE_SHIFT: u32 = 8;

    /// Opaque white
    pub const WHITE: u32 = 0xffff_ffff;
    /// Opaque black
    pub const BLACK: u32 = 0x0000_00ff;

    /// Extract red component from a 32-bit pixel.
    #[inline]
    pub fn red(pixel: u32) -> u8 {
        ((pixel >> RED_SHIFT) & 0xff) as u8
    }

    /// Extract green component from a 32-bit pixel.
    #[inline]
    pub fn green(pixel: u32) -> u8 {
        ((pixel >> GREEN_SHIFT) & 0xff) as u8
    }

    /// Extract blue component from a 32-bit pixel.
    #[inline]
    pub fn blue(pixel: u32) -> u8 {
        ((pixel >> BLUE_SHIFT) & 0xff) as u8
    }

    /// Compose an opaque 32-bit pixel from RGB components.
    #[inline]
    pub fn compose_rgb(r: u8, g: u8, b: u8) -> u32 {
        ((r as u32) << RED_SHIFT) | ((g as u32) << GREEN_SHIFT) | ((b as u32) << BLUE_SHIFT) | 0xff
    }

    /// Perceived gray level of a 32-bit pixel.
    ///
    /// Integer weights `(11 r + 16 g + 5 b) / 32`.
    #[inline]
    pub fn luminance(pixel: u32) -> u8 {
        let r = red(pixel) as u32;
        let g = green(pixel) as u32;
        let b = blue(pixel) as u32;
        ((r * 11 + g * 16 + b * 5) / 32) as u8
    }

}
