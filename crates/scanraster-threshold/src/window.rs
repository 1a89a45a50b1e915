//! Local window geometry
//!
//! Adaptive methods evaluate statistics over a square window centred on
//! each pixel. The requested size is normalized against the image before
//! use:
//!
//! - sizes must be odd and at least 3; even sizes round down to the next
//!   odd value
//! - a window larger than the image is clamped, per axis, to the largest
//!   odd size that fits
//! - an axis shorter than 3 pixels uses a window of 1
//!
//! A window of length `len` centred at `x` spans
//! `[x - len / 2, x - len / 2 + len)`, clipped to the image.

/// Smallest window accepted for adaptive methods
pub const MIN_WINDOW: u32 = 3;

/// Normalized window dimensions for a specific image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    /// Window width in pixels (odd)
    pub width: u32,
    /// Window height in pixels (odd)
    pub height: u32,
}

impl WindowSize {
    /// Normalize a requested square window against an image size.
    ///
    /// # Arguments
    ///
    /// * `requested` - Requested window side length
    /// * `image_width` - Image width in pixels
    /// * `image_height` - Image height in pixels
    pub fn normalize(requested: u32, image_width: u32, image_height: u32) -> Self {
        let base = round_to_odd(requested).max(MIN_WINDOW);
        Self {
            width: fit_axis(base, image_width),
            height: fit_axis(base, image_height),
        }
    }

    /// Pixel span `[start, end)` of the window centred at `center` on an
    /// axis of length `extent`.
    #[inline]
    pub fn span(len: u32, center: u32, extent: u32) -> (u32, u32) {
        let start = center as i64 - (len / 2) as i64;
        let end = start + len as i64;
        (start.max(0) as u32, end.min(extent as i64) as u32)
    }
}

/// Round down to an odd value (0 stays 0).
fn round_to_odd(size: u32) -> u32 {
    if size % 2 == 0 { size.saturating_sub(1) } else { size }
}

fn fit_axis(size: u32, extent: u32) -> u32 {
    if extent < MIN_WINDOW {
        1
    } else if size > extent {
        round_to_odd(extent)
    } else {
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_rounds_down() {
        assert_eq!(WindowSize::normalize(20, 100, 100).width, 19);
        assert_eq!(WindowSize::normalize(4, 100, 100).width, 3);
    }

    #[test]
    fn test_minimum_is_three() {
        let w = WindowSize::normalize(1, 100, 100);
        assert_eq!((w.width, w.height), (3, 3));
        assert_eq!(WindowSize::normalize(0, 100, 100).width, 3);
        assert_eq!(WindowSize::normalize(2, 100, 100).width, 3);
    }

    #[test]
    fn test_clamp_per_axis() {
        let w = WindowSize::normalize(199, 50, 120);
        assert_eq!((w.width, w.height), (49, 119));
        let w = WindowSize::normalize(199, 51, 2);
        assert_eq!((w.width, w.height), (51, 1));
    }

    #[test]
    fn test_span_clips() {
        assert_eq!(WindowSize::span(5, 0, 10), (0, 3));
        assert_eq!(WindowSize::span(5, 5, 10), (3, 8));
        assert_eq!(WindowSize::span(5, 9, 10), (7, 10));
        assert_eq!(WindowSize::span(1, 4, 10), (4, 5));
    }
}
