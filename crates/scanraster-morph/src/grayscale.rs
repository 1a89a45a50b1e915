//! Grayscale morphological operations
//!
//! Implements erosion, dilation and the morphological gradient for 8-bit
//! grayscale images with a rectangular (brick) window.
//!
//! # Algorithm
//!
//! The window extreme is separable: a row pass with the window width is
//! followed by a column pass with the window height. Each 1-D pass uses
//! the van Herk / Gil-Werman block decomposition:
//!
//! - the line is split into blocks of the window length
//! - `g[i]` holds the running extreme from the block start up to `i`
//! - `h[i]` holds the running extreme from `i` to the block end
//! - the window `[i, i + len)` is `pick(h[i], g[i + len - 1])`
//!
//! That costs three comparisons per pixel regardless of the window size
//! and is exact. Pixels outside the image act as the identity of the
//! operation (255 for min, 0 for max), so windows are clipped at the
//! borders. A window of length `len` covers `[x - len / 2, x - len / 2 + len)`.

use crate::error::{MorphError, MorphResult, require_gray};
use scanraster_core::{PixelFormat, RasterBuffer};

/// Which extreme a pass computes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Min,
    Max,
}

impl Extreme {
    #[inline]
    fn identity(self) -> u8 {
        match self {
            Extreme::Min => 255,
            Extreme::Max => 0,
        }
    }

    #[inline]
    fn pick(self, a: u8, b: u8) -> u8 {
        match self {
            Extreme::Min => a.min(b),
            Extreme::Max => a.max(b),
        }
    }
}

/// Scratch buffers reused across lines
struct LineScratch {
    g: Vec<u8>,
    h: Vec<u8>,
}

impl LineScratch {
    fn new() -> Self {
        Self {
            g: Vec::new(),
            h: Vec::new(),
        }
    }

    /// Running extreme of `src` into `dst` for a window of length `len`.
    fn run(&mut self, src: &[u8], dst: &mut [u8], len: usize, op: Extreme) {
        let n = src.len();
        if len <= 1 {
            dst.copy_from_slice(src);
            return;
        }

        let lower = len / 2;
        let padded_len = n + len - 1;
        let value = |i: usize| -> u8 {
            if i < lower || i >= lower + n {
                op.identity()
            } else {
                src[i - lower]
            }
        };

        self.g.resize(padded_len, 0);
        self.h.resize(padded_len, 0);

        for i in 0..padded_len {
            self.g[i] = if i % len == 0 {
                value(i)
            } else {
                op.pick(self.g[i - 1], value(i))
            };
        }
        for i in (0..padded_len).rev() {
            self.h[i] = if i == padded_len - 1 || (i + 1) % len == 0 {
                value(i)
            } else {
                op.pick(self.h[i + 1], value(i))
            };
        }

        for (i, out) in dst.iter_mut().enumerate() {
            *out = op.pick(self.h[i], self.g[i + len - 1]);
        }
    }
}

/// Compute the windowed extreme of a whole image.
fn windowed_extreme(image: &RasterBuffer, width: u32, height: u32, op: Extreme) -> MorphResult<RasterBuffer> {
    require_gray(image)?;
    if width == 0 || height == 0 {
        return Err(MorphError::InvalidParameters(format!(
            "window must be at least 1x1, got {}x{}",
            width, height
        )));
    }

    let w = image.width() as usize;
    let h = image.height() as usize;
    let src: Vec<u8> = image.data().iter().map(|&v| v as u8).collect();
    let mut rows = vec![0u8; w * h];
    let mut scratch = LineScratch::new();

    for y in 0..h {
        let line = &src[y * w..(y + 1) * w];
        scratch.run(line, &mut rows[y * w..(y + 1) * w], width as usize, op);
    }

    let mut column = vec![0u8; h];
    let mut column_out = vec![0u8; h];
    let mut out = image.create_template(PixelFormat::Gray8)?;
    {
        let data = out.data_mut();
        for x in 0..w {
            for y in 0..h {
                column[y] = rows[y * w + x];
            }
            scratch.run(&column, &mut column_out, height as usize, op);
            for y in 0..h {
                data[y * w + x] = column_out[y] as u32;
            }
        }
    }
    Ok(out.into())
}

/// Erode a grayscale image with a brick window
///
/// Each output pixel is the minimum over the `width` x `height` window
/// around it, clipped to the image.
///
/// # Errors
///
/// Returns an error if the image is not 8-bit gray or a window dimension
/// is zero.
pub fn erode_gray(image: &RasterBuffer, width: u32, height: u32) -> MorphResult<RasterBuffer> {
    windowed_extreme(image, width, height, Extreme::Min)
}

/// Dilate a grayscale image with a brick window
///
/// Each output pixel is the maximum over the `width` x `height` window
/// around it, clipped to the image.
///
/// # Errors
///
/// Returns an error if the image is not 8-bit gray or a window dimension
/// is zero.
pub fn dilate_gray(image: &RasterBuffer, width: u32, height: u32) -> MorphResult<RasterBuffer> {
    windowed_extreme(image, width, height, Extreme::Max)
}

/// Local minimum and maximum over the same window
///
/// # Arguments
///
/// * `image` - 8-bit gray input
/// * `width` - Window width (1 means no horizontal extent)
/// * `height` - Window height
///
/// # Returns
///
/// `(min_image, max_image)`, both the size of the input.
///
/// # Errors
///
/// Returns an error if the image is not 8-bit gray or a window dimension
/// is zero.
pub fn local_min_max(image: &RasterBuffer, width: u32, height: u32) -> MorphResult<(RasterBuffer, RasterBuffer)> {
    let min = erode_gray(image, width, height)?;
    let max = dilate_gray(image, width, height)?;
    Ok((min, max))
}

/// Grayscale morphological gradient (dilation - erosion)
///
/// Highlights edges: flat areas map to 0 regardless of their gray level.
///
/// # Errors
///
/// Returns an error if the image is not 8-bit gray or a window dimension
/// is zero.
pub fn gradient_gray(image: &RasterBuffer, width: u32, height: u32) -> MorphResult<RasterBuffer> {
    let (min, max) = local_min_max(image, width, height)?;
    let mut out = max.to_mut();
    for (d, &lo) in out.data_mut().iter_mut().zip(min.data()) {
        *d -= lo;
    }
    Ok(out.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(image: &RasterBuffer, w: u32, h: u32, op: Extreme) -> Vec<u32> {
        let (iw, ih) = (image.width() as i64, image.height() as i64);
        let (lx, ly) = ((w / 2) as i64, (h / 2) as i64);
        let mut out = Vec::new();
        for y in 0..ih {
            for x in 0..iw {
                let mut acc = op.identity();
                for yy in (y - ly)..(y - ly + h as i64) {
                    for xx in (x - lx)..(x - lx + w as i64) {
                        if xx >= 0 && yy >= 0 && xx < iw && yy < ih {
                            let v = image.get_pixel(xx as u32, yy as u32).unwrap_or(0) as u8;
                            acc = op.pick(acc, v);
                        }
                    }
                }
                out.push(acc as u32);
            }
        }
        out
    }

    fn sample() -> RasterBuffer {
        let bytes: Vec<u8> = (0..7 * 5).map(|i| ((i * 37 + 11) % 256) as u8).collect();
        RasterBuffer::from_gray_bytes(7, 5, &bytes).unwrap()
    }

    #[test]
    fn test_erode_matches_naive() {
        let img = sample();
        for w in 1..=9 {
            for h in 1..=7 {
                let fast = erode_gray(&img, w, h).unwrap();
                assert_eq!(fast.data(), naive(&img, w, h, Extreme::Min), "{}x{}", w, h);
            }
        }
    }

    #[test]
    fn test_dilate_matches_naive() {
        let img = sample();
        for w in 1..=9 {
            for h in 1..=7 {
                let fast = dilate_gray(&img, w, h).unwrap();
                assert_eq!(fast.data(), naive(&img, w, h, Extreme::Max), "{}x{}", w, h);
            }
        }
    }

    #[test]
    fn test_zero_window_rejected() {
        let img = sample();
        assert!(erode_gray(&img, 0, 3).is_err());
    }

    #[test]
    fn test_requires_gray() {
        let img = RasterBuffer::new(3, 3, PixelFormat::Bit1).unwrap();
        assert!(matches!(
            dilate_gray(&img, 3, 3),
            Err(MorphError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_gradient_of_flat_is_zero() {
        let img = RasterBuffer::new_filled(6, 6, PixelFormat::Gray8, 140).unwrap();
        let g = gradient_gray(&img, 3, 3).unwrap();
        assert!(g.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_gradient_marks_step_edge() {
        let bytes: Vec<u8> = (0..16).map(|i| if i % 4 < 2 { 0 } else { 200 }).collect();
        let img = RasterBuffer::from_gray_bytes(4, 4, &bytes).unwrap();
        let g = gradient_gray(&img, 3, 3).unwrap();
        assert_eq!(g.get_pixel(1, 0), Some(200));
        assert_eq!(g.get_pixel(2, 0), Some(200));
    }
}
