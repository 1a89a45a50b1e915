//! Local statistics using integral images
//!
//! Computes the local mean and standard deviation over a rectangular
//! window in O(1) per pixel using summed area tables of the pixel values
//! and of their squares. The tables carry a zero row and column so that
//! any clipped window is four lookups.

use crate::error::{ThresholdResult, require_gray};
use crate::window::WindowSize;
use scanraster_core::RasterBuffer;

/// Summed area tables for values and squared values
pub struct IntegralImage {
    width: usize,
    sum: Vec<f64>,
    sq_sum: Vec<f64>,
}

impl IntegralImage {
    /// Build the tables from an 8-bit gray image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is not 8-bit gray.
    pub fn new(image: &RasterBuffer) -> ThresholdResult<Self> {
        require_gray(image)?;
        let w = image.width() as usize;
        let h = image.height() as usize;
        let stride = w + 1;
        let mut sum = vec![0.0f64; stride * (h + 1)];
        let mut sq_sum = vec![0.0f64; stride * (h + 1)];

        for y in 0..h {
            let row = image.row(y as u32);
            let mut row_sum = 0.0;
            let mut row_sq = 0.0;
            for x in 0..w {
                let v = row[x] as f64;
                row_sum += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row_sum;
                sq_sum[idx] = sq_sum[idx - stride] + row_sq;
            }
        }

        Ok(Self {
            width: stride,
            sum,
            sq_sum,
        })
    }

    #[inline]
    fn rect_sum(table: &[f64], stride: usize, x0: u32, y0: u32, x1: u32, y1: u32) -> f64 {
        let (x0, y0, x1, y1) = (x0 as usize, y0 as usize, x1 as usize, y1 as usize);
        table[y1 * stride + x1] - table[y0 * stride + x1] - table[y1 * stride + x0]
            + table[y0 * stride + x0]
    }

    /// Mean and standard deviation over `[x0, x1) x [y0, y1)`.
    ///
    /// The rectangle must be non-empty and inside the image.
    #[inline]
    pub fn stats(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> (f64, f64) {
        let area = ((x1 - x0) as f64) * ((y1 - y0) as f64);
        let s = Self::rect_sum(&self.sum, self.width, x0, y0, x1, y1);
        let sq = Self::rect_sum(&self.sq_sum, self.width, x0, y0, x1, y1);
        let mean = s / area;
        let variance = sq / area - mean * mean;
        (mean, variance.abs().sqrt())
    }
}

/// Per-pixel local mean and standard deviation
#[derive(Debug, Clone)]
pub struct LocalStats {
    /// Image width
    pub width: u32,
    /// Image height
    pub height: u32,
    /// Local mean, row-major
    pub mean: Vec<f64>,
    /// Local standard deviation, row-major
    pub stddev: Vec<f64>,
}

impl LocalStats {
    /// Largest standard deviation over the image (0 for an empty image)
    pub fn max_stddev(&self) -> f64 {
        self.stddev.iter().copied().fold(0.0, f64::max)
    }
}

/// Compute local statistics with integral images
///
/// # Arguments
///
/// * `image` - 8-bit gray input
/// * `window` - Normalized window size
///
/// # Errors
///
/// Returns an error if the image is not 8-bit gray.
pub fn local_stats(image: &RasterBuffer, window: WindowSize) -> ThresholdResult<LocalStats> {
    let integral = IntegralImage::new(image)?;
    let (w, h) = image.size();
    let n = w as usize * h as usize;
    let mut mean = Vec::with_capacity(n);
    let mut stddev = Vec::with_capacity(n);

    for y in 0..h {
        let (y0, y1) = WindowSize::span(window.height, y, h);
        for x in 0..w {
            let (x0, x1) = WindowSize::span(window.width, x, w);
            let (m, s) = integral.stats(x0, y0, x1, y1);
            mean.push(m);
            stddev.push(s);
        }
    }

    Ok(LocalStats {
        width: w,
        height: h,
        mean,
        stddev,
    })
}

/// Compute local statistics by direct summation over each window
///
/// Reference implementation for verifying [`local_stats`]; O(window area)
/// per pixel.
///
/// # Errors
///
/// Returns an error if the image is not 8-bit gray.
pub fn local_stats_naive(image: &RasterBuffer, window: WindowSize) -> ThresholdResult<LocalStats> {
    require_gray(image)?;
    let (w, h) = image.size();
    let n = w as usize * h as usize;
    let mut mean = Vec::with_capacity(n);
    let mut stddev = Vec::with_capacity(n);

    for y in 0..h {
        let (y0, y1) = WindowSize::span(window.height, y, h);
        for x in 0..w {
            let (x0, x1) = WindowSize::span(window.width, x, w);
            let mut sum = 0.0;
            let mut count = 0.0;
            for yy in y0..y1 {
                let row = image.row(yy);
                for &v in &row[x0 as usize..x1 as usize] {
                    sum += v as f64;
                    count += 1.0;
                }
            }
            let m = sum / count;
            let mut var = 0.0;
            for yy in y0..y1 {
                let row = image.row(yy);
                for &v in &row[x0 as usize..x1 as usize] {
                    let d = v as f64 - m;
                    var += d * d;
                }
            }
            mean.push(m);
            stddev.push((var / count).sqrt());
        }
    }

    Ok(LocalStats {
        width: w,
        height: h,
        mean,
        stddev,
    })
}
