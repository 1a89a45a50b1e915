//! Synthetic page builders
//!
//! Tests build their inputs here instead of reading binary fixtures, so
//! every regression test is self-contained and deterministic.

use crate::error::{TestError, TestResult};
use scanraster_core::{Dpi, PixelFormat, RasterBuffer, Rect, color};

fn synth_err(name: &str, e: scanraster_core::Error) -> TestError {
    TestError::Synthetic {
        name: name.to_string(),
        message: e.to_string(),
    }
}

/// Uniform gray page
pub fn uniform_gray(width: u32, height: u32, level: u8) -> TestResult<RasterBuffer> {
    RasterBuffer::new_filled(width, height, PixelFormat::Gray8, level as u32)
        .map_err(|e| synth_err("uniform_gray", e))
}

/// Checkerboard with square cells of size `cell`
pub fn checkerboard(width: u32, height: u32, cell: u32, dark: u8, light: u8) -> TestResult<RasterBuffer> {
    let cell = cell.max(1);
    let bytes: Vec<u8> = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                if ((x / cell) + (y / cell)) % 2 == 0 {
                    dark
                } else {
                    light
                }
            })
        })
        .collect();
    RasterBuffer::from_gray_bytes(width, height, &bytes).map_err(|e| synth_err("checkerboard", e))
}

/// Horizontal gray ramp from 0 at the left edge to 255 at the right edge
pub fn horizontal_ramp(width: u32, height: u32) -> TestResult<RasterBuffer> {
    let denom = (width.max(2) - 1) as f64;
    let bytes: Vec<u8> = (0..height)
        .flat_map(|_| (0..width).map(move |x| ((x as f64 / denom) * 255.0).round() as u8))
        .collect();
    RasterBuffer::from_gray_bytes(width, height, &bytes).map_err(|e| synth_err("horizontal_ramp", e))
}

/// Deterministic pseudo-random gray noise (xorshift32)
pub fn noise_gray(width: u32, height: u32, seed: u32) -> TestResult<RasterBuffer> {
    let mut state = seed.max(1);
    let bytes: Vec<u8> = (0..width as usize * height as usize)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();
    RasterBuffer::from_gray_bytes(width, height, &bytes).map_err(|e| synth_err("noise_gray", e))
}

/// A light page with rows of dark glyph-like blocks
///
/// Glyphs are 6x8 pixel blocks at gray level `ink` on a background of
/// `paper`, laid out on a 10x14 pixel pitch with an 8 pixel margin.
pub fn text_page(width: u32, height: u32, ink: u8, paper: u8) -> TestResult<RasterBuffer> {
    let mut page = uniform_gray(width, height, paper)?.to_mut();
    for y in 0..height {
        for x in 0..width {
            if x < 8 || y < 8 || x + 8 >= width || y + 8 >= height {
                continue;
            }
            let gx = (x - 8) % 10;
            let gy = (y - 8) % 14;
            if gx < 6 && gy < 8 {
                page.set_pixel_unchecked(x, y, ink as u32);
            }
        }
    }
    Ok(page.into())
}

/// Convert a gray page to colour and paint a solid colour rectangle on it
pub fn with_color_rect(page: &RasterBuffer, rect: Rect, rgb: (u8, u8, u8)) -> TestResult<RasterBuffer> {
    let mut out = page.to_rgb().to_mut();
    let value = color::compose_rgb(rgb.0, rgb.1, rgb.2);
    for y in rect.y.max(0)..rect.bottom().min(page.height() as i32) {
        for x in rect.x.max(0)..rect.right().min(page.width() as i32) {
            out.set_pixel_unchecked(x as u32, y as u32, value);
        }
    }
    Ok(out.into())
}

/// 1-bit image with the listed pixels set to black
pub fn binary_from_points(width: u32, height: u32, points: &[(u32, u32)]) -> TestResult<RasterBuffer> {
    let mut img = RasterBuffer::new(width, height, PixelFormat::Bit1)
        .map_err(|e| synth_err("binary_from_points", e))?
        .to_mut();
    for &(x, y) in points {
        img.set_pixel(x, y, 1)
            .map_err(|e| synth_err("binary_from_points", e))?;
    }
    Ok(img.into())
}

/// 1-bit image with the listed rectangles filled black
pub fn binary_from_rects(width: u32, height: u32, rects: &[Rect]) -> TestResult<RasterBuffer> {
    let mut points = Vec::new();
    for r in rects {
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                points.push((x as u32, y as u32));
            }
        }
    }
    binary_from_points(width, height, &points)
}

/// Tag an image with a symmetric resolution
pub fn at_dpi(image: RasterBuffer, dpi: u32) -> RasterBuffer {
    image.with_dpi(Dpi::uniform(dpi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkerboard_cells() {
        let img = checkerboard(4, 4, 2, 0, 255).unwrap();
        assert_eq!(img.get_pixel(0, 0), Some(0));
        assert_eq!(img.get_pixel(2, 0), Some(255));
        assert_eq!(img.get_pixel(2, 2), Some(0));
    }

    #[test]
    fn test_noise_is_deterministic() {
        let a = noise_gray(16, 16, 7).unwrap();
        let b = noise_gray(16, 16, 7).unwrap();
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn test_text_page_has_ink() {
        let page = text_page(64, 64, 20, 230).unwrap();
        assert_eq!(page.get_pixel(0, 0), Some(230));
        assert_eq!(page.get_pixel(8, 8), Some(20));
    }

    #[test]
    fn test_binary_from_rects() {
        let img = binary_from_rects(10, 10, &[Rect::new_unchecked(1, 1, 2, 3)]).unwrap();
        assert_eq!(img.count_black().unwrap(), 6);
    }
}
