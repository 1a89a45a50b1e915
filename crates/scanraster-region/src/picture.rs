//! Picture detection
//!
//! Two steps turn a page into picture rectangles:
//!
//! - [`estimate_picture_mask`] marks pixels that belong to large dark or
//!   textured areas (photographs, halftones, drawings) as opposed to text.
//! - [`detect`] groups the mask into 8-connected components and reports a
//!   bounding rectangle per component, optionally contracted to ignore
//!   sparse outlier rows and columns.

use crate::error::{RegionError, RegionResult};
use crate::label::label_mask;
use scanraster_core::{ConnectivityType, Mask, PixelFormat, RasterBuffer, Rect};
use scanraster_morph::{erode_gray, fill_holes_gray, gradient_gray, grayscale_reconstruct};

/// Sensitivity at which rectangles are reported without contraction
pub const FULL_SENSITIVITY: u32 = 100;

/// Structuring element side at 300 DPI used to suppress text-sized detail
pub const PICTURE_ELEMENT_300DPI: u32 = 35;

/// Level at or above which the picture map marks a pixel as picture
pub const PICTURE_LEVEL: u32 = 48;

/// Fraction of darkest and brightest pixels saturated before detection
const STRETCH_FRACTION: f64 = 0.01;

/// Picture mask and the state of its reconstruction step
#[derive(Debug, Clone)]
pub struct PictureMask {
    /// True for picture pixels
    pub mask: Mask,
    /// Picture likelihood map (8-bit gray) before thresholding
    pub map: RasterBuffer,
    /// False if a reconstruction step stopped at its iteration cap
    pub converged: bool,
    /// Iterations of the opening-by-reconstruction step
    pub iterations: u32,
}

/// Estimate which pixels of a page belong to pictures
///
/// Pipeline on the gray page:
///
/// 1. Stretch the gray range (1% dark / 1% light saturation).
/// 2. Feature map `max(255 − v, gradient3x3)`: high on dark and on
///    textured pixels.
/// 3. Opening by reconstruction: erode with a square element of 35 pixels
///    at 300 DPI (scaled with the resolution), then reconstruct under the
///    feature map. Structures thinner than the element (text) vanish,
///    large areas keep their shape.
/// 4. Fill holes so that light details inside a picture stay inside it.
/// 5. Pixels `>= 48` are picture pixels.
///
/// # Errors
///
/// Returns an error if an intermediate morphology step fails.
pub fn estimate_picture_mask(image: &RasterBuffer) -> RegionResult<PictureMask> {
    let gray = image.to_gray();
    let stretched = gray.stretch_gray_range(STRETCH_FRACTION, STRETCH_FRACTION)?;
    let gradient = gradient_gray(&stretched, 3, 3)?;

    let mut feature = stretched.to_mut();
    for (f, &g) in feature.data_mut().iter_mut().zip(gradient.data()) {
        *f = (255 - *f).max(g);
    }
    let feature: RasterBuffer = feature.into();

    let element = element_size(image.dpi().min_axis());
    let marker = erode_gray(&feature, element, element)?;
    let opened = grayscale_reconstruct(&marker, &feature, ConnectivityType::EightWay)?;
    let filled = fill_holes_gray(&opened.image, ConnectivityType::EightWay)?;

    let (w, h) = filled.image.size();
    let bits = filled.image.data().iter().map(|&v| v >= PICTURE_LEVEL).collect();
    Ok(PictureMask {
        mask: Mask::from_bits(w, h, bits)?,
        map: filled.image,
        converged: opened.converged && filled.converged,
        iterations: opened.iterations,
    })
}

/// Odd element size for a resolution, at least 3
fn element_size(dpi: u32) -> u32 {
    let scaled = (PICTURE_ELEMENT_300DPI as f64 * dpi as f64 / 300.0).round() as u32;
    let odd = if scaled % 2 == 0 { scaled + 1 } else { scaled };
    odd.max(3)
}

/// Find picture rectangles in a picture mask
///
/// # Arguments
///
/// * `mask` - True for picture pixels
/// * `sensitivity` - `0..=100`; 100 reports exact component bounds
///
/// # Returns
///
/// One rectangle per 8-connected component, in raster order of each
/// component's first pixel.
///
/// # Contraction
///
/// Below 100, the edges of each bounding rectangle are moved inward in the
/// fixed order top, bottom, left, right, one line at a time, while the
/// share of non-mask pixels on the edge line (within the current
/// rectangle) exceeds `(100 − sensitivity)%`. Each edge is visited once;
/// earlier edges are not rechecked after later ones move. If an edge would
/// pass the opposite edge, it keeps its original position.
///
/// # Errors
///
/// Returns an error if `sensitivity > 100`.
pub fn detect(mask: &Mask, sensitivity: u32) -> RegionResult<Vec<Rect>> {
    if sensitivity > FULL_SENSITIVITY {
        return Err(RegionError::InvalidParameters(format!(
            "sensitivity must be in 0..=100, got {}",
            sensitivity
        )));
    }

    let labeling = label_mask(mask, ConnectivityType::EightWay);
    let rects = labeling.components().iter().map(|c| c.bounds);
    if sensitivity == FULL_SENSITIVITY {
        return Ok(rects.collect());
    }

    let limit = (FULL_SENSITIVITY - sensitivity) as f64 / 100.0;
    Ok(rects.map(|r| contract(mask, r, limit)).collect())
}

/// Share of unset mask pixels on row `y`, columns `[left, right]`
fn row_miss(mask: &Mask, y: i32, left: i32, right: i32) -> f64 {
    let misses = (left..=right).filter(|&x| !mask.get(x as u32, y as u32)).count();
    misses as f64 / (right - left + 1) as f64
}

/// Share of unset mask pixels on column `x`, rows `[top, bottom]`
fn column_miss(mask: &Mask, x: i32, top: i32, bottom: i32) -> f64 {
    let misses = (top..=bottom).filter(|&y| !mask.get(x as u32, y as u32)).count();
    misses as f64 / (bottom - top + 1) as f64
}

/// Move one edge inward while `miss(position) > limit`.
///
/// `step` is +1 or -1; `stop` is the opposite edge (inclusive). Returns
/// the original position if the edge would cross `stop`.
fn shrink_edge(start: i32, stop: i32, step: i32, limit: f64, miss: impl Fn(i32) -> f64) -> i32 {
    let mut pos = start;
    while miss(pos) > limit {
        pos += step;
        if (step > 0 && pos > stop) || (step < 0 && pos < stop) {
            return start;
        }
    }
    pos
}

fn contract(mask: &Mask, rect: Rect, limit: f64) -> Rect {
    let mut left = rect.x;
    let mut top = rect.y;
    let mut right = rect.right() - 1;
    let mut bottom = rect.bottom() - 1;

    top = shrink_edge(top, bottom, 1, limit, |y| row_miss(mask, y, left, right));
    bottom = shrink_edge(bottom, top, -1, limit, |y| row_miss(mask, y, left, right));
    left = shrink_edge(left, right, 1, limit, |x| column_miss(mask, x, top, bottom));
    right = shrink_edge(right, left, -1, limit, |x| column_miss(mask, x, top, bottom));

    Rect::from_inclusive(left, top, right, bottom)
}

/// Rasterize rectangles into a mask of the given size
///
/// # Errors
///
/// Returns an error if the size is invalid.
pub fn rects_to_mask(rects: &[Rect], width: u32, height: u32) -> RegionResult<Mask> {
    let mut mask = Mask::new(width, height)?;
    for r in rects {
        mask.fill_rect(r, true);
    }
    Ok(mask)
}

/// Convenience: picture mask of a gray or colour page as a 1-bit raster
///
/// # Errors
///
/// See [`estimate_picture_mask`].
pub fn picture_mask_raster(image: &RasterBuffer) -> RegionResult<RasterBuffer> {
    let pm = estimate_picture_mask(image)?;
    let mut out = image.create_template(PixelFormat::Bit1)?;
    for (d, &b) in out.data_mut().iter_mut().zip(pm.mask.bits()) {
        *d = u32::from(b);
    }
    Ok(out.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> Mask {
        let h = rows.len() as u32;
        let w = rows[0].len() as u32;
        let bits = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| c == '#'))
            .collect();
        Mask::from_bits(w, h, bits).unwrap()
    }

    #[test]
    fn test_full_sensitivity_exact_bounds() {
        let m = mask_from(&["......", ".#....", "..##..", "....#.", "......"]);
        let rects = detect(&m, 100).unwrap();
        assert_eq!(rects, vec![Rect::from_inclusive(1, 1, 4, 3)]);
    }

    #[test]
    fn test_contraction_drops_sparse_edge() {
        // one stray pixel makes the top row mostly empty
        let m = mask_from(&[
            "..#...", //
            "######",
            "######",
            "######",
        ]);
        assert_eq!(detect(&m, 100).unwrap(), vec![Rect::new_unchecked(0, 0, 6, 4)]);
        // 5 of 6 top pixels are misses, above the 50% limit
        assert_eq!(detect(&m, 50).unwrap(), vec![Rect::new_unchecked(0, 1, 6, 3)]);
    }

    #[test]
    fn test_zero_sensitivity_never_contracts() {
        let m = mask_from(&["#....", ".#...", "..#..", "...#.", "....#"]);
        assert_eq!(detect(&m, 0).unwrap(), vec![Rect::new_unchecked(0, 0, 5, 5)]);
    }

    #[test]
    fn test_degenerate_contraction_keeps_edge() {
        // a diagonal has 80% misses on every line; contracting all rows
        // would cross the bottom edge, so the top stays where it was
        let m = mask_from(&["#....", ".#...", "..#..", "...#.", "....#"]);
        let rects = detect(&m, 90).unwrap();
        assert_eq!(rects, vec![Rect::new_unchecked(0, 0, 5, 5)]);
    }

    #[test]
    fn test_invalid_sensitivity() {
        let m = Mask::new(3, 3).unwrap();
        assert!(detect(&m, 101).is_err());
    }

    #[test]
    fn test_element_size() {
        assert_eq!(element_size(300), 35);
        assert_eq!(element_size(600), 71);
        assert_eq!(element_size(150), 19);
        assert_eq!(element_size(10), 3);
    }

    #[test]
    fn test_blank_page_has_no_pictures() {
        let img = RasterBuffer::new_filled(60, 60, PixelFormat::Gray8, 250).unwrap();
        let pm = estimate_picture_mask(&img).unwrap();
        assert!(pm.mask.is_empty());
        assert!(pm.converged);
    }
}
