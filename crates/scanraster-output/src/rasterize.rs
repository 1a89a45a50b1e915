//! Zone rasterization
//!
//! Pixels are sampled at their centres `(x + 0.5, y + 0.5)`.
//!
//! - Polygons use the nonzero winding rule: a scanline through the pixel
//!   centres crosses each edge with a direction of +1 (downward) or -1
//!   (upward), and pixels between crossings whose running sum is non-zero
//!   are inside.
//! - Ellipses use the rotated-ellipse inequality
//!   `(u / rx)² + (v / ry)² <= 1` in the ellipse's own frame.

use crate::error::OutputResult;
use crate::zone::{Point, Zone, ZoneShape};
use scanraster_core::Mask;

/// Rasterize a zone into a new mask of the given size
///
/// # Errors
///
/// Returns an error if the size is invalid.
pub fn rasterize(zone: &Zone, width: u32, height: u32) -> OutputResult<Mask> {
    let mut mask = Mask::new(width, height)?;
    rasterize_into(zone, &mut mask, true);
    Ok(mask)
}

/// Set every pixel of `mask` covered by `zone` to `value`
///
/// Parts of the zone outside the mask are clipped.
pub fn rasterize_into(zone: &Zone, mask: &mut Mask, value: bool) {
    match &zone.shape {
        ZoneShape::Polygon { vertices } => fill_polygon(vertices, mask, value),
        ZoneShape::Ellipse {
            center,
            rx,
            ry,
            angle_degrees,
        } => fill_ellipse(*center, *rx, *ry, *angle_degrees, mask, value),
    }
}

/// Scanline edge crossing
struct Crossing {
    x: f64,
    winding: i32,
}

fn fill_polygon(vertices: &[Point], mask: &mut Mask, value: bool) {
    let n = vertices.len();
    if n < 3 {
        return;
    }
    let (w, h) = mask.size();

    let min_y = vertices.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = vertices.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    if !min_y.is_finite() || !max_y.is_finite() {
        return;
    }
    let y_start = (min_y - 0.5).ceil().max(0.0) as u32;
    let y_end = ((max_y - 0.5).ceil().max(0.0) as u32).min(h);

    let mut crossings: Vec<Crossing> = Vec::with_capacity(n);
    for y in y_start..y_end {
        let sy = y as f64 + 0.5;
        crossings.clear();
        for i in 0..n {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            // half-open in y so shared vertices count once
            let winding = if a.y <= sy && sy < b.y {
                1
            } else if b.y <= sy && sy < a.y {
                -1
            } else {
                continue;
            };
            let t = (sy - a.y) / (b.y - a.y);
            crossings.push(Crossing {
                x: a.x + t * (b.x - a.x),
                winding,
            });
        }
        crossings.sort_by(|c1, c2| c1.x.total_cmp(&c2.x));

        let mut sum = 0;
        for pair in crossings.windows(2) {
            sum += pair[0].winding;
            if sum == 0 {
                continue;
            }
            // pixel centres in [left, right)
            let x0 = (pair[0].x - 0.5).ceil().max(0.0);
            let x1 = ((pair[1].x - 0.5).ceil().max(0.0)).min(w as f64);
            for x in x0 as u32..x1 as u32 {
                mask.set(x, y, value);
            }
        }
    }
}

fn fill_ellipse(center: Point, rx: f64, ry: f64, angle_degrees: f64, mask: &mut Mask, value: bool) {
    if !(rx > 0.0 && ry > 0.0) {
        return;
    }
    let (w, h) = mask.size();
    let (sin, cos) = angle_degrees.to_radians().sin_cos();

    // half extents of the rotated bounding box
    let ex = ((rx * cos).powi(2) + (ry * sin).powi(2)).sqrt();
    let ey = ((rx * sin).powi(2) + (ry * cos).powi(2)).sqrt();
    let x0 = (center.x - ex - 0.5).floor().max(0.0) as u32;
    let y0 = (center.y - ey - 0.5).floor().max(0.0) as u32;
    let x1 = ((center.x + ex + 0.5).ceil().max(0.0) as u32).min(w);
    let y1 = ((center.y + ey + 0.5).ceil().max(0.0) as u32).min(h);

    for y in y0..y1 {
        let dy = y as f64 + 0.5 - center.y;
        for x in x0..x1 {
            let dx = x as f64 + 0.5 - center.x;
            let u = dx * cos + dy * sin;
            let v = -dx * sin + dy * cos;
            if (u / rx).powi(2) + (v / ry).powi(2) <= 1.0 {
                mask.set(x, y, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::ZoneTag;

    #[test]
    fn test_integer_rect_covers_exact_pixels() {
        let zone = Zone::rect(2.0, 3.0, 4.0, 2.0, ZoneTag::PictureAdd);
        let m = rasterize(&zone, 10, 10).unwrap();
        assert_eq!(m.count(), 8);
        assert!(m.get(2, 3));
        assert!(m.get(5, 4));
        assert!(!m.get(6, 4));
        assert!(!m.get(2, 5));
    }

    #[test]
    fn test_winding_direction_does_not_matter() {
        let cw = Zone::rect(1.0, 1.0, 3.0, 3.0, ZoneTag::Fill);
        let ccw = Zone::polygon(
            vec![
                Point::new(1.0, 1.0),
                Point::new(1.0, 4.0),
                Point::new(4.0, 4.0),
                Point::new(4.0, 1.0),
            ],
            ZoneTag::Fill,
        );
        let a = rasterize(&cw, 6, 6).unwrap();
        let b = rasterize(&ccw, 6, 6).unwrap();
        assert_eq!(a.bits(), b.bits());
        assert_eq!(a.count(), 9);
    }

    #[test]
    fn test_nonzero_fills_doubly_wound_area() {
        // the same square traced twice has winding 2 inside and stays filled
        let mut vertices = Vec::new();
        for _ in 0..2 {
            vertices.extend([
                Point::new(0.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(4.0, 4.0),
                Point::new(0.0, 4.0),
            ]);
        }
        let zone = Zone::polygon(vertices, ZoneTag::Fill);
        assert_eq!(rasterize(&zone, 4, 4).unwrap().count(), 16);
    }

    #[test]
    fn test_clipped_polygon() {
        let zone = Zone::rect(-5.0, -5.0, 8.0, 8.0, ZoneTag::Fill);
        let m = rasterize(&zone, 4, 4).unwrap();
        assert_eq!(m.count(), 9);
    }

    #[test]
    fn test_circle() {
        let zone = Zone::ellipse(Point::new(5.0, 5.0), 3.0, 3.0, 0.0, ZoneTag::Fill);
        let m = rasterize(&zone, 10, 10).unwrap();
        assert!(m.get(5, 5));
        assert!(m.get(2, 4));
        assert!(!m.get(1, 5));
        assert!(!m.get(2, 2));
        // symmetric about the centre
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(m.get(x, y), m.get(9 - x, 9 - y));
            }
        }
    }

    #[test]
    fn test_rotated_ellipse() {
        let flat = Zone::ellipse(Point::new(10.0, 10.0), 8.0, 2.0, 0.0, ZoneTag::Fill);
        let upright = Zone::ellipse(Point::new(10.0, 10.0), 8.0, 2.0, 90.0, ZoneTag::Fill);
        let a = rasterize(&flat, 20, 20).unwrap();
        let b = rasterize(&upright, 20, 20).unwrap();
        assert!(a.get(16, 10) && !a.get(10, 16));
        assert!(b.get(10, 16) && !b.get(16, 10));
        assert_eq!(a.count(), b.count());
    }
}
