//! Zones
//!
//! A zone is a user- or system-authored polygon or ellipse in page pixel
//! coordinates, tagged with what it does to the output:
//!
//! | Tag                  | Effect                                               |
//! |----------------------|------------------------------------------------------|
//! | `Fill`               | Paint a constant colour into the final image         |
//! | `PictureAdd`         | Add the area to the auto-detected picture layer      |
//! | `PictureSubtract`    | Remove the area from the auto-detected picture layer |
//! | `PictureSubtractAll` | Remove the area from every layer mask                |
//!
//! Zones arrive as part of the page settings and are validated before
//! use; an invalid zone is skipped and reported, the others still apply.

use crate::error::StageWarning;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point with sub-pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Zone geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ZoneShape {
    /// Closed polygon; the last vertex connects back to the first
    Polygon { vertices: Vec<Point> },
    /// Ellipse rotated clockwise (y axis down) by `angle_degrees`
    Ellipse {
        center: Point,
        rx: f64,
        ry: f64,
        #[serde(default)]
        angle_degrees: f64,
    },
}

/// What a zone does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneTag {
    Fill,
    PictureAdd,
    PictureSubtract,
    PictureSubtractAll,
}

/// Why a zone was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneGeometryError {
    #[error("polygon has {0} vertices, at least 3 are required")]
    TooFewVertices(usize),

    #[error("non-finite coordinate")]
    NonFinite,

    #[error("polygon encloses no area")]
    ZeroArea,

    #[error("edges {first} and {second} cross each other")]
    SelfIntersecting { first: usize, second: usize },

    #[error("ellipse radii must be positive: rx = {rx}, ry = {ry}")]
    NonPositiveRadius { rx: f64, ry: f64 },
}

/// A tagged zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub shape: ZoneShape,
    pub tag: ZoneTag,
    /// Fill colour as a `0xRRGGBBAA` pixel; white when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<u32>,
}

impl Zone {
    /// Polygon zone
    pub fn polygon(vertices: Vec<Point>, tag: ZoneTag) -> Self {
        Self {
            shape: ZoneShape::Polygon { vertices },
            tag,
            fill_color: None,
        }
    }

    /// Axis-aligned rectangle as a four-vertex polygon zone
    pub fn rect(x: f64, y: f64, w: f64, h: f64, tag: ZoneTag) -> Self {
        Self::polygon(
            vec![
                Point::new(x, y),
                Point::new(x + w, y),
                Point::new(x + w, y + h),
                Point::new(x, y + h),
            ],
            tag,
        )
    }

    /// Ellipse zone
    pub fn ellipse(center: Point, rx: f64, ry: f64, angle_degrees: f64, tag: ZoneTag) -> Self {
        Self {
            shape: ZoneShape::Ellipse {
                center,
                rx,
                ry,
                angle_degrees,
            },
            tag,
            fill_color: None,
        }
    }

    /// Set the fill colour (`0xRRGGBBAA`)
    pub fn with_fill_color(mut self, color: u32) -> Self {
        self.fill_color = Some(color);
        self
    }

    /// Check that the geometry can be rasterized deterministically
    ///
    /// # Errors
    ///
    /// * polygons with fewer than 3 vertices, non-finite coordinates, zero
    ///   area, or two non-adjacent edges that properly cross
    /// * ellipses with non-finite parameters or non-positive radii
    pub fn validate(&self) -> Result<(), ZoneGeometryError> {
        match &self.shape {
            ZoneShape::Polygon { vertices } => validate_polygon(vertices),
            ZoneShape::Ellipse {
                center,
                rx,
                ry,
                angle_degrees,
            } => {
                if !center.is_finite() || !rx.is_finite() || !ry.is_finite() || !angle_degrees.is_finite() {
                    return Err(ZoneGeometryError::NonFinite);
                }
                if *rx <= 0.0 || *ry <= 0.0 {
                    return Err(ZoneGeometryError::NonPositiveRadius { rx: *rx, ry: *ry });
                }
                Ok(())
            }
        }
    }

    /// Map the zone into an image rescaled by `(sx, sy)`
    ///
    /// Ellipse radii are scaled along their own axes, which is exact for
    /// unrotated ellipses and uniform scales.
    pub fn scaled(&self, sx: f64, sy: f64) -> Zone {
        let shape = match &self.shape {
            ZoneShape::Polygon { vertices } => ZoneShape::Polygon {
                vertices: vertices.iter().map(|p| Point::new(p.x * sx, p.y * sy)).collect(),
            },
            ZoneShape::Ellipse {
                center,
                rx,
                ry,
                angle_degrees,
            } => ZoneShape::Ellipse {
                center: Point::new(center.x * sx, center.y * sy),
                rx: rx * sx,
                ry: ry * sy,
                angle_degrees: *angle_degrees,
            },
        };
        Zone {
            shape,
            tag: self.tag,
            fill_color: self.fill_color,
        }
    }
}

fn validate_polygon(vertices: &[Point]) -> Result<(), ZoneGeometryError> {
    let n = vertices.len();
    if n < 3 {
        return Err(ZoneGeometryError::TooFewVertices(n));
    }
    if vertices.iter().any(|p| !p.is_finite()) {
        return Err(ZoneGeometryError::NonFinite);
    }
    if signed_area(vertices).abs() < f64::EPSILON {
        return Err(ZoneGeometryError::ZeroArea);
    }

    for i in 0..n {
        let (a, b) = (vertices[i], vertices[(i + 1) % n]);
        // j > i + 1 skips the next edge; the pair (0, n-1) shares a vertex
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (c, d) = (vertices[j], vertices[(j + 1) % n]);
            if segments_cross(a, b, c, d) {
                return Err(ZoneGeometryError::SelfIntersecting { first: i, second: j });
            }
        }
    }
    Ok(())
}

/// Shoelace area, positive for clockwise polygons in y-down coordinates
fn signed_area(vertices: &[Point]) -> f64 {
    let n = vertices.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let p = vertices[i];
            let q = vertices[(i + 1) % n];
            p.x * q.y - q.x * p.y
        })
        .sum();
    twice / 2.0
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Proper crossing: the segments intersect in a single interior point
fn segments_cross(a: Point, b: Point, c: Point, d: Point) -> bool {
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);
    o1 * o2 < 0.0 && o3 * o4 < 0.0
}

/// Split zones into the usable ones and warnings for the rejected ones
///
/// Order is preserved; warnings carry the index in the input list.
pub fn validate_zones(zones: &[Zone]) -> (Vec<Zone>, Vec<StageWarning>) {
    let mut valid = Vec::with_capacity(zones.len());
    let mut warnings = Vec::new();
    for (index, zone) in zones.iter().enumerate() {
        match zone.validate() {
            Ok(()) => valid.push(zone.clone()),
            Err(reason) => warnings.push(StageWarning::InvalidZoneGeometry { index, reason }),
        }
    }
    (valid, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_is_valid() {
        assert!(Zone::rect(1.0, 1.0, 5.0, 3.0, ZoneTag::PictureAdd).validate().is_ok());
    }

    #[test]
    fn test_too_few_vertices() {
        let z = Zone::polygon(vec![Point::new(0.0, 0.0), Point::new(4.0, 4.0)], ZoneTag::Fill);
        assert_eq!(z.validate(), Err(ZoneGeometryError::TooFewVertices(2)));
    }

    #[test]
    fn test_collinear_has_zero_area() {
        let z = Zone::polygon(
            vec![Point::new(0.0, 0.0), Point::new(2.0, 2.0), Point::new(4.0, 4.0)],
            ZoneTag::Fill,
        );
        assert_eq!(z.validate(), Err(ZoneGeometryError::ZeroArea));
    }

    #[test]
    fn test_bowtie_is_self_intersecting() {
        let z = Zone::polygon(
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(10.0, 0.0),
                Point::new(0.0, 6.0),
            ],
            ZoneTag::PictureAdd,
        );
        assert!(matches!(z.validate(), Err(ZoneGeometryError::SelfIntersecting { .. })));
    }

    #[test]
    fn test_ellipse_radius() {
        let z = Zone::ellipse(Point::new(5.0, 5.0), 0.0, 2.0, 0.0, ZoneTag::Fill);
        assert!(matches!(z.validate(), Err(ZoneGeometryError::NonPositiveRadius { .. })));
        let z = Zone::ellipse(Point::new(f64::NAN, 5.0), 1.0, 2.0, 0.0, ZoneTag::Fill);
        assert_eq!(z.validate(), Err(ZoneGeometryError::NonFinite));
    }

    #[test]
    fn test_validate_zones_keeps_order() {
        let zones = vec![
            Zone::rect(0.0, 0.0, 2.0, 2.0, ZoneTag::PictureAdd),
            Zone::polygon(vec![], ZoneTag::Fill),
            Zone::rect(4.0, 4.0, 2.0, 2.0, ZoneTag::PictureSubtract),
        ];
        let (valid, warnings) = validate_zones(&zones);
        assert_eq!(valid.len(), 2);
        assert_eq!(valid[1].tag, ZoneTag::PictureSubtract);
        assert_eq!(
            warnings,
            vec![StageWarning::InvalidZoneGeometry {
                index: 1,
                reason: ZoneGeometryError::TooFewVertices(0),
            }]
        );
    }

    #[test]
    fn test_scaled() {
        let z = Zone::rect(10.0, 20.0, 4.0, 4.0, ZoneTag::Fill).scaled(2.0, 0.5);
        match z.shape {
            ZoneShape::Polygon { vertices } => {
                assert_eq!(vertices[0], Point::new(20.0, 10.0));
                assert_eq!(vertices[2], Point::new(28.0, 12.0));
            }
            ZoneShape::Ellipse { .. } => panic!("expected polygon"),
        }
    }
}
