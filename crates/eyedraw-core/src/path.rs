//! Boundary paths shared by rendering and hit-testing.
//!
//! A doodle class describes its outline once, in local coordinates. The same
//! description is transformed onto the canvas for drawing and queried for
//! point containment, so the clickable region always matches what is drawn.

use crate::point::Point;
use crate::transform::AffineTransform;
use kurbo::{Arc, BezPath, Rect, Shape as KurboShape, Vec2};
use peniko::Color;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Tolerance used when flattening arcs into curve segments.
const ARC_TOLERANCE: f64 = 0.1;

/// A doodle outline in canvas coordinates, ready for a renderer or a
/// containment query.
#[derive(Debug, Clone)]
pub struct BoundaryPath {
    pub path: BezPath,
    pub stroke: Color,
    pub fill: Option<Color>,
}

impl BoundaryPath {
    pub fn new(path: BezPath) -> Self {
        Self {
            path,
            stroke: Color::from_rgba8(0, 0, 0, 255),
            fill: None,
        }
    }

    pub fn with_colors(mut self, stroke: Color, fill: Option<Color>) -> Self {
        self.stroke = stroke;
        self.fill = fill;
        self
    }

    /// Build from a local-space outline and the doodle's transform.
    pub fn from_local(mut local: BezPath, transform: &AffineTransform) -> Self {
        transform.transform_path(&mut local);
        Self::new(local)
    }

    /// Non-zero winding containment test.
    pub fn contains(&self, point: Point) -> bool {
        self.path.contains(point.into())
    }

    pub fn bounds(&self) -> Rect {
        self.path.bounding_box()
    }

    pub fn is_empty(&self) -> bool {
        self.path.elements().is_empty()
    }

    pub fn to_svg(&self) -> String {
        self.path.to_svg()
    }
}

/// Kurbo measures angles from +x towards +y; ours run clockwise from north.
fn kurbo_angle(angle_from_north: f64) -> f64 {
    angle_from_north - FRAC_PI_2
}

/// Circular arc about the local origin.
fn origin_arc(radius: f64, start_from_north: f64, sweep: f64) -> Arc {
    Arc {
        center: kurbo::Point::ZERO,
        radii: Vec2::new(radius, radius),
        start_angle: kurbo_angle(start_from_north),
        sweep_angle: sweep,
        x_rotation: 0.0,
    }
}

/// A full circle about the local origin.
///
/// `clockwise` selects the winding direction; nest circles of opposite
/// direction to cut a hole under the non-zero rule.
pub fn circle(radius: f64, clockwise: bool) -> BezPath {
    let sweep = if clockwise { TAU } else { -TAU };
    let arc = origin_arc(radius, 0.0, sweep);
    let mut path = BezPath::new();
    path.move_to(Point::from_polars(radius, 0.0));
    path.extend(arc.append_iter(ARC_TOLERANCE));
    path.close_path();
    path
}

/// Append a circle to an existing path as a new subpath.
pub fn append_circle(path: &mut BezPath, radius: f64, clockwise: bool) {
    path.extend(circle(radius, clockwise).elements().iter().copied());
}

/// An annular sector centred on north, spanning `arc` radians.
pub fn annular_sector(inner: f64, outer: f64, arc: f64) -> BezPath {
    let half = arc / 2.0;
    let mut path = BezPath::new();
    path.move_to(Point::from_polars(outer, -half));
    let outer_arc = origin_arc(outer, -half, arc);
    path.extend(outer_arc.append_iter(ARC_TOLERANCE));
    path.line_to(Point::from_polars(inner, half));
    let inner_arc = origin_arc(inner, half, -arc);
    path.extend(inner_arc.append_iter(ARC_TOLERANCE));
    path.close_path();
    path
}

/// Axis-aligned ellipse about the local origin.
pub fn ellipse(width: f64, height: f64) -> BezPath {
    kurbo::Ellipse::new((0.0, 0.0), (width / 2.0, height / 2.0), 0.0).to_path(ARC_TOLERANCE)
}

/// Closed polygon through `points`.
pub fn polygon(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(*first);
    for p in rest {
        path.line_to(*p);
    }
    path.close_path();
    path
}

/// Open polyline through `points`.
pub fn polyline(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(*first);
    for p in rest {
        path.line_to(*p);
    }
    path
}

/// Smooth closed curve through a ring of points around the local origin.
///
/// Each segment gets control points on the tangents at its ends, offset by
/// the angle that makes a cubic follow a circular arc. Points evenly spaced
/// on a circle therefore produce (very nearly) that circle, and any number
/// of points yields a closed curve.
pub fn smooth_ring(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if points.len() < 3 {
        return polygon(points);
    }
    path.move_to(points[0]);
    for (i, start) in points.iter().enumerate() {
        let end = points[(i + 1) % points.len()];
        let span = start.clockwise_angle_to(end);
        // Clockwise spans beyond π mean the ring runs anticlockwise.
        let span = if span > std::f64::consts::PI { span - TAU } else { span };
        let phi = (4.0 / 3.0 * (span / 4.0).tan()).atan();
        let c1 = start.tangential_control_point(phi);
        let c2 = end.tangential_control_point(-phi);
        path.curve_to(c1, c2, end);
    }
    path.close_path();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_circle_contains() {
        let path = BoundaryPath::new(circle(100.0, true));
        assert!(path.contains(Point::new(0.0, 0.0)));
        assert!(path.contains(Point::new(99.0, 0.0)));
        assert!(!path.contains(Point::new(101.0, 0.0)));
    }

    #[test]
    fn test_opposite_circles_cut_a_hole() {
        let mut ring = circle(380.0, true);
        append_circle(&mut ring, 100.0, false);
        let path = BoundaryPath::new(ring);
        assert!(!path.contains(Point::new(0.0, 0.0)));
        assert!(path.contains(Point::new(0.0, -200.0)));
        assert!(!path.contains(Point::new(0.0, -400.0)));
    }

    #[test]
    fn test_annular_sector_centred_on_north() {
        let path = BoundaryPath::new(annular_sector(330.0, 380.0, PI / 3.0));
        assert!(path.contains(Point::new(0.0, -355.0)));
        assert!(!path.contains(Point::new(0.0, 355.0)));
        assert!(!path.contains(Point::new(0.0, -300.0)));
        assert!(path.contains(Point::from_polars(355.0, 0.4)));
        assert!(!path.contains(Point::from_polars(355.0, 0.6)));
    }

    #[test]
    fn test_smooth_ring_approximates_circle() {
        let points: Vec<Point> = (0..8).map(|i| Point::from_polars(100.0, i as f64 * TAU / 8.0)).collect();
        let ring = BoundaryPath::new(smooth_ring(&points));
        let bounds = ring.bounds();
        assert!((bounds.width() - 200.0).abs() < 0.5);
        assert!((bounds.height() - 200.0).abs() < 0.5);
        assert!(ring.contains(Point::from_polars(99.0, TAU / 16.0)));
        assert!(!ring.contains(Point::from_polars(101.0, TAU / 16.0)));
    }

    #[test]
    fn test_from_local_applies_transform() {
        let mut t = AffineTransform::new();
        t.translate(200.0, 100.0);
        t.scale(2.0, 2.0);
        let path = BoundaryPath::from_local(circle(10.0, true), &t);
        assert!(path.contains(Point::new(215.0, 100.0)));
        assert!(!path.contains(Point::new(10.0, 0.0)));
    }

    #[test]
    fn test_polygon_and_svg() {
        let square = [
            Point::new(-1.0, -1.0),
            Point::new(1.0, -1.0),
            Point::new(1.0, 1.0),
            Point::new(-1.0, 1.0),
        ];
        let path = BoundaryPath::new(polygon(&square));
        assert!(path.contains(Point::ZERO));
        assert!(path.to_svg().starts_with('M'));
        assert!(BoundaryPath::new(polygon(&[])).is_empty());
    }
}
