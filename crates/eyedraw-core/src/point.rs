//! Points and vector math in the diagram convention.
//!
//! All angles in this crate are measured clockwise from north (the negative
//! y-axis of the canvas plane), in radians. Canvas y grows downwards, so a
//! point at `(100, 0)` lies at `π/2` (3 o'clock) and `(0, 100)` at `π`.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::ops::{Add, Mul, Neg, Sub};

/// A 2-D point or vector in the canvas plane or in a doodle's local space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Unit vector pointing north (12 o'clock).
const NORTH: Point = Point { x: 0.0, y: -1.0 };

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create a point from a radius and a clockwise angle from north.
    pub fn from_polars(r: f64, phi: f64) -> Self {
        Self::new(r * phi.sin(), -r * phi.cos())
    }

    /// Reposition this point using polar coordinates.
    pub fn set_with_polars(&mut self, r: f64, phi: f64) {
        *self = Self::from_polars(r, phi);
    }

    /// Euclidean distance between two points.
    pub fn distance_to(&self, other: Point) -> f64 {
        (other - *self).length()
    }

    /// Scalar product of the two vectors.
    pub fn dot_product(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3-D cross product.
    pub fn cross_product(&self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Distance from the origin.
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Clockwise angle from north to this vector, in `[0, 2π)`.
    ///
    /// The zero vector has no direction; it reports `0.0` so that downstream
    /// geometry never sees a NaN.
    pub fn direction(&self) -> f64 {
        if self.length() < f64::EPSILON {
            return 0.0;
        }
        let cos = self.dot_product(NORTH);
        let sin = -self.cross_product(NORTH);
        normalize_angle(sin.atan2(cos))
    }

    /// Clockwise angle swept going from this vector to `other`, in `[0, 2π)`.
    pub fn clockwise_angle_to(&self, other: Point) -> f64 {
        normalize_angle(other.direction() - self.direction())
    }

    /// The point at radius `r` whose direction is this point's direction
    /// advanced clockwise by `phi`.
    pub fn point_at_radius_and_clockwise_angle(&self, r: f64, phi: f64) -> Point {
        Point::from_polars(r, self.direction() + phi)
    }

    /// A point on the tangent through this point (tangent to the circle
    /// about the origin), seen from the origin at `phi` clockwise from this
    /// point's radius.
    ///
    /// Used to place Bézier control points around a ring of handles. `phi`
    /// must lie strictly inside `(-π/2, π/2)`.
    pub fn tangential_control_point(&self, phi: f64) -> Point {
        let h = self.length() / phi.cos();
        Point::from_polars(h, self.direction() + phi)
    }

    /// Linear interpolation towards `to`; `percentage` runs from 0 to 100.
    pub fn point_at_percentage_from_point_to_point(&self, percentage: f64, to: Point) -> Point {
        let t = percentage / 100.0;
        Point::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }

    /// Clock hour (1-12) at which this point lies, seen from the origin.
    pub fn clock_hour(&self) -> u8 {
        clock_hour(self.direction())
    }

    /// Round both coordinates to whole canvas units.
    pub fn rounded(&self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }
}

/// Wrap an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can return exactly TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Map a clockwise-from-north angle to the nearest clock hour; 0 maps to 12.
pub fn clock_hour(angle: f64) -> u8 {
    let hour = (normalize_angle(angle) * 6.0 / PI).round() as u8 % 12;
    if hour == 0 { 12 } else { hour }
}

/// Inverse of [`clock_hour`]: the angle of a clock hour, in `[0, 2π)`.
pub fn clock_hour_angle(hour: u8) -> f64 {
    normalize_angle(f64::from(hour % 12) * PI / 6.0)
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Point::new(p.x, p.y)
    }
}

impl From<Point> for kurbo::Point {
    fn from(p: Point) -> Self {
        kurbo::Point::new(p.x, p.y)
    }
}

impl From<kurbo::Vec2> for Point {
    fn from(v: kurbo::Vec2) -> Self {
        Point::new(v.x, v.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_direction_cardinal_points() {
        assert!(Point::new(0.0, -10.0).direction().abs() < EPS);
        assert!((Point::new(10.0, 0.0).direction() - FRAC_PI_2).abs() < EPS);
        assert!((Point::new(0.0, 10.0).direction() - PI).abs() < EPS);
        assert!((Point::new(-10.0, 0.0).direction() - 3.0 * FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn test_direction_zero_vector_is_finite() {
        let d = Point::ZERO.direction();
        assert!(d.is_finite());
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_polars_roundtrip() {
        let p = Point::from_polars(50.0, 1.2);
        assert!((p.length() - 50.0).abs() < EPS);
        assert!((p.direction() - 1.2).abs() < EPS);

        let mut q = Point::ZERO;
        q.set_with_polars(10.0, PI);
        assert!(q.x.abs() < EPS);
        assert!((q.y - 10.0).abs() < EPS);
    }

    #[test]
    fn test_clockwise_angle_to_wraps() {
        let north = Point::new(0.0, -1.0);
        let west = Point::new(-1.0, 0.0);
        assert!((north.clockwise_angle_to(west) - 3.0 * FRAC_PI_2).abs() < EPS);
        assert!((west.clockwise_angle_to(north) - FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn test_dot_and_cross() {
        let a = Point::new(3.0, 4.0);
        let b = Point::new(-4.0, 3.0);
        assert!(a.dot_product(b).abs() < EPS);
        assert!((a.cross_product(b) - 25.0).abs() < EPS);
        assert!((a.length() - 5.0).abs() < EPS);
        assert!((a.distance_to(Point::ZERO) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_point_at_radius_and_clockwise_angle() {
        let east = Point::new(10.0, 0.0);
        let south = east.point_at_radius_and_clockwise_angle(20.0, FRAC_PI_2);
        assert!(south.x.abs() < EPS);
        assert!((south.y - 20.0).abs() < EPS);
    }

    #[test]
    fn test_tangential_control_point_lies_on_tangent() {
        let p = Point::new(0.0, -100.0);
        let c = p.tangential_control_point(0.3);
        // Tangent at north is horizontal, so y is unchanged.
        assert!((c.y + 100.0).abs() < 1e-6);
        assert!(c.x > 0.0);
        assert!((c.direction() - 0.3).abs() < EPS);
    }

    #[test]
    fn test_point_at_percentage() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, -50.0);
        let mid = a.point_at_percentage_from_point_to_point(50.0, b);
        assert_eq!(mid, Point::new(50.0, -25.0));
        assert_eq!(a.point_at_percentage_from_point_to_point(100.0, b), b);
    }

    #[test]
    fn test_clock_hour_mapping() {
        assert_eq!(clock_hour(0.0), 12);
        assert_eq!(clock_hour(FRAC_PI_2), 3);
        assert_eq!(clock_hour(PI), 6);
        assert_eq!(clock_hour(3.0 * FRAC_PI_2), 9);
        assert_eq!(clock_hour(TAU - 0.01), 12);
        assert_eq!(Point::new(100.0, 0.0).clock_hour(), 3);
    }

    #[test]
    fn test_clock_hour_angle_inverse() {
        for hour in 1..=12u8 {
            assert_eq!(clock_hour(clock_hour_angle(hour)), hour);
        }
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(TAU + 0.1) - 0.1).abs() < EPS);
        assert!((normalize_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < EPS);
        assert!(normalize_angle(-1e-18) < TAU);
    }
}
