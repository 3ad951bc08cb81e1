//! Affine transform mapping a doodle's local space onto the canvas plane.

use crate::point::Point;
use kurbo::{Affine, BezPath};
use thiserror::Error;

/// Determinant magnitude below which a transform is treated as singular.
pub const DEGENERATE_EPSILON: f64 = 1e-12;

/// Transform errors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TransformError {
    #[error("Transform is not invertible (determinant {0})")]
    Degenerate(f64),
}

/// A 3x3 homogeneous affine matrix.
///
/// Each of [`translate`](Self::translate), [`scale`](Self::scale) and
/// [`rotate`](Self::rotate) right-multiplies the current matrix, so the last
/// operation applied is the first one a point goes through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    affine: Affine,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl AffineTransform {
    /// Create an identity transform.
    pub fn new() -> Self {
        Self {
            affine: Affine::IDENTITY,
        }
    }

    /// Reset to the identity transform.
    pub fn set_to_identity(&mut self) {
        self.affine = Affine::IDENTITY;
    }

    /// Copy another transform's matrix into this one.
    pub fn set_to_transform(&mut self, other: &AffineTransform) {
        self.affine = other.affine;
    }

    /// Append a translation, applied before the existing transform.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.affine = self.affine * Affine::translate((dx, dy));
    }

    /// Append a non-uniform scale about the local origin.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.affine = self.affine * Affine::scale_non_uniform(sx, sy);
    }

    /// Rotate clockwise (canvas y points down) by `radians`.
    pub fn rotate(&mut self, radians: f64) {
        self.affine = self.affine * Affine::rotate(radians);
    }

    /// Map a local point into the transform's target space.
    pub fn transform_point(&self, p: Point) -> Point {
        (self.affine * kurbo::Point::from(p)).into()
    }

    /// Apply the transform to a path in place.
    pub fn transform_path(&self, path: &mut BezPath) {
        path.apply_affine(self.affine);
    }

    /// Determinant of the linear part; zero means the transform collapses
    /// the plane and cannot be inverted.
    pub fn determinant(&self) -> f64 {
        self.affine.determinant()
    }

    /// Whether [`create_inverse`](Self::create_inverse) would succeed.
    pub fn is_invertible(&self) -> bool {
        self.determinant().abs() >= DEGENERATE_EPSILON
    }

    /// Compute the inverse transform.
    ///
    /// Fails with [`TransformError::Degenerate`] rather than dividing by a
    /// vanishing determinant.
    pub fn create_inverse(&self) -> Result<AffineTransform, TransformError> {
        let det = self.determinant();
        if det.abs() < DEGENERATE_EPSILON {
            return Err(TransformError::Degenerate(det));
        }
        Ok(Self {
            affine: self.affine.inverse(),
        })
    }
}

impl From<Affine> for AffineTransform {
    fn from(affine: Affine) -> Self {
        Self { affine }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn composed(dx: f64, dy: f64, sx: f64, sy: f64, theta: f64) -> AffineTransform {
        let mut t = AffineTransform::new();
        t.translate(dx, dy);
        t.scale(sx, sy);
        t.rotate(theta);
        t
    }

    #[test]
    fn test_identity_leaves_points_alone() {
        let t = AffineTransform::new();
        let p = Point::new(12.0, -7.0);
        assert_eq!(t.transform_point(p), p);
        assert!((t.determinant() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_composition_order() {
        // Rotation applies first, then scale, then translation.
        let t = composed(100.0, 50.0, 2.0, 2.0, FRAC_PI_2);
        let p = t.transform_point(Point::new(0.0, -10.0));
        assert!((p.x - 120.0).abs() < 1e-9);
        assert!((p.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverse_roundtrip() {
        let cases = [
            (0.0, 0.0, 1.0, 1.0, 0.0),
            (250.0, -120.0, 0.5, 3.0, 1.1),
            (-400.0, 400.0, 4.0, 4.0, 5.9),
            (13.0, 17.0, 0.01, 0.02, 2.5),
        ];
        let points = [
            Point::new(0.0, 0.0),
            Point::new(300.0, -200.0),
            Point::new(-499.0, 499.0),
        ];
        for (dx, dy, sx, sy, theta) in cases {
            let t = composed(dx, dy, sx, sy, theta);
            let inverse = t.create_inverse().unwrap();
            for p in points {
                let back = inverse.transform_point(t.transform_point(p)).rounded();
                assert!((back.x - p.x).abs() <= 1.0, "x drifted for {:?}", (dx, dy, sx, sy, theta));
                assert!((back.y - p.y).abs() <= 1.0, "y drifted for {:?}", (dx, dy, sx, sy, theta));
            }
        }
    }

    #[test]
    fn test_zero_scale_is_degenerate() {
        let t = composed(10.0, 10.0, 0.0, 1.0, 0.3);
        assert!(!t.is_invertible());
        assert!(matches!(t.create_inverse(), Err(TransformError::Degenerate(_))));
    }

    #[test]
    fn test_set_to_transform_and_identity() {
        let source = composed(5.0, 6.0, 2.0, 2.0, 0.0);
        let mut t = AffineTransform::new();
        t.set_to_transform(&source);
        assert_eq!(t, source);
        t.set_to_identity();
        assert_eq!(t, AffineTransform::new());
    }
}
