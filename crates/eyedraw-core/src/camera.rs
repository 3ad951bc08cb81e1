//! View transform between screen pixels and the canvas plane.
//!
//! Pointer events arrive in screen coordinates and are mapped onto the
//! canvas plane before any doodle sees them, so panning and zooming never
//! reach stored doodle parameters.

use crate::point::Point;
use crate::transform::AffineTransform;
use serde::{Deserialize, Serialize};

/// Zoom level at which one canvas unit is one screen pixel.
pub const DEFAULT_ZOOM: f64 = 1.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// Pan and zoom of a drawing's view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "CameraRecord")]
pub struct Camera {
    /// Screen position of the canvas origin.
    pub pan: Point,
    /// Screen pixels per canvas unit, within `[MIN_ZOOM, MAX_ZOOM]`.
    zoom: f64,
}

/// Persisted camera, zoom not yet checked.
#[derive(Deserialize)]
struct CameraRecord {
    pan: Point,
    zoom: f64,
}

impl From<CameraRecord> for Camera {
    fn from(record: CameraRecord) -> Self {
        let mut camera = Camera {
            pan: record.pan,
            ..Camera::default()
        };
        camera.set_zoom(record.zoom);
        camera
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Point::ZERO,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Canvas-to-screen transform.
    pub fn view_transform(&self) -> AffineTransform {
        let mut view = AffineTransform::new();
        view.translate(self.pan.x, self.pan.y);
        view.scale(self.zoom, self.zoom);
        view
    }

    /// Inverse of [`canvas_to_screen`](Self::canvas_to_screen).
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        (screen - self.pan) * (1.0 / self.zoom)
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        self.view_transform().transform_point(canvas)
    }

    /// A tolerance in screen pixels expressed in canvas units.
    pub fn screen_distance(&self, pixels: f64) -> f64 {
        pixels / self.zoom
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan = self.pan + Point::new(dx, dy);
    }

    /// Set the zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`. Non-finite input
    /// resets it to [`DEFAULT_ZOOM`].
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = if zoom.is_finite() { zoom.clamp(MIN_ZOOM, MAX_ZOOM) } else { DEFAULT_ZOOM };
    }

    /// Multiply the zoom by `factor`, keeping the canvas point under
    /// `screen` where it is.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        let anchor = self.screen_to_canvas(screen);
        self.set_zoom(self.zoom * factor);
        self.pan = screen - anchor * self.zoom;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_default_view_is_identity() {
        let camera = Camera::new();
        let p = Point::new(100.0, 200.0);
        assert_eq!(camera.screen_to_canvas(p), p);
        assert_eq!(camera.canvas_to_screen(p), p);
    }

    #[test]
    fn test_pan_and_zoom_mapping() {
        let mut camera = Camera::new();
        camera.pan_by(50.0, 100.0);
        camera.set_zoom(2.0);
        assert!(close(camera.screen_to_canvas(Point::new(150.0, 300.0)), Point::new(50.0, 100.0)));
        assert!(close(camera.canvas_to_screen(Point::new(50.0, 100.0)), Point::new(150.0, 300.0)));
    }

    #[test]
    fn test_screen_canvas_inverse() {
        let mut camera = Camera::new();
        camera.pan = Point::new(30.0, -20.0);
        camera.set_zoom(0.5);
        let screen = Point::new(123.0, 456.0);
        assert!(close(camera.canvas_to_screen(camera.screen_to_canvas(screen)), screen));
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let mut camera = Camera::new();
        camera.pan = Point::new(-40.0, 15.0);
        let anchor = Point::new(200.0, 120.0);
        let before = camera.screen_to_canvas(anchor);
        camera.zoom_at(anchor, 2.5);
        assert!((camera.zoom() - 2.5).abs() < 1e-12);
        assert!(close(camera.screen_to_canvas(anchor), before));
    }

    #[test]
    fn test_zoom_limits() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert_eq!(camera.zoom(), MIN_ZOOM);
        camera.set_zoom(1000.0);
        assert_eq!(camera.zoom(), MAX_ZOOM);
        camera.reset();
        assert_eq!(camera, Camera::new());
    }

    #[test]
    fn test_loaded_zoom_is_clamped() {
        let camera: Camera = serde_json::from_str(r#"{"pan":{"x":5.0,"y":6.0},"zoom":0.0}"#).unwrap();
        assert_eq!(camera.zoom(), MIN_ZOOM);
        assert_eq!(camera.pan, Point::new(5.0, 6.0));
        assert!(camera.screen_distance(1.0).is_finite());

        let mut zoomed = Camera::new();
        zoomed.set_zoom(3.0);
        let json = serde_json::to_string(&zoomed).unwrap();
        assert_eq!(serde_json::from_str::<Camera>(&json).unwrap(), zoomed);

        zoomed.set_zoom(f64::NAN);
        assert_eq!(zoomed.zoom(), DEFAULT_ZOOM);
    }

    #[test]
    fn test_hit_tolerance_grows_when_zoomed_out() {
        let mut camera = Camera::new();
        camera.set_zoom(0.5);
        assert_eq!(camera.screen_distance(10.0), 20.0);
    }
}
