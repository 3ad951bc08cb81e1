//! Handle definitions for doodle manipulation.

use crate::point::Point;
use serde::{Deserialize, Serialize};

/// Handle hit radius in screen pixels.
pub const HANDLE_HIT_RADIUS: f64 = 12.0;

/// Mode of the pointer-interaction state machine.
///
/// Handles are tagged with the mode they start; the mode in turn decides
/// which parameters a drag edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionMode {
    #[default]
    None,
    /// Drag the doodle body: origin.
    Move,
    /// Scale uniformly (or per axis for squeezable doodles).
    Scale,
    /// Half-angle span of an arc.
    Arc,
    /// Rotation about the origin.
    Rotate,
    /// Apex point.
    Apex,
    /// One point of the doodle's squiggle.
    Handles,
    /// Free-hand drawing into a squiggle.
    Draw,
    /// Select without dragging.
    Select,
    /// Explicit width and height.
    Size,
}

/// A control point on a doodle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handle {
    /// Local coordinates when produced by a doodle class, canvas-plane
    /// coordinates once placed by the doodle.
    pub location: Point,
    pub mode: InteractionMode,
    /// Which ring of handles this belongs to (0 inner, 1 outer).
    pub ring_index: u8,
    /// Whether the handle follows the doodle's rotation.
    pub rotatable: bool,
    pub visible: bool,
    /// Index of the squiggle point (or other per-mode slot) this handle edits.
    #[serde(default)]
    pub index: usize,
}

impl Handle {
    pub fn new(location: Point, mode: InteractionMode) -> Self {
        Self {
            location,
            mode,
            ring_index: 0,
            rotatable: true,
            visible: true,
            index: 0,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_ring(mut self, ring_index: u8) -> Self {
        self.ring_index = ring_index;
        self
    }

    pub fn fixed_orientation(mut self) -> Self {
        self.rotatable = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Check if a canvas point hits this handle.
    /// `tolerance` should already be adjusted for camera zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.location.x;
        let dy = point.y - self.location.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_test_radius() {
        let handle = Handle::new(Point::new(10.0, 10.0), InteractionMode::Scale);
        assert!(handle.hit_test(Point::new(14.0, 13.0), 5.0));
        assert!(!handle.hit_test(Point::new(20.0, 10.0), 5.0));
    }

    #[test]
    fn test_builder_flags() {
        let handle = Handle::new(Point::ZERO, InteractionMode::Handles)
            .with_index(3)
            .with_ring(1)
            .fixed_orientation()
            .hidden();
        assert_eq!(handle.index, 3);
        assert_eq!(handle.ring_index, 1);
        assert!(!handle.rotatable);
        assert!(!handle.visible);
    }

    #[test]
    fn test_descriptor_json_shape() {
        let handle = Handle::new(Point::new(1.0, 2.0), InteractionMode::Apex);
        let json = serde_json::to_value(handle).unwrap();
        assert_eq!(json["mode"], "Apex");
        assert_eq!(json["ringIndex"], 0);
        assert_eq!(json["location"]["x"], 1.0);
    }
}
