//! Iris naevus: a pigmented patch with a freely reshaped outline.

use super::{DoodleClass, VectorRange, angle_window, placement_defaults, placement_descriptors};
use crate::doodle::Squiggle;
use crate::parameter::{DescriptorTable, Parameters, Range};
use crate::path;
use crate::point::Point;
use crate::widget::{Handle, InteractionMode};
use kurbo::BezPath;
use peniko::Color;
use std::f64::consts::{PI, TAU};

/// Points in the outline ring.
const RING_POINTS: usize = 8;
const RING_RADIUS: f64 = 60.0;
const ROTATE_HANDLE_RADIUS: f64 = 90.0;

/// Outline drawn as a smooth curve through a ring of points, each of which
/// can be dragged once the doodle is in handle editing.
#[derive(Debug)]
pub struct Nevus {
    descriptors: DescriptorTable,
}

impl Nevus {
    pub const CLASS_NAME: &'static str = "Nevus";

    pub fn new() -> Self {
        Self {
            descriptors: placement_descriptors(),
        }
    }
}

impl Default for Nevus {
    fn default() -> Self {
        Self::new()
    }
}

impl DoodleClass for Nevus {
    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn descriptors(&self) -> &DescriptorTable {
        &self.descriptors
    }

    fn defaults(&self) -> Parameters {
        placement_defaults()
    }

    fn default_squiggles(&self) -> Vec<Squiggle> {
        vec![Squiggle::ring(RING_POINTS, RING_RADIUS)]
    }

    fn handles(&self, _params: &Parameters, squiggles: &[Squiggle]) -> Vec<Handle> {
        let mut handles = vec![
            Handle::new(Point::new(RING_RADIUS, RING_RADIUS), InteractionMode::Scale),
            Handle::new(Point::from_polars(ROTATE_HANDLE_RADIUS, 0.0), InteractionMode::Rotate),
        ];
        if let Some(ring) = squiggles.first() {
            handles.extend(
                ring.points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| Handle::new(*p, InteractionMode::Handles).with_index(i).with_ring(1).hidden()),
            );
        }
        handles
    }

    fn boundary(&self, _params: &Parameters, squiggles: &[Squiggle]) -> BezPath {
        squiggles
            .first()
            .map(|ring| path::smooth_ring(&ring.points))
            .unwrap_or_else(|| path::circle(RING_RADIUS, true))
    }

    fn vector_range(&self, mode: InteractionMode, index: usize) -> Option<VectorRange> {
        // Each ring point stays in its own sector so the outline never folds.
        (mode == InteractionMode::Handles).then(|| {
            let centre = index as f64 * TAU / RING_POINTS as f64;
            VectorRange::new(Range::new(20.0, 150.0), angle_window(centre, PI / RING_POINTS as f64))
        })
    }

    fn colors(&self) -> (Color, Option<Color>) {
        (Color::from_rgba8(110, 60, 20, 255), Some(Color::from_rgba8(170, 100, 40, 200)))
    }
}
