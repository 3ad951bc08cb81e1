//! Free-hand annotation: strokes drawn inside a square frame.

use super::{Behaviour, DoodleClass, placement_defaults, placement_descriptors};
use crate::doodle::Squiggle;
use crate::parameter::{DescriptorTable, Parameters};
use crate::path;
use crate::point::Point;
use crate::widget::{Handle, InteractionMode};
use kurbo::BezPath;

/// Half the side of the frame, in local units.
const FRAME_HALF: f64 = 100.0;

#[derive(Debug)]
pub struct Freehand {
    descriptors: DescriptorTable,
}

impl Freehand {
    pub const CLASS_NAME: &'static str = "Freehand";

    pub fn new() -> Self {
        Self {
            descriptors: placement_descriptors(),
        }
    }
}

impl Default for Freehand {
    fn default() -> Self {
        Self::new()
    }
}

impl DoodleClass for Freehand {
    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn descriptors(&self) -> &DescriptorTable {
        &self.descriptors
    }

    fn behaviour(&self) -> Behaviour {
        Behaviour {
            rotatable: false,
            drawable: true,
            ..Behaviour::default()
        }
    }

    fn defaults(&self) -> Parameters {
        placement_defaults()
    }

    fn handles(&self, _params: &Parameters, _squiggles: &[Squiggle]) -> Vec<Handle> {
        vec![Handle::new(Point::new(FRAME_HALF, FRAME_HALF), InteractionMode::Scale)]
    }

    fn boundary(&self, _params: &Parameters, _squiggles: &[Squiggle]) -> BezPath {
        path::polygon(&[
            Point::new(-FRAME_HALF, -FRAME_HALF),
            Point::new(FRAME_HALF, -FRAME_HALF),
            Point::new(FRAME_HALF, FRAME_HALF),
            Point::new(-FRAME_HALF, FRAME_HALF),
        ])
    }

    fn decorations(&self, _params: &Parameters, squiggles: &[Squiggle]) -> Vec<BezPath> {
        squiggles
            .iter()
            .map(|s| if s.closed { path::polygon(&s.points) } else { path::polyline(&s.points) })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strokes_become_decorations() {
        let class = Freehand::new();
        let mut stroke = Squiggle::new(false);
        stroke.push(Point::new(-10.0, 0.0));
        stroke.push(Point::new(10.0, 5.0));
        let decorations = class.decorations(&class.defaults(), &[stroke]);
        assert_eq!(decorations.len(), 1);
        assert_eq!(decorations[0].elements().len(), 2);
    }

    #[test]
    fn test_is_drawable() {
        assert!(Freehand::new().behaviour().drawable);
        assert!(!Freehand::new().behaviour().rotatable);
    }
}
