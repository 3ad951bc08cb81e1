//! Lens: an ellipse sized by a corner handle.

use super::{Behaviour, DoodleClass, placement_defaults, placement_descriptors};
use crate::doodle::Squiggle;
use crate::parameter::{DescriptorTable, ParamValue, ParameterDescriptor, Parameters, ValueType, names};
use crate::path;
use crate::point::Point;
use crate::widget::{Handle, InteractionMode};
use kurbo::BezPath;
use peniko::Color;

#[derive(Debug)]
pub struct Lens {
    descriptors: DescriptorTable,
}

impl Lens {
    pub const CLASS_NAME: &'static str = "Lens";

    pub fn new() -> Self {
        let descriptors = placement_descriptors()
            .with(names::WIDTH, ParameterDescriptor::simple(ValueType::Float).with_range(40.0, 400.0))
            .with(names::HEIGHT, ParameterDescriptor::simple(ValueType::Float).with_range(40.0, 400.0));
        Self { descriptors }
    }
}

impl Default for Lens {
    fn default() -> Self {
        Self::new()
    }
}

impl DoodleClass for Lens {
    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn descriptors(&self) -> &DescriptorTable {
        &self.descriptors
    }

    fn behaviour(&self) -> Behaviour {
        Behaviour {
            rotatable: false,
            scaleable: false,
            ..Behaviour::default()
        }
    }

    fn defaults(&self) -> Parameters {
        let mut params = placement_defaults();
        params.set(names::WIDTH, ParamValue::Float(200.0));
        params.set(names::HEIGHT, ParamValue::Float(160.0));
        params
    }

    fn handles(&self, params: &Parameters, _squiggles: &[Squiggle]) -> Vec<Handle> {
        let corner = Point::new(params.get_f64(names::WIDTH) / 2.0, params.get_f64(names::HEIGHT) / 2.0);
        vec![Handle::new(corner, InteractionMode::Size)]
    }

    fn boundary(&self, params: &Parameters, _squiggles: &[Squiggle]) -> BezPath {
        path::ellipse(params.get_f64(names::WIDTH), params.get_f64(names::HEIGHT))
    }

    fn colors(&self) -> (Color, Option<Color>) {
        (Color::from_rgba8(60, 60, 60, 255), Some(Color::from_rgba8(230, 230, 200, 160)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::BoundaryPath;

    #[test]
    fn test_size_handle_at_corner() {
        let class = Lens::new();
        let handles = class.handles(&class.defaults(), &[]);
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].location, Point::new(100.0, 80.0));
        assert_eq!(handles[0].mode, InteractionMode::Size);
    }

    #[test]
    fn test_ellipse_outline() {
        let class = Lens::new();
        let outline = BoundaryPath::new(class.boundary(&class.defaults(), &[]));
        assert!(outline.contains(Point::new(90.0, 0.0)));
        assert!(!outline.contains(Point::new(0.0, 90.0)));
    }
}
