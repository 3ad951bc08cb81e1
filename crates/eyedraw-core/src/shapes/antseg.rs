//! Anterior segment: the iris with an adjustable pupil.

use super::{Behaviour, DoodleClass, VectorRange, placement_defaults, placement_descriptors};
use crate::doodle::Squiggle;
use crate::parameter::{DescriptorTable, ParamValue, ParameterDescriptor, Parameters, Range, ValueType, names};
use crate::path;
use crate::point::Point;
use crate::widget::{Handle, InteractionMode};
use kurbo::BezPath;
use peniko::Color;

/// Outer radius of the iris.
const IRIS_RADIUS: f64 = 380.0;

const PUPIL_SIZE: &str = "pupilSize";

/// Pupil size names and the apex position each one stands for.
const PUPIL_SIZES: [(&str, i64); 3] = [("Large", -100), ("Medium", -200), ("Small", -260)];

/// Iris outline with the pupil cut out; the apex handle sits on the pupil
/// margin straight above the centre.
#[derive(Debug)]
pub struct AntSeg {
    descriptors: DescriptorTable,
}

impl AntSeg {
    pub const CLASS_NAME: &'static str = "AntSeg";

    pub fn new() -> Self {
        let descriptors = placement_descriptors()
            .with(names::APEX_X, ParameterDescriptor::simple(ValueType::Int).with_range(0.0, 0.0))
            .with(
                names::APEX_Y,
                ParameterDescriptor::simple(ValueType::Int)
                    .with_range(-280.0, -60.0)
                    .with_animation(15.0),
            )
            .with(
                PUPIL_SIZE,
                ParameterDescriptor::derived(ValueType::String).with_list(PUPIL_SIZES.map(|(name, _)| name)),
            );
        Self { descriptors }
    }

    fn pupil_size_for(apex_y: f64) -> &'static str {
        if apex_y < -200.0 {
            "Small"
        } else if apex_y < -100.0 {
            "Medium"
        } else {
            "Large"
        }
    }

    fn apex_for(pupil_size: &str) -> Option<i64> {
        PUPIL_SIZES.iter().find(|(name, _)| *name == pupil_size).map(|(_, apex)| *apex)
    }
}

impl Default for AntSeg {
    fn default() -> Self {
        Self::new()
    }
}

impl DoodleClass for AntSeg {
    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn descriptors(&self) -> &DescriptorTable {
        &self.descriptors
    }

    fn behaviour(&self) -> Behaviour {
        Behaviour {
            moveable: false,
            rotatable: false,
            scaleable: false,
            deletable: false,
            ..Behaviour::default()
        }
    }

    fn defaults(&self) -> Parameters {
        let mut params = placement_defaults();
        params.set(names::APEX_X, ParamValue::Int(0));
        params.set(names::APEX_Y, ParamValue::Int(-200));
        params.set(PUPIL_SIZE, "Medium".into());
        params
    }

    fn handles(&self, params: &Parameters, _squiggles: &[Squiggle]) -> Vec<Handle> {
        let apex = Point::new(params.get_f64(names::APEX_X), params.get_f64(names::APEX_Y));
        vec![Handle::new(apex, InteractionMode::Apex)]
    }

    fn boundary(&self, params: &Parameters, _squiggles: &[Squiggle]) -> BezPath {
        let mut outline = path::circle(IRIS_RADIUS, true);
        path::append_circle(&mut outline, params.get_f64(names::APEX_Y).abs(), false);
        outline
    }

    fn dependent_values(
        &self,
        parameter: &str,
        value: &ParamValue,
        _params: &Parameters,
    ) -> Vec<(String, ParamValue)> {
        match parameter {
            names::APEX_Y => value
                .as_f64()
                .map(|apex_y| vec![(PUPIL_SIZE.to_string(), Self::pupil_size_for(apex_y).into())])
                .unwrap_or_default(),
            PUPIL_SIZE => value
                .as_str()
                .and_then(Self::apex_for)
                .map(|apex_y| vec![(names::APEX_Y.to_string(), ParamValue::Int(apex_y))])
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn vector_range(&self, mode: InteractionMode, _index: usize) -> Option<VectorRange> {
        // The apex only travels along the vertical axis above the centre.
        (mode == InteractionMode::Apex).then(|| VectorRange::new(Range::new(60.0, 280.0), Range::new(0.0, 0.0)))
    }

    fn colors(&self) -> (Color, Option<Color>) {
        (Color::from_rgba8(0, 0, 0, 255), Some(Color::from_rgba8(100, 200, 250, 255)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::BoundaryPath;

    #[test]
    fn test_pupil_size_follows_apex() {
        let class = AntSeg::new();
        let params = class.defaults();
        let deps = class.dependent_values(names::APEX_Y, &ParamValue::Int(-260), &params);
        assert_eq!(deps, vec![(PUPIL_SIZE.to_string(), "Small".into())]);
        let deps = class.dependent_values(names::APEX_Y, &ParamValue::Int(-150), &params);
        assert_eq!(deps, vec![(PUPIL_SIZE.to_string(), "Medium".into())]);
        let deps = class.dependent_values(names::APEX_Y, &ParamValue::Int(-80), &params);
        assert_eq!(deps, vec![(PUPIL_SIZE.to_string(), "Large".into())]);
    }

    #[test]
    fn test_apex_follows_pupil_size() {
        let class = AntSeg::new();
        let deps = class.dependent_values(PUPIL_SIZE, &"Large".into(), &class.defaults());
        assert_eq!(deps, vec![(names::APEX_Y.to_string(), ParamValue::Int(-100))]);
    }

    #[test]
    fn test_pupil_size_mapping_is_consistent() {
        // Each size's apex maps back to the same size.
        for (size, apex) in PUPIL_SIZES {
            assert_eq!(AntSeg::pupil_size_for(apex as f64), size);
        }
    }

    #[test]
    fn test_pupil_is_a_hole() {
        let class = AntSeg::new();
        let outline = BoundaryPath::new(class.boundary(&class.defaults(), &[]));
        assert!(!outline.contains(Point::ZERO));
        assert!(outline.contains(Point::new(0.0, -300.0)));
        assert!(!outline.contains(Point::new(0.0, -400.0)));
    }

    #[test]
    fn test_apex_range_stays_on_axis() {
        let class = AntSeg::new();
        let range = class.vector_range(InteractionMode::Apex, 0).unwrap();
        let p = range.constrain(Point::new(40.0, -500.0));
        assert!(p.x.abs() < 1e-9);
        assert!((p.y + 280.0).abs() < 1e-9);
    }
}
