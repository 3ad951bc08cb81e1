//! Peripheral iridectomy: a notch in the iris at a clock position.

use super::{Behaviour, DoodleClass, placement_defaults, placement_descriptors};
use crate::doodle::Squiggle;
use crate::parameter::{DescriptorTable, ParamValue, ParameterDescriptor, Parameters, ValueType, names};
use crate::path;
use crate::point::{Point, clock_hour, clock_hour_angle};
use crate::widget::{Handle, InteractionMode};
use kurbo::BezPath;
use std::f64::consts::PI;

const CLOCK_HOUR: &str = "clockHour";

const INNER_RADIUS: f64 = 330.0;
const OUTER_RADIUS: f64 = 380.0;
/// Distance of the rotation handle from the centre.
const ROTATE_HANDLE_RADIUS: f64 = 420.0;

#[derive(Debug)]
pub struct Iridectomy {
    descriptors: DescriptorTable,
}

impl Iridectomy {
    pub const CLASS_NAME: &'static str = "Iridectomy";

    pub fn new() -> Self {
        let descriptors = placement_descriptors()
            .with(
                names::ARC,
                ParameterDescriptor::simple(ValueType::Float).with_range(0.2, PI).with_precision(4),
            )
            .with(CLOCK_HOUR, ParameterDescriptor::derived(ValueType::Int).with_range(1.0, 12.0));
        Self { descriptors }
    }
}

impl Default for Iridectomy {
    fn default() -> Self {
        Self::new()
    }
}

impl DoodleClass for Iridectomy {
    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }

    fn descriptors(&self) -> &DescriptorTable {
        &self.descriptors
    }

    fn behaviour(&self) -> Behaviour {
        Behaviour {
            moveable: false,
            scaleable: false,
            ..Behaviour::default()
        }
    }

    fn defaults(&self) -> Parameters {
        let mut params = placement_defaults();
        params.set(names::ARC, ParamValue::Float(0.5236));
        params.set(CLOCK_HOUR, ParamValue::Int(12));
        params
    }

    fn handles(&self, params: &Parameters, _squiggles: &[Squiggle]) -> Vec<Handle> {
        let arc = params.get_f64(names::ARC);
        vec![
            Handle::new(Point::from_polars(ROTATE_HANDLE_RADIUS, 0.0), InteractionMode::Rotate),
            Handle::new(Point::from_polars(OUTER_RADIUS, arc / 2.0), InteractionMode::Arc),
        ]
    }

    fn boundary(&self, params: &Parameters, _squiggles: &[Squiggle]) -> BezPath {
        path::annular_sector(INNER_RADIUS, OUTER_RADIUS, params.get_f64(names::ARC))
    }

    fn dependent_values(
        &self,
        parameter: &str,
        value: &ParamValue,
        _params: &Parameters,
    ) -> Vec<(String, ParamValue)> {
        match (parameter, value.as_f64()) {
            (names::ROTATION, Some(rotation)) => {
                vec![(CLOCK_HOUR.to_string(), ParamValue::Int(i64::from(clock_hour(rotation))))]
            }
            (CLOCK_HOUR, Some(hour)) => {
                let hour = hour.round().clamp(1.0, 12.0) as u8;
                vec![(names::ROTATION.to_string(), ParamValue::Float(clock_hour_angle(hour)))]
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_clock_hour_from_rotation() {
        let class = Iridectomy::new();
        let deps = class.dependent_values(names::ROTATION, &ParamValue::Float(FRAC_PI_2), &class.defaults());
        assert_eq!(deps, vec![(CLOCK_HOUR.to_string(), ParamValue::Int(3))]);
        let deps = class.dependent_values(names::ROTATION, &ParamValue::Float(0.05), &class.defaults());
        assert_eq!(deps, vec![(CLOCK_HOUR.to_string(), ParamValue::Int(12))]);
    }

    #[test]
    fn test_rotation_from_clock_hour() {
        let class = Iridectomy::new();
        let deps = class.dependent_values(CLOCK_HOUR, &ParamValue::Int(9), &class.defaults());
        let rotation = deps[0].1.as_f64().unwrap();
        assert!((rotation - 3.0 * FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_arc_handle_on_sector_edge() {
        let class = Iridectomy::new();
        let handles = class.handles(&class.defaults(), &[]);
        let arc_handle = handles.iter().find(|h| h.mode == InteractionMode::Arc).unwrap();
        assert!((arc_handle.location.length() - OUTER_RADIUS).abs() < 1e-9);
        assert!((arc_handle.location.direction() - 0.2618).abs() < 1e-9);
    }
}
