//! Doodle classes: the geometry contract and the class registry.

mod antseg;
mod freehand;
mod iridectomy;
mod lens;
mod nevus;

pub use antseg::AntSeg;
pub use freehand::Freehand;
pub use iridectomy::Iridectomy;
pub use lens::Lens;
pub use nevus::Nevus;

use crate::doodle::{Doodle, Squiggle};
use crate::error::{EngineError, Result};
use crate::parameter::{
    DescriptorTable, ParamValue, ParameterDescriptor, Parameters, Range, ValueType, names,
};
use crate::point::{Point, normalize_angle};
use crate::widget::{Handle, InteractionMode};
use kurbo::BezPath;
use peniko::Color;
use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};
use std::fmt;
use std::sync::Arc;

/// What the pointer may do with a doodle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Behaviour {
    pub moveable: bool,
    pub rotatable: bool,
    pub scaleable: bool,
    /// Scale axes independently.
    pub squeezable: bool,
    /// Accepts free-hand squiggles in draw mode.
    pub drawable: bool,
    pub deletable: bool,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            moveable: true,
            rotatable: true,
            scaleable: true,
            squeezable: false,
            drawable: false,
            deletable: true,
        }
    }
}

/// Allowed positions for a handle, in polar terms about the local origin.
///
/// `angle` runs clockwise from north; a range whose `min` exceeds its `max`
/// wraps through north.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorRange {
    pub length: Range,
    pub angle: Range,
}

impl VectorRange {
    pub fn new(length: Range, angle: Range) -> Self {
        Self { length, angle }
    }

    /// Move `point` to the nearest position inside the range.
    pub fn constrain(&self, point: Point) -> Point {
        let length = self.length.clamp(point.length());
        let angle = constrain_angle(point.direction(), self.angle);
        Point::from_polars(length, angle)
    }
}

fn angular_distance(a: f64, b: f64) -> f64 {
    let d = normalize_angle(a - b);
    d.min(TAU - d)
}

fn constrain_angle(angle: f64, range: Range) -> f64 {
    if range.max - range.min >= TAU {
        return angle;
    }
    let (min, max) = (normalize_angle(range.min), normalize_angle(range.max));
    let inside = if min <= max {
        angle >= min && angle <= max
    } else {
        angle >= min || angle <= max
    };
    if inside {
        angle
    } else if angular_distance(angle, min) <= angular_distance(angle, max) {
        min
    } else {
        max
    }
}

/// The capability every doodle class provides.
///
/// Implementations are stateless apart from their descriptor table, which
/// is built once when the class is constructed and shared by all instances.
pub trait DoodleClass: fmt::Debug + Send + Sync {
    fn class_name(&self) -> &'static str;

    fn descriptors(&self) -> &DescriptorTable;

    fn behaviour(&self) -> Behaviour {
        Behaviour::default()
    }

    /// Parameter values of a freshly placed doodle.
    fn defaults(&self) -> Parameters;

    fn default_squiggles(&self) -> Vec<Squiggle> {
        Vec::new()
    }

    /// Handles in local coordinates.
    fn handles(&self, params: &Parameters, squiggles: &[Squiggle]) -> Vec<Handle>;

    /// Outline in local coordinates, used both for drawing and hit-testing.
    fn boundary(&self, params: &Parameters, squiggles: &[Squiggle]) -> BezPath;

    /// Open strokes drawn on top of the boundary but never hit-tested.
    fn decorations(&self, _params: &Parameters, _squiggles: &[Squiggle]) -> Vec<BezPath> {
        Vec::new()
    }

    /// Values of other parameters implied by setting `parameter` to `value`.
    ///
    /// Runs once per change; the returned set must already be mutually
    /// consistent because it is not fed back into this function.
    fn dependent_values(
        &self,
        _parameter: &str,
        _value: &ParamValue,
        _params: &Parameters,
    ) -> Vec<(String, ParamValue)> {
        Vec::new()
    }

    /// Allowed positions for the handle with the given mode and index.
    fn vector_range(&self, _mode: InteractionMode, _index: usize) -> Option<VectorRange> {
        None
    }

    /// Stroke and fill colours.
    fn colors(&self) -> (Color, Option<Color>) {
        (Color::from_rgba8(0, 0, 0, 255), None)
    }
}

/// Shared reference to a doodle class.
pub type ClassRef = Arc<dyn DoodleClass>;

/// Class name to class lookup; the factory for new doodles.
#[derive(Debug, Clone, Default)]
pub struct ShapeRegistry {
    classes: BTreeMap<&'static str, ClassRef>,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in class.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(AntSeg::new());
        registry.register(Iridectomy::new());
        registry.register(Nevus::new());
        registry.register(Lens::new());
        registry.register(Freehand::new());
        registry
    }

    pub fn register<C: DoodleClass + 'static>(&mut self, class: C) {
        self.register_arc(Arc::new(class));
    }

    pub fn register_arc(&mut self, class: ClassRef) {
        self.classes.insert(class.class_name(), class);
    }

    pub fn get(&self, class_name: &str) -> Option<ClassRef> {
        self.classes.get(class_name).cloned()
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }

    pub fn class_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.classes.keys().copied()
    }

    /// Create a doodle with its class defaults.
    pub fn create(&self, class_name: &str) -> Result<Doodle> {
        let class = self
            .get(class_name)
            .ok_or_else(|| EngineError::UnknownClass(class_name.to_string()))?;
        Ok(Doodle::new(class))
    }
}

/// Descriptors for origin, scale and rotation, shared by every class.
pub(crate) fn placement_descriptors() -> DescriptorTable {
    DescriptorTable::new()
        .with(names::ORIGIN_X, ParameterDescriptor::simple(ValueType::Float).with_range(-1000.0, 1000.0))
        .with(names::ORIGIN_Y, ParameterDescriptor::simple(ValueType::Float).with_range(-1000.0, 1000.0))
        .with(
            names::SCALE_X,
            ParameterDescriptor::simple(ValueType::Float).with_range(0.5, 4.0).with_precision(2),
        )
        .with(
            names::SCALE_Y,
            ParameterDescriptor::simple(ValueType::Float).with_range(0.5, 4.0).with_precision(2),
        )
        .with(
            names::ROTATION,
            ParameterDescriptor::simple(ValueType::Mod).with_range(0.0, TAU).with_precision(6),
        )
}

/// Default placement values: at the canvas origin, unscaled, unrotated.
pub(crate) fn placement_defaults() -> Parameters {
    [
        (names::ORIGIN_X, 0.0),
        (names::ORIGIN_Y, 0.0),
        (names::SCALE_X, 1.0),
        (names::SCALE_Y, 1.0),
        (names::ROTATION, 0.0),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), ParamValue::Float(value)))
    .collect()
}

/// Angle range of width `2 * half` centred on `centre`.
pub(crate) fn angle_window(centre: f64, half: f64) -> Range {
    if half >= PI {
        return Range::new(0.0, TAU);
    }
    Range::new(normalize_angle(centre - half), normalize_angle(centre + half))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_builtin_registry() {
        let registry = ShapeRegistry::with_builtin();
        let names: Vec<_> = registry.class_names().collect();
        assert_eq!(names, vec!["AntSeg", "Freehand", "Iridectomy", "Lens", "Nevus"]);
        assert!(registry.create("Lens").is_ok());
        assert!(matches!(registry.create("Cornea"), Err(EngineError::UnknownClass(_))));
    }

    #[test]
    fn test_vector_range_clamps_length_and_angle() {
        let range = VectorRange::new(Range::new(20.0, 150.0), Range::new(0.5, 1.0));
        let inside = Point::from_polars(100.0, 0.7);
        let kept = range.constrain(inside);
        assert!((kept.x - inside.x).abs() < 1e-9 && (kept.y - inside.y).abs() < 1e-9);

        let far = range.constrain(Point::from_polars(400.0, FRAC_PI_2));
        assert!((far.length() - 150.0).abs() < 1e-9);
        assert!((far.direction() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_vector_range_wrapping_through_north() {
        let range = VectorRange::new(Range::new(10.0, 100.0), angle_window(0.0, 0.3));
        let near_north = Point::from_polars(50.0, TAU - 0.1);
        assert!((range.constrain(near_north).direction() - (TAU - 0.1)).abs() < 1e-9);

        let east = range.constrain(Point::from_polars(50.0, FRAC_PI_2));
        assert!((east.direction() - 0.3).abs() < 1e-9);
        let west = range.constrain(Point::from_polars(50.0, 3.0 * FRAC_PI_2));
        assert!((west.direction() - (TAU - 0.3)).abs() < 1e-9);
    }

    #[test]
    fn test_every_builtin_default_is_valid() {
        let registry = ShapeRegistry::with_builtin();
        for name in registry.class_names() {
            let class = registry.get(name).unwrap();
            for (param, value) in class.defaults().iter() {
                let descriptor = class
                    .descriptors()
                    .get(param)
                    .unwrap_or_else(|| panic!("{name} default {param} has no descriptor"));
                assert_eq!(descriptor.constrain(value), descriptor.constrain(&descriptor.constrain(value)));
            }
            for (param, _) in class.descriptors().iter() {
                assert!(class.defaults().contains(param), "{name} has no default for {param}");
            }
        }
    }
}
