//! Doodle instances: a class, its parameter values and its squiggles.

use crate::error::{Diagnostic, EngineError, Result};
use crate::notification::DoodleRef;
use crate::parameter::{ParamValue, ParameterDescriptor, Parameters, Range, names};
use crate::path::BoundaryPath;
use crate::point::Point;
use crate::shapes::{Behaviour, ClassRef};
use crate::transform::{AffineTransform, TransformError};
use crate::widget::{Handle, InteractionMode};
use kurbo::BezPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::TAU;
use uuid::Uuid;

/// Unique identifier for a doodle.
pub type DoodleId = Uuid;

/// An ordered run of free-form points owned by a doodle, in local space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Squiggle {
    pub points: Vec<Point>,
    #[serde(default)]
    pub closed: bool,
}

impl Squiggle {
    pub fn new(closed: bool) -> Self {
        Self {
            points: Vec::new(),
            closed,
        }
    }

    /// `count` points evenly spaced on a circle, starting at north.
    pub fn ring(count: usize, radius: f64) -> Self {
        let points = (0..count)
            .map(|i| Point::from_polars(radius, i as f64 * TAU / count as f64))
            .collect();
        Self { points, closed: true }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// The persisted form of a doodle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoodleRecord {
    pub class_name: String,
    pub parameter_values: Parameters,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub squiggles: Vec<Squiggle>,
}

/// An in-flight animation of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Animation {
    pub target: ParamValue,
    /// Value before the animation started, reported when it completes.
    pub old_value: ParamValue,
}

/// A placed, parameterized instance of a doodle class.
///
/// Parameter values always satisfy their descriptors: every write goes
/// through [`ParameterDescriptor::constrain`]. The local-to-canvas
/// transform is kept in step with the placement parameters.
#[derive(Debug, Clone)]
pub struct Doodle {
    pub(crate) id: DoodleId,
    class: ClassRef,
    params: Parameters,
    /// Instance descriptors layered over the class table.
    overrides: BTreeMap<String, ParameterDescriptor>,
    pub(crate) squiggles: Vec<Squiggle>,
    transform: AffineTransform,
    pub(crate) animations: BTreeMap<String, Animation>,
}

impl Doodle {
    /// Create a doodle with its class defaults.
    pub fn new(class: ClassRef) -> Self {
        let mut doodle = Self {
            id: Uuid::new_v4(),
            params: Parameters::new(),
            overrides: BTreeMap::new(),
            squiggles: class.default_squiggles(),
            transform: AffineTransform::new(),
            animations: BTreeMap::new(),
            class,
        };
        let defaults = doodle.class.defaults();
        for (name, value) in defaults.iter() {
            doodle.assign(name, value);
        }
        doodle.update_transform();
        doodle
    }

    /// Rebuild a doodle from a saved record.
    ///
    /// Values are constrained but dependents are not recomputed: a saved
    /// record already holds a consistent set. Parameters the class does not
    /// know are reported and skipped.
    pub fn from_record(class: ClassRef, record: &DoodleRecord, report: &mut dyn FnMut(Diagnostic)) -> Self {
        let mut doodle = Self::new(class);
        for (name, value) in record.parameter_values.iter() {
            if doodle.descriptor(name).is_none() {
                report(Diagnostic::new(
                    doodle.class_name(),
                    "load",
                    format!("unknown parameter {name}"),
                ));
                continue;
            }
            doodle.assign(name, value);
        }
        if !record.squiggles.is_empty() {
            doodle.squiggles = record.squiggles.clone();
        }
        doodle.update_transform();
        doodle
    }

    pub fn id(&self) -> DoodleId {
        self.id
    }

    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    pub fn class_name(&self) -> &'static str {
        self.class.class_name()
    }

    pub fn behaviour(&self) -> Behaviour {
        self.class.behaviour()
    }

    pub fn reference(&self) -> DoodleRef {
        DoodleRef {
            id: self.id,
            class_name: self.class_name().to_string(),
        }
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn parameter(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn get_f64(&self, name: &str) -> f64 {
        self.params.get_f64(name)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.get_f64(names::ORIGIN_X), self.get_f64(names::ORIGIN_Y))
    }

    pub fn squiggles(&self) -> &[Squiggle] {
        &self.squiggles
    }

    /// Effective descriptor: the instance override if any, else the class's.
    pub fn descriptor(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.overrides.get(name).or_else(|| self.class.descriptors().get(name))
    }

    pub(crate) fn unknown_parameter(&self, name: &str) -> EngineError {
        EngineError::UnknownParameter {
            class_name: self.class_name().to_string(),
            parameter: name.to_string(),
        }
    }

    /// Restrict a parameter's range for this instance only.
    ///
    /// The new range is intersected with the current one; if they do not
    /// overlap the given range replaces it. The current value is brought
    /// into the new range.
    pub fn narrow_range(&mut self, name: &str, min: f64, max: f64) -> Result<()> {
        let mut narrowed = self.descriptor(name).cloned().ok_or_else(|| self.unknown_parameter(name))?;
        let (min, max) = (min.min(max), min.max(max));
        narrowed.range = match narrowed.range {
            Some(r) if r.min.max(min) <= r.max.min(max) => Some(Range::new(r.min.max(min), r.max.min(max))),
            _ => Some(Range::new(min, max)),
        };
        self.overrides.insert(name.to_string(), narrowed);
        if let Some(current) = self.params.get(name).cloned() {
            self.assign(name, &current);
            self.update_transform();
        }
        Ok(())
    }

    /// Drop an instance override, returning to the class descriptor.
    pub fn clear_override(&mut self, name: &str) {
        self.overrides.remove(name);
    }

    /// Constrain and store a value. Returns `(old, new)` if it changed.
    ///
    /// Does not recompute dependents or the transform.
    pub(crate) fn assign(&mut self, name: &str, value: &ParamValue) -> Option<(ParamValue, ParamValue)> {
        let constrained = self.descriptor(name)?.constrain(value);
        match self.params.set(name, constrained.clone()) {
            Some(old) if old == constrained => None,
            Some(old) => Some((old, constrained)),
            None => Some((constrained.clone(), constrained)),
        }
    }

    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    /// Rebuild the local-to-canvas transform from origin, scale and rotation.
    pub fn update_transform(&mut self) {
        self.transform = self.placement(true);
    }

    fn placement(&self, with_rotation: bool) -> AffineTransform {
        let mut t = AffineTransform::new();
        t.translate(self.get_f64(names::ORIGIN_X), self.get_f64(names::ORIGIN_Y));
        t.scale(
            self.params.get_f64_or(names::SCALE_X, 1.0),
            self.params.get_f64_or(names::SCALE_Y, 1.0),
        );
        if with_rotation {
            t.rotate(self.get_f64(names::ROTATION));
        }
        t
    }

    pub fn to_canvas(&self, local: Point) -> Point {
        self.transform.transform_point(local)
    }

    pub fn to_local(&self, canvas: Point) -> std::result::Result<Point, TransformError> {
        Ok(self.transform.create_inverse()?.transform_point(canvas))
    }

    /// Handles placed on the canvas plane.
    ///
    /// Hidden handles of the `Handles` mode are revealed while `editing`.
    pub fn handles(&self, editing: bool) -> Vec<Handle> {
        let unrotated = self.placement(false);
        self.class
            .handles(&self.params, &self.squiggles)
            .into_iter()
            .map(|mut handle| {
                handle.location = if handle.rotatable {
                    self.transform.transform_point(handle.location)
                } else {
                    unrotated.transform_point(handle.location)
                };
                if editing && handle.mode == InteractionMode::Handles {
                    handle.visible = true;
                }
                handle
            })
            .collect()
    }

    /// Outline on the canvas plane, for drawing and hit-testing alike.
    pub fn boundary_path(&self) -> BoundaryPath {
        let (stroke, fill) = self.class.colors();
        BoundaryPath::from_local(self.class.boundary(&self.params, &self.squiggles), &self.transform)
            .with_colors(stroke, fill)
    }

    /// Open strokes on the canvas plane.
    pub fn decorations(&self) -> Vec<BezPath> {
        self.class
            .decorations(&self.params, &self.squiggles)
            .into_iter()
            .map(|mut path| {
                self.transform.transform_path(&mut path);
                path
            })
            .collect()
    }

    pub fn contains(&self, canvas: Point) -> bool {
        self.boundary_path().contains(canvas)
    }

    pub fn is_animating(&self) -> bool {
        !self.animations.is_empty()
    }

    pub fn to_record(&self) -> DoodleRecord {
        DoodleRecord {
            class_name: self.class_name().to_string(),
            parameter_values: self.params.clone(),
            squiggles: self.squiggles.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{AntSeg, Lens, Nevus, ShapeRegistry};
    use std::sync::Arc;

    #[test]
    fn test_new_doodle_uses_defaults() {
        let doodle = Doodle::new(Arc::new(Lens::new()));
        assert_eq!(doodle.class_name(), "Lens");
        assert_eq!(doodle.get_f64(names::WIDTH), 200.0);
        assert_eq!(doodle.origin(), Point::ZERO);
        assert!(doodle.contains(Point::new(50.0, 0.0)));
    }

    #[test]
    fn test_transform_follows_placement() {
        let mut doodle = Doodle::new(Arc::new(Lens::new()));
        doodle.assign(names::ORIGIN_X, &ParamValue::Float(100.0));
        doodle.update_transform();
        assert_eq!(doodle.to_canvas(Point::ZERO), Point::new(100.0, 0.0));
        let local = doodle.to_local(Point::new(150.0, 10.0)).unwrap();
        assert!((local.x - 50.0).abs() < 1e-9 && (local.y - 10.0).abs() < 1e-9);
        assert!(doodle.contains(Point::new(150.0, 0.0)));
        assert!(!doodle.contains(Point::new(-10.0, 0.0)));
    }

    #[test]
    fn test_narrow_range_overrides_class() {
        let mut doodle = Doodle::new(Arc::new(AntSeg::new()));
        doodle.narrow_range(names::APEX_Y, -150.0, -60.0).unwrap();
        assert_eq!(doodle.parameter(names::APEX_Y), Some(&ParamValue::Int(-150)));
        let range = doodle.descriptor(names::APEX_Y).unwrap().range.unwrap();
        assert_eq!(range, Range::new(-150.0, -60.0));
        // The class table itself is untouched.
        let class_range = doodle.class().descriptors().get(names::APEX_Y).unwrap().range.unwrap();
        assert_eq!(class_range, Range::new(-280.0, -60.0));

        doodle.clear_override(names::APEX_Y);
        assert_eq!(doodle.descriptor(names::APEX_Y).unwrap().range, Some(class_range));
        assert!(doodle.narrow_range("bogus", 0.0, 1.0).is_err());
    }

    #[test]
    fn test_editing_reveals_ring_handles() {
        let doodle = Doodle::new(Arc::new(Nevus::new()));
        let hidden = doodle.handles(false).iter().filter(|h| !h.visible).count();
        assert_eq!(hidden, 8);
        assert!(doodle.handles(true).iter().all(|h| h.visible));
    }

    #[test]
    fn test_record_round_trip() {
        let registry = ShapeRegistry::with_builtin();
        let mut doodle = registry.create("Nevus").unwrap();
        doodle.assign(names::ORIGIN_X, &ParamValue::Float(-40.0));
        doodle.squiggles[0].points[0] = Point::new(0.0, -90.0);
        let record = doodle.to_record();

        let mut reports = Vec::new();
        let restored = Doodle::from_record(registry.get("Nevus").unwrap(), &record, &mut |d| reports.push(d));
        assert!(reports.is_empty());
        assert_eq!(restored.parameters(), doodle.parameters());
        assert_eq!(restored.squiggles(), doodle.squiggles());
        assert_ne!(restored.id(), doodle.id());
    }

    #[test]
    fn test_from_record_reports_unknown_parameter() {
        let registry = ShapeRegistry::with_builtin();
        let mut record = registry.create("Lens").unwrap().to_record();
        record.parameter_values.set("colour", "red".into());
        let mut reports = Vec::new();
        Doodle::from_record(registry.get("Lens").unwrap(), &record, &mut |d| reports.push(d));
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].class_name, "Lens");
    }
}
