//! Parameter descriptors, values and validation.
//!
//! Every doodle class owns a [`DescriptorTable`] describing its named
//! parameters: whether each is *simple* (moved directly by the pointer),
//! *derived* (computed from simple parameters) or *other*, what type its
//! values have, and how out-of-range input is brought back into range.
//! Validation never rejects a value; it clamps, wraps or snaps it to the
//! nearest valid one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Names of the simple parameters shared by all doodle classes.
pub mod names {
    pub const ORIGIN_X: &str = "originX";
    pub const ORIGIN_Y: &str = "originY";
    pub const SCALE_X: &str = "scaleX";
    pub const SCALE_Y: &str = "scaleY";
    pub const ROTATION: &str = "rotation";
    pub const ARC: &str = "arc";
    pub const APEX_X: &str = "apexX";
    pub const APEX_Y: &str = "apexY";
    pub const RADIUS: &str = "radius";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
}

/// Role of a parameter in constraint propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Simple,
    Derived,
    Other,
}

/// Value type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    Int,
    Float,
    String,
    Bool,
    FreeText,
    /// Float that wraps around its range instead of clamping (angles).
    Mod,
}

/// A parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            ParamValue::Text(s) => s.trim().parse().ok(),
            ParamValue::Bool(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Int(v) => Some(*v != 0),
            ParamValue::Text(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            ParamValue::Float(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ParamValue::Int(_) | ParamValue::Float(_))
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// Inclusive numeric range, serialized as `[min, max]`.
///
/// For [`ValueType::Mod`] the upper bound is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    /// Wrap `v` into `[min, max)`.
    pub fn wrap(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return self.min;
        }
        let wrapped = (v - self.min).rem_euclid(span) + self.min;
        if wrapped >= self.max { self.min } else { wrapped }
    }
}

impl From<[f64; 2]> for Range {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<Range> for [f64; 2] {
    fn from(r: Range) -> Self {
        [r.min, r.max]
    }
}

/// Validation and animation rules for one named parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub kind: ParameterKind,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<ParamValue>>,
    /// Decimal places kept for float values; `0` keeps whole canvas units.
    #[serde(default)]
    pub precision: u8,
    #[serde(default)]
    pub animate: bool,
    /// Step applied per animation frame.
    #[serde(default)]
    pub delta: f64,
}

impl ParameterDescriptor {
    pub fn new(kind: ParameterKind, value_type: ValueType) -> Self {
        Self {
            kind,
            value_type,
            range: None,
            list: None,
            precision: 0,
            animate: false,
            delta: 0.0,
        }
    }

    pub fn simple(value_type: ValueType) -> Self {
        Self::new(ParameterKind::Simple, value_type)
    }

    pub fn derived(value_type: ValueType) -> Self {
        Self::new(ParameterKind::Derived, value_type)
    }

    pub fn other(value_type: ValueType) -> Self {
        Self::new(ParameterKind::Other, value_type)
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some(Range::new(min, max));
        self
    }

    pub fn with_list<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.list = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    /// Animate user-driven changes, moving `delta` per frame.
    pub fn with_animation(mut self, delta: f64) -> Self {
        self.animate = delta > 0.0;
        self.delta = delta.abs();
        self
    }

    pub fn is_simple(&self) -> bool {
        self.kind == ParameterKind::Simple
    }

    /// Bring `value` to this descriptor's type and into its valid set.
    ///
    /// Never fails: numbers are clamped (or wrapped for [`ValueType::Mod`])
    /// to the range, enumerated values snap to the nearest list entry, and
    /// values that cannot be read as the declared type fall back to the
    /// type's neutral value. The result is a fixed point:
    /// `constrain(constrain(v)) == constrain(v)`.
    pub fn constrain(&self, value: &ParamValue) -> ParamValue {
        match self.value_type {
            ValueType::Int => ParamValue::Int(self.constrain_number(value.as_f64().unwrap_or(0.0)) as i64),
            ValueType::Float => ParamValue::Float(self.constrain_number(value.as_f64().unwrap_or(0.0))),
            ValueType::Mod => {
                let raw = value.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0);
                let v = match self.range {
                    Some(range) => {
                        // Rounding can land on the excluded upper bound.
                        let rounded = round_to(range.wrap(raw), self.precision).max(range.min);
                        if rounded >= range.max { range.min } else { rounded }
                    }
                    None => round_to(raw, self.precision),
                };
                ParamValue::Float(v)
            }
            ValueType::Bool => ParamValue::Bool(value.as_bool().unwrap_or(false)),
            ValueType::String => {
                let text = value.to_string();
                match &self.list {
                    Some(list) if !list.is_empty() => {
                        if list.iter().any(|entry| entry.to_string() == text) {
                            ParamValue::Text(text)
                        } else {
                            ParamValue::Text(list[0].to_string())
                        }
                    }
                    _ => ParamValue::Text(text),
                }
            }
            ValueType::FreeText => ParamValue::Text(value.to_string()),
        }
    }

    fn constrain_number(&self, raw: f64) -> f64 {
        let raw = if raw.is_finite() { raw } else { 0.0 };
        if let Some(list) = &self.list {
            let nearest = list
                .iter()
                .filter_map(ParamValue::as_f64)
                .min_by(|a, b| (a - raw).abs().total_cmp(&(b - raw).abs()));
            if let Some(nearest) = nearest {
                return if self.value_type == ValueType::Int { nearest.round() } else { nearest };
            }
        }
        // Round before clamping so the result never leaves the range.
        let rounded = match self.value_type {
            ValueType::Int => raw.round(),
            _ => round_to(raw, self.precision),
        };
        let Some(range) = self.range else {
            return rounded;
        };
        if self.value_type != ValueType::Int {
            return range.clamp(rounded);
        }
        let (min, max) = (range.min.ceil(), range.max.floor());
        if min <= max { rounded.clamp(min, max) } else { min }
    }
}

/// Round to `precision` decimal places.
fn round_to(v: f64, precision: u8) -> f64 {
    let factor = 10f64.powi(i32::from(precision));
    (v * factor).round() / factor
}

/// The descriptor table of a doodle class, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DescriptorTable {
    entries: BTreeMap<String, ParameterDescriptor>,
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, descriptor: ParameterDescriptor) -> Self {
        self.insert(name, descriptor);
        self
    }

    pub fn insert(&mut self, name: &str, descriptor: ParameterDescriptor) {
        self.entries.insert(name.to_string(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterDescriptor)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the table in the descriptor schema consumed by shape authors.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// The current parameter values of a doodle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, ParamValue>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Numeric value of a parameter, or `0.0` if absent or non-numeric.
    pub fn get_f64(&self, name: &str) -> f64 {
        self.0.get(name).and_then(ParamValue::as_f64).unwrap_or(0.0)
    }

    /// Numeric value of a parameter, or `default` if absent or non-numeric.
    pub fn get_f64_or(&self, name: &str, default: f64) -> f64 {
        self.0.get(name).and_then(ParamValue::as_f64).unwrap_or(default)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(ParamValue::as_str)
    }

    /// Store a value, returning the previous one.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Option<ParamValue> {
        self.0.insert(name.to_string(), value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ParamValue)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn samples() -> Vec<ParamValue> {
        vec![
            ParamValue::Float(-1e9),
            ParamValue::Float(-3.3),
            ParamValue::Float(0.0),
            ParamValue::Float(0.449),
            ParamValue::Float(6.2831),
            ParamValue::Float(TAU + 0.1),
            ParamValue::Float(999.999),
            ParamValue::Float(f64::NAN),
            ParamValue::Int(7),
            ParamValue::Text("Medium".into()),
            ParamValue::Text("42".into()),
            ParamValue::Bool(true),
        ]
    }

    fn descriptors() -> Vec<ParameterDescriptor> {
        vec![
            ParameterDescriptor::simple(ValueType::Float).with_range(-500.0, 500.0),
            ParameterDescriptor::simple(ValueType::Float).with_range(0.5, 0.999).with_precision(2),
            ParameterDescriptor::simple(ValueType::Int).with_range(-280.0, -60.0),
            ParameterDescriptor::simple(ValueType::Mod).with_range(0.0, TAU).with_precision(4),
            ParameterDescriptor::derived(ValueType::String).with_list(["Large", "Medium", "Small"]),
            ParameterDescriptor::derived(ValueType::Int).with_list([1i64, 5, 10]),
            ParameterDescriptor::other(ValueType::Bool),
            ParameterDescriptor::other(ValueType::FreeText),
        ]
    }

    #[test]
    fn test_clamping_is_idempotent() {
        for descriptor in descriptors() {
            for value in samples() {
                let once = descriptor.constrain(&value);
                let twice = descriptor.constrain(&once);
                assert_eq!(once, twice, "{descriptor:?} not idempotent for {value:?}");
            }
        }
    }

    #[test]
    fn test_range_clamps_to_nearest_bound() {
        let d = ParameterDescriptor::simple(ValueType::Float).with_range(-500.0, 500.0);
        assert_eq!(d.constrain(&ParamValue::Float(900.0)), ParamValue::Float(500.0));
        assert_eq!(d.constrain(&ParamValue::Float(-900.0)), ParamValue::Float(-500.0));
        assert_eq!(d.constrain(&ParamValue::Float(12.25)), ParamValue::Float(12.0));

        let fine = d.clone().with_precision(1);
        assert_eq!(fine.constrain(&ParamValue::Float(12.5)), ParamValue::Float(12.5));
    }

    #[test]
    fn test_rounding_stays_inside_range() {
        let d = ParameterDescriptor::simple(ValueType::Float).with_range(0.5, 0.999).with_precision(2);
        assert_eq!(d.constrain(&ParamValue::Float(5.0)), ParamValue::Float(0.999));
        assert_eq!(d.constrain(&ParamValue::Float(0.998)), ParamValue::Float(0.999));
        assert_eq!(d.constrain(&ParamValue::Float(0.501)), ParamValue::Float(0.5));

        let whole = ParameterDescriptor::simple(ValueType::Float).with_range(0.4, 2.6);
        assert_eq!(whole.constrain(&ParamValue::Float(-3.0)), ParamValue::Float(0.4));
        assert_eq!(whole.constrain(&ParamValue::Float(2.55)), ParamValue::Float(2.6));

        let int = ParameterDescriptor::simple(ValueType::Int).with_range(-280.5, -60.5);
        assert_eq!(int.constrain(&ParamValue::Float(-300.0)), ParamValue::Int(-280));
        assert_eq!(int.constrain(&ParamValue::Float(-60.6)), ParamValue::Int(-61));
        assert_eq!(int.constrain(&ParamValue::Int(0)), ParamValue::Int(-61));

        let angle = ParameterDescriptor::simple(ValueType::Mod).with_range(0.005, 1.0).with_precision(2);
        for raw in [0.0, 0.004, 0.999, 1.0, 2.3] {
            let v = angle.constrain(&ParamValue::Float(raw)).as_f64().unwrap();
            assert!((0.005..1.0).contains(&v), "{raw} constrained to {v}");
        }
    }

    #[test]
    fn test_int_rounds() {
        let d = ParameterDescriptor::simple(ValueType::Int).with_range(-280.0, -60.0);
        assert_eq!(d.constrain(&ParamValue::Float(-100.6)), ParamValue::Int(-101));
        assert_eq!(d.constrain(&ParamValue::Int(0)), ParamValue::Int(-60));
    }

    #[test]
    fn test_mod_wraps_rotation() {
        let d = ParameterDescriptor::simple(ValueType::Mod).with_range(0.0, TAU).with_precision(6);
        let wrapped = d.constrain(&ParamValue::Float(TAU + 0.1)).as_f64().unwrap();
        assert!((wrapped - 0.1).abs() < 1e-9);
        let negative = d.constrain(&ParamValue::Float(-0.5)).as_f64().unwrap();
        assert!((negative - (TAU - 0.5)).abs() < 1e-6);
        assert_eq!(d.constrain(&ParamValue::Float(TAU)), ParamValue::Float(0.0));
    }

    #[test]
    fn test_list_snaps_to_nearest() {
        let numeric = ParameterDescriptor::derived(ValueType::Int).with_list([1i64, 5, 10]);
        assert_eq!(numeric.constrain(&ParamValue::Int(7)), ParamValue::Int(5));
        assert_eq!(numeric.constrain(&ParamValue::Int(9)), ParamValue::Int(10));

        let text = ParameterDescriptor::derived(ValueType::String).with_list(["Large", "Medium", "Small"]);
        assert_eq!(text.constrain(&"Small".into()), ParamValue::Text("Small".into()));
        assert_eq!(text.constrain(&"Huge".into()), ParamValue::Text("Large".into()));
    }

    #[test]
    fn test_precision_rounding() {
        let d = ParameterDescriptor::derived(ValueType::Float).with_range(0.0, 1.0).with_precision(2);
        assert_eq!(d.constrain(&ParamValue::Float(0.456)), ParamValue::Float(0.46));
    }

    #[test]
    fn test_descriptor_schema_json() {
        let table = DescriptorTable::new()
            .with("apexY", ParameterDescriptor::simple(ValueType::Int).with_range(-280.0, -60.0).with_animation(15.0))
            .with("pupilSize", ParameterDescriptor::derived(ValueType::String).with_list(["Large", "Small"]));
        let json: serde_json::Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();
        assert_eq!(json["apexY"]["kind"], "simple");
        assert_eq!(json["apexY"]["type"], "int");
        assert_eq!(json["apexY"]["range"], serde_json::json!([-280.0, -60.0]));
        assert_eq!(json["apexY"]["animate"], true);
        assert_eq!(json["pupilSize"]["list"], serde_json::json!(["Large", "Small"]));

        let back: DescriptorTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_parameters_accessors() {
        let mut params = Parameters::new();
        params.set("originX", ParamValue::Float(12.0));
        params.set("pupilSize", "Large".into());
        assert!((params.get_f64("originX") - 12.0).abs() < f64::EPSILON);
        assert!((params.get_f64_or("missing", 1.0) - 1.0).abs() < f64::EPSILON);
        assert_eq!(params.get_str("pupilSize"), Some("Large"));
        assert_eq!(params.len(), 2);
    }
}
