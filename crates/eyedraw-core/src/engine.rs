//! Constraint engine: the single entry point for changing a parameter.
//!
//! Setting a parameter constrains the raw value against its descriptor,
//! stores it, asks the doodle's class once for the values of dependent
//! parameters, constrains and stores those too, and rebuilds the
//! transform. Dependents are not fed back into the class: one pass only.

use crate::doodle::{Animation, Doodle};
use crate::error::Result;
use crate::notification::Notification;
use crate::parameter::ParamValue;

/// Where a parameter change comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// An explicit user control (a button, a field); may animate.
    Control,
    /// A pointer drag; applied at once since the pointer already moves smoothly.
    Pointer,
    /// Mirrored from a linked diagram.
    Sync,
}

impl ChangeSource {
    fn animates(self) -> bool {
        self == Self::Control
    }
}

/// Set one parameter and propagate to its dependents.
///
/// Returns a `parameterChanged` notification for every stored value that
/// actually changed. Animated parameters are only scheduled here; their
/// notification follows from [`step_animations`] when they arrive.
pub fn set_parameter(
    doodle: &mut Doodle,
    name: &str,
    raw: &ParamValue,
    source: ChangeSource,
) -> Result<Vec<Notification>> {
    let descriptor = doodle.descriptor(name).cloned().ok_or_else(|| doodle.unknown_parameter(name))?;
    let value = descriptor.constrain(raw);
    log::debug!("{}.{name} <- {value} ({source:?})", doodle.class_name());

    let mut notifications = Vec::new();
    apply(doodle, name, &value, source, &mut notifications);

    let dependents = doodle.class().dependent_values(name, &value, doodle.parameters());
    for (dependent, dependent_value) in dependents {
        if dependent == name {
            continue;
        }
        let Some(descriptor) = doodle.descriptor(&dependent) else {
            log::warn!("{}: dependent {dependent} has no descriptor", doodle.class_name());
            continue;
        };
        let constrained = descriptor.constrain(&dependent_value);
        apply(doodle, &dependent, &constrained, source, &mut notifications);
    }

    doodle.update_transform();
    Ok(notifications)
}

fn apply(doodle: &mut Doodle, name: &str, value: &ParamValue, source: ChangeSource, out: &mut Vec<Notification>) {
    let animated = doodle.descriptor(name).is_some_and(|d| d.animate && d.delta > 0.0);
    if source.animates() && animated && value.is_numeric() {
        schedule_animation(doodle, name, value.clone());
        return;
    }
    // A direct write supersedes any running animation.
    doodle.animations.remove(name);
    if let Some((old, new)) = doodle.assign(name, value) {
        out.push(Notification::parameter_changed(doodle.reference(), name, new, old));
    }
}

fn schedule_animation(doodle: &mut Doodle, name: &str, target: ParamValue) {
    if doodle.parameter(name) == Some(&target) {
        doodle.animations.remove(name);
        return;
    }
    let old_value = match doodle.animations.get(name) {
        Some(running) => running.old_value.clone(),
        None => doodle.parameter(name).cloned().unwrap_or_else(|| target.clone()),
    };
    doodle.animations.insert(name.to_string(), Animation { target, old_value });
}

/// Advance every running animation of a doodle by one frame.
///
/// Each parameter moves by its descriptor's `delta` toward the target and
/// lands on it once within one step. Completed animations report a single
/// `parameterChanged` from the pre-animation value to the target.
pub fn step_animations(doodle: &mut Doodle) -> Vec<Notification> {
    let mut notifications = Vec::new();
    let names: Vec<String> = doodle.animations.keys().cloned().collect();
    for name in names {
        let Some(animation) = doodle.animations.get(&name).cloned() else {
            continue;
        };
        let delta = doodle.descriptor(&name).map(|d| d.delta).unwrap_or(0.0);
        let (Some(current), Some(target)) = (doodle.parameter(&name).and_then(ParamValue::as_f64), animation.target.as_f64())
        else {
            doodle.animations.remove(&name);
            continue;
        };

        if delta <= 0.0 || (target - current).abs() <= delta {
            doodle.animations.remove(&name);
            doodle.assign(&name, &animation.target);
            if animation.old_value != animation.target {
                notifications.push(Notification::parameter_changed(
                    doodle.reference(),
                    &name,
                    animation.target,
                    animation.old_value,
                ));
            }
        } else {
            let next = current + delta * (target - current).signum();
            doodle.assign(&name, &ParamValue::Float(next));
        }
    }
    doodle.update_transform();
    notifications
}

/// Dependent values that would still change if `name` were set again to
/// its current value. Empty when the doodle is at the single-pass fixed point.
pub fn pending_dependents(doodle: &Doodle, name: &str) -> Vec<(String, ParamValue)> {
    let Some(value) = doodle.parameter(name) else {
        return Vec::new();
    };
    doodle
        .class()
        .dependent_values(name, value, doodle.parameters())
        .into_iter()
        .filter_map(|(dependent, raw)| {
            let constrained = doodle.descriptor(&dependent)?.constrain(&raw);
            (doodle.parameter(&dependent) != Some(&constrained)).then_some((dependent, constrained))
        })
        .collect()
}
