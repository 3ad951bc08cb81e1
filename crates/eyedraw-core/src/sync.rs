//! Synchronization between linked diagrams.
//!
//! A [`SyncBroker`] listens to the notifications of one master drawing and
//! mirrors `parameterChanged` into the first doodle of each configured
//! class in each sibling drawing. Numeric values move by the master's
//! increment; other values are copied. Drawings are addressed by name
//! through a [`DiagramRegistry`] handed to the broker.
//!
//! Loops between mutually linked drawings are cut by comparing the value a
//! mirror would write with the sibling's current value and skipping equal
//! writes. The registry's [`SyncLedger`] remembers which pair of values each
//! link last agreed on, so a duplicate or echoed notification resolves to
//! the value already applied instead of applying its increment again.

use crate::doodle::DoodleId;
use crate::drawing::Drawing;
use crate::engine::ChangeSource;
use crate::error::{Diagnostic, EngineError, Result};
use crate::notification::{Notification, NotificationKind};
use crate::parameter::ParamValue;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Rounds of draining and routing before [`pump`] gives up.
pub const MAX_PUMP_ROUNDS: usize = 32;

/// Parameters mirrored from a source class to a target class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterMapping {
    pub parameters: Vec<String>,
}

/// `{sibling: {sourceClass: {targetClass: {parameters: [...]}}}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncConfig {
    siblings: BTreeMap<String, BTreeMap<String, BTreeMap<String, ParameterMapping>>>,
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builder-style: mirror `parameters` of `source_class` into the first
    /// `target_class` doodle of `sibling`.
    pub fn link(mut self, sibling: &str, source_class: &str, target_class: &str, parameters: &[&str]) -> Self {
        let mapping = self
            .siblings
            .entry(sibling.to_string())
            .or_default()
            .entry(source_class.to_string())
            .or_default()
            .entry(target_class.to_string())
            .or_default();
        for parameter in parameters {
            if !mapping.parameters.iter().any(|p| p == parameter) {
                mapping.parameters.push((*parameter).to_string());
            }
        }
        self
    }

    pub fn siblings(&self) -> impl Iterator<Item = &str> {
        self.siblings.keys().map(String::as_str)
    }

    /// Target classes of `sibling` that mirror `parameter` of `source_class`.
    pub fn targets<'a>(
        &'a self,
        sibling: &str,
        source_class: &str,
        parameter: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.siblings
            .get(sibling)
            .and_then(|classes| classes.get(source_class))
            .into_iter()
            .flat_map(|targets| targets.iter())
            .filter(move |(_, mapping)| mapping.parameters.iter().any(|p| p == parameter))
            .map(|(target, _)| target.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }
}

/// One end of a link: a doodle in a named drawing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct LinkEnd {
    drawing: String,
    doodle: DoodleId,
}

impl LinkEnd {
    fn new(drawing: &str, doodle: DoodleId) -> Self {
        Self {
            drawing: drawing.to_string(),
            doodle,
        }
    }
}

/// Last agreed value pair per linked parameter, independent of direction.
#[derive(Debug, Clone, Default)]
pub struct SyncLedger {
    entries: BTreeMap<(LinkEnd, LinkEnd, String), (ParamValue, ParamValue)>,
}

impl SyncLedger {
    fn key(a: LinkEnd, b: LinkEnd, parameter: &str) -> ((LinkEnd, LinkEnd, String), bool) {
        if a <= b {
            ((a, b, parameter.to_string()), false)
        } else {
            ((b, a, parameter.to_string()), true)
        }
    }

    fn record(&mut self, from: LinkEnd, from_value: ParamValue, to: LinkEnd, to_value: ParamValue, parameter: &str) {
        let (key, swapped) = Self::key(from, to, parameter);
        let pair = if swapped { (to_value, from_value) } else { (from_value, to_value) };
        self.entries.insert(key, pair);
    }

    /// The value `to` agreed with when `from` last held `value`.
    fn counterpart(&self, from: LinkEnd, to: LinkEnd, parameter: &str, value: &ParamValue) -> Option<ParamValue> {
        let (key, swapped) = Self::key(from, to, parameter);
        let (first, second) = self.entries.get(&key)?;
        let (from_value, to_value) = if swapped { (second, first) } else { (first, second) };
        (from_value == value).then(|| to_value.clone())
    }

    /// Drop every entry with an end matching `is_gone`.
    fn forget(&mut self, is_gone: impl Fn(&LinkEnd) -> bool) {
        self.entries.retain(|(a, b, _), _| !is_gone(a) && !is_gone(b));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Named drawings that can be linked, plus the link ledger.
#[derive(Debug, Default)]
pub struct DiagramRegistry {
    drawings: BTreeMap<String, Drawing>,
    ledger: SyncLedger,
}

/// Registry shared by the embedding application and its brokers.
pub type SharedRegistry = Rc<RefCell<DiagramRegistry>>;

impl DiagramRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRegistry {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Register a drawing under its id, returning any drawing it replaces.
    pub fn insert(&mut self, drawing: Drawing) -> Option<Drawing> {
        self.drawings.insert(drawing.id.clone(), drawing)
    }

    /// Unregister a drawing and forget its links.
    pub fn remove(&mut self, id: &str) -> Option<Drawing> {
        self.ledger.forget(|end| end.drawing == id);
        self.drawings.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Drawing> {
        self.drawings.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Drawing> {
        self.drawings.get_mut(id)
    }

    /// Set a parameter on a doodle of a named drawing.
    pub fn set_parameter(
        &mut self,
        drawing: &str,
        doodle: DoodleId,
        name: &str,
        value: &ParamValue,
        source: ChangeSource,
    ) -> Result<()> {
        self.drawings
            .get_mut(drawing)
            .ok_or_else(|| EngineError::DrawingNotFound(drawing.to_string()))?
            .set_parameter(doodle, name, value, source)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.drawings.keys().map(String::as_str)
    }

    pub fn ledger(&self) -> &SyncLedger {
        &self.ledger
    }

    /// Drain every drawing's outbox, tagged with the drawing's id.
    ///
    /// Links of deleted doodles are dropped from the ledger on the way.
    pub fn drain_notifications(&mut self) -> Vec<(String, Notification)> {
        let drained: Vec<(String, Notification)> = self
            .drawings
            .iter_mut()
            .flat_map(|(id, drawing)| drawing.drain_notifications().into_iter().map(move |n| (id.clone(), n)))
            .collect();
        for (drawing, notification) in &drained {
            if let (true, Some(doodle)) = (notification.is(NotificationKind::DoodleDeleted), notification.doodle()) {
                self.ledger.forget(|end| end.drawing == *drawing && end.doodle == doodle.id);
            }
        }
        drained
    }

    /// Mirror one change into the first `target_class` doodle of `sibling`.
    /// Returns whether the sibling was written.
    #[allow(clippy::too_many_arguments)]
    fn mirror(
        &mut self,
        master: &str,
        source: DoodleId,
        sibling: &str,
        target_class: &str,
        parameter: &str,
        value: &ParamValue,
        old_value: &ParamValue,
    ) -> bool {
        let Some(slave) = self.drawings.get_mut(sibling) else {
            log::debug!("sync {master} -> {sibling}: no such drawing");
            return false;
        };
        let Some(target) = slave.first_doodle_of_class(target_class) else {
            return false;
        };
        let target_id = target.id();
        let Some(descriptor) = target.descriptor(parameter) else {
            return false;
        };
        let current = target.parameter(parameter).cloned();

        let from = LinkEnd::new(master, source);
        let to = LinkEnd::new(sibling, target_id);
        let raw = match self.ledger.counterpart(from.clone(), to.clone(), parameter, value) {
            Some(agreed) => agreed,
            None => match (current.as_ref().and_then(ParamValue::as_f64), value.as_f64(), old_value.as_f64()) {
                (Some(current), Some(new), Some(old)) if value.is_numeric() => ParamValue::Float(current + new - old),
                _ => value.clone(),
            },
        };
        let next = descriptor.constrain(&raw);
        if let Some(current) = current.filter(|current| *current == next) {
            // The sibling already agrees, possibly because its range absorbed
            // the increment; later deltas start from this pair.
            self.ledger.record(from, value.clone(), to, current, parameter);
            return false;
        }

        log::debug!("sync {master} -> {sibling}: {target_class}.{parameter} = {next}");
        if let Err(err) = slave.set_parameter(target_id, parameter, &next, ChangeSource::Sync) {
            slave.report(&Diagnostic::new(target_class, "sync", err.to_string()));
            return false;
        }
        let applied = slave
            .doodle(target_id)
            .and_then(|d| d.parameter(parameter))
            .cloned()
            .unwrap_or(next);
        self.ledger.record(from, value.clone(), to, applied, parameter);
        true
    }
}

/// Routes one master drawing's notifications into its siblings.
#[derive(Debug)]
pub struct SyncBroker {
    master: String,
    config: SyncConfig,
    registry: SharedRegistry,
}

impl SyncBroker {
    pub fn new(master: impl Into<String>, config: SyncConfig, registry: SharedRegistry) -> Self {
        Self {
            master: master.into(),
            config,
            registry,
        }
    }

    pub fn master(&self) -> &str {
        &self.master
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Notification names the broker listens to.
    pub fn subscriptions(&self) -> &'static [NotificationKind] {
        &NotificationKind::ALL
    }

    /// React to one notification from the master drawing.
    ///
    /// Only `parameterChanged` causes writes. Returns the number of
    /// sibling doodles written.
    pub fn handle(&self, notification: &Notification) -> usize {
        if !notification.is(NotificationKind::ParameterChanged) {
            log::trace!("sync {}: {}", self.master, notification.kind().name());
            return 0;
        }
        let payload = &notification.object;
        let (Some(doodle), Some(parameter), Some(value), Some(old_value)) =
            (&payload.doodle, &payload.parameter, &payload.value, &payload.old_value)
        else {
            return 0;
        };

        let mut registry = self.registry.borrow_mut();
        let mut written = 0;
        for sibling in self.config.siblings() {
            if sibling == self.master {
                continue;
            }
            for target_class in self.config.targets(sibling, &doodle.class_name, parameter) {
                if registry.mirror(&self.master, doodle.id, sibling, target_class, parameter, value, old_value) {
                    written += 1;
                }
            }
        }
        written
    }
}

/// Drain every drawing and route the notifications through the brokers of
/// their drawings until no drawing has anything left to say.
///
/// Returns everything drained, in order, for the embedding application.
pub fn pump(registry: &SharedRegistry, brokers: &[SyncBroker]) -> Vec<(String, Notification)> {
    let mut delivered = Vec::new();
    for _ in 0..MAX_PUMP_ROUNDS {
        let batch = registry.borrow_mut().drain_notifications();
        if batch.is_empty() {
            return delivered;
        }
        for (source, notification) in &batch {
            for broker in brokers.iter().filter(|b| b.master == *source) {
                broker.handle(notification);
            }
        }
        delivered.extend(batch);
    }
    log::warn!("sync did not settle after {MAX_PUMP_ROUNDS} rounds");
    delivered
}
