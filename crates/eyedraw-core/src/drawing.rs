//! Drawing document and state management.

use crate::camera::Camera;
use crate::doodle::{Doodle, DoodleId, DoodleRecord};
use crate::engine::{self, ChangeSource};
use crate::error::{Diagnostic, DiagnosticSink, EngineError, Result, log_diagnostic};
use crate::interaction::InteractionState;
use crate::notification::{Notification, NotificationKind};
use crate::parameter::ParamValue;
use crate::point::Point;
use crate::shapes::ShapeRegistry;
use crate::widget::{EditingKind, WidgetManager, WidgetState};
use std::collections::HashMap;
use std::fmt;

/// One diagram: its doodles in z-order, the view onto them, and the
/// per-doodle UI state.
///
/// Every change is queued as a [`Notification`] in an outbox that the
/// embedding application (and the synchronization broker) drains.
pub struct Drawing {
    /// Name under which linked diagrams address this one.
    pub id: String,
    registry: ShapeRegistry,
    doodles: HashMap<DoodleId, Doodle>,
    /// Z-order of doodles (back to front).
    z_order: Vec<DoodleId>,
    pub camera: Camera,
    pub widgets: WidgetManager,
    pub(crate) interaction: InteractionState,
    /// Class created by a click on empty canvas, if any.
    armed_class: Option<String>,
    outbox: Vec<Notification>,
    diagnostics: Option<DiagnosticSink>,
    needs_redraw: bool,
}

impl fmt::Debug for Drawing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drawing")
            .field("id", &self.id)
            .field("doodles", &self.z_order.len())
            .field("camera", &self.camera)
            .field("armed_class", &self.armed_class)
            .field("pending_notifications", &self.outbox.len())
            .finish()
    }
}

impl Drawing {
    /// Create an empty drawing. Queues `ready`.
    pub fn new(id: impl Into<String>, registry: ShapeRegistry) -> Self {
        let mut drawing = Self {
            id: id.into(),
            registry,
            doodles: HashMap::new(),
            z_order: Vec::new(),
            camera: Camera::new(),
            widgets: WidgetManager::new(),
            interaction: InteractionState::default(),
            armed_class: None,
            outbox: Vec::new(),
            diagnostics: None,
            needs_redraw: true,
        };
        drawing.notify(Notification::new(NotificationKind::Ready));
        drawing
    }

    /// A drawing with every built-in class available.
    pub fn with_builtin(id: impl Into<String>) -> Self {
        Self::new(id, ShapeRegistry::with_builtin())
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    /// Install the receiver for recoverable problems. Without one they go
    /// to the log as warnings.
    pub fn set_diagnostic_sink(&mut self, sink: impl FnMut(&Diagnostic) + 'static) {
        self.diagnostics = Some(Box::new(sink));
    }

    pub(crate) fn report(&mut self, diagnostic: &Diagnostic) {
        match self.diagnostics.as_mut() {
            Some(sink) => sink(diagnostic),
            None => log_diagnostic(diagnostic),
        }
    }

    pub(crate) fn notify(&mut self, notification: Notification) {
        log::trace!("{}: {}", self.id, notification.kind().name());
        self.outbox.push(notification);
    }

    pub(crate) fn notify_all(&mut self, notifications: impl IntoIterator<Item = Notification>) {
        for notification in notifications {
            self.notify(notification);
        }
    }

    /// Take every queued notification, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    pub fn has_pending_notifications(&self) -> bool {
        !self.outbox.is_empty()
    }

    pub fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Whether anything changed since the last call.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Arm a class so that the next click on empty canvas places one.
    pub fn arm(&mut self, class_name: &str) -> Result<()> {
        if !self.registry.contains(class_name) {
            return Err(EngineError::UnknownClass(class_name.to_string()));
        }
        self.armed_class = Some(class_name.to_string());
        Ok(())
    }

    pub fn disarm(&mut self) {
        self.armed_class = None;
    }

    pub fn armed_class(&self) -> Option<&str> {
        self.armed_class.as_deref()
    }

    /// Create a doodle of `class_name` on top of the others and select it.
    pub fn add_doodle(&mut self, class_name: &str) -> Result<DoodleId> {
        let doodle = self.registry.create(class_name)?;
        Ok(self.insert_doodle(doodle))
    }

    /// Add an existing doodle on top of the others and select it.
    pub fn insert_doodle(&mut self, doodle: Doodle) -> DoodleId {
        let id = doodle.id();
        let reference = doodle.reference();
        self.z_order.push(id);
        self.doodles.insert(id, doodle);
        self.notify(Notification::for_doodle(NotificationKind::DoodleAdded, reference));
        self.select(id);
        self.needs_redraw = true;
        id
    }

    pub fn delete_doodle(&mut self, id: DoodleId) -> Result<Doodle> {
        let doodle = self.doodles.remove(&id).ok_or(EngineError::DoodleNotFound(id))?;
        self.z_order.retain(|&other| other != id);
        self.widgets.remove(id);
        if self.interaction.target() == Some(id) {
            self.interaction.reset();
        }
        self.notify(Notification::for_doodle(NotificationKind::DoodleDeleted, doodle.reference()));
        self.needs_redraw = true;
        Ok(doodle)
    }

    /// Delete every selected doodle whose class allows it.
    pub fn delete_selected(&mut self) -> Vec<DoodleId> {
        let deletable: Vec<DoodleId> = self
            .widgets
            .selected()
            .filter(|id| self.doodles.get(id).is_some_and(|d| d.behaviour().deletable))
            .collect();
        for &id in &deletable {
            if let Err(err) = self.delete_doodle(id) {
                log::warn!("delete {id}: {err}");
            }
        }
        deletable
    }

    /// Remove every doodle without notifying.
    pub fn clear(&mut self) {
        self.doodles.clear();
        self.z_order.clear();
        self.widgets = WidgetManager::new();
        self.interaction.reset();
        self.needs_redraw = true;
    }

    pub fn doodle(&self, id: DoodleId) -> Option<&Doodle> {
        self.doodles.get(&id)
    }

    pub fn doodle_mut(&mut self, id: DoodleId) -> Option<&mut Doodle> {
        self.doodles.get_mut(&id)
    }

    /// Doodles in z-order (back to front).
    pub fn doodles_ordered(&self) -> impl Iterator<Item = &Doodle> {
        self.z_order.iter().filter_map(|id| self.doodles.get(id))
    }

    pub fn len(&self) -> usize {
        self.doodles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doodles.is_empty()
    }

    /// Bring a doodle to the front (topmost).
    pub fn bring_to_front(&mut self, id: DoodleId) {
        if self.doodles.contains_key(&id) {
            self.z_order.retain(|&other| other != id);
            self.z_order.push(id);
            self.needs_redraw = true;
        }
    }

    /// Send a doodle to the back (bottommost).
    pub fn send_to_back(&mut self, id: DoodleId) {
        if self.doodles.contains_key(&id) {
            self.z_order.retain(|&other| other != id);
            self.z_order.insert(0, id);
            self.needs_redraw = true;
        }
    }

    /// Bottommost doodle of a class.
    pub fn first_doodle_of_class(&self, class_name: &str) -> Option<&Doodle> {
        self.doodles_ordered().find(|d| d.class_name() == class_name)
    }

    /// Topmost doodle of a class.
    pub fn last_doodle_of_class(&self, class_name: &str) -> Option<&Doodle> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|id| self.doodles.get(id))
            .find(|d| d.class_name() == class_name)
    }

    /// Topmost doodle whose outline contains a canvas point.
    pub fn doodle_at(&self, point: Point) -> Option<DoodleId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|id| self.doodles.get(id).is_some_and(|d| d.contains(point)))
    }

    /// Select a single doodle, deselecting the rest.
    pub fn select(&mut self, id: DoodleId) {
        if !self.doodles.contains_key(&id) {
            return;
        }
        let already = self.widgets.is_selected(id);
        for dropped in self.widgets.select(id) {
            self.notify_widget(NotificationKind::DoodleDeselected, dropped);
        }
        if !already {
            self.notify_widget(NotificationKind::DoodleSelected, id);
        }
        self.needs_redraw = true;
    }

    pub fn deselect_all(&mut self) {
        for dropped in self.widgets.clear_selection() {
            self.notify_widget(NotificationKind::DoodleDeselected, dropped);
        }
        self.needs_redraw = true;
    }

    fn notify_widget(&mut self, kind: NotificationKind, id: DoodleId) {
        if let Some(reference) = self.doodles.get(&id).map(Doodle::reference) {
            self.notify(Notification::for_doodle(kind, reference));
        }
    }

    pub fn is_selected(&self, id: DoodleId) -> bool {
        self.widgets.is_selected(id)
    }

    pub fn widget_state(&self, id: DoodleId) -> WidgetState {
        self.widgets.state(id)
    }

    /// Flip a selected doodle in or out of handle editing.
    pub fn toggle_editing(&mut self, id: DoodleId) -> bool {
        let editing = self.widgets.toggle_editing(id, EditingKind::Handles);
        self.needs_redraw = true;
        editing
    }

    /// Set a parameter on one doodle and queue the resulting notifications.
    pub fn set_parameter(&mut self, id: DoodleId, name: &str, value: &ParamValue, source: ChangeSource) -> Result<()> {
        let doodle = self.doodles.get_mut(&id).ok_or(EngineError::DoodleNotFound(id))?;
        let notifications = engine::set_parameter(doodle, name, value, source)?;
        self.notify_all(notifications);
        self.needs_redraw = true;
        Ok(())
    }

    /// Advance animations by one frame. Returns whether any are still running.
    pub fn tick(&mut self) -> bool {
        let mut finished = Vec::new();
        let mut running = false;
        for id in &self.z_order {
            let Some(doodle) = self.doodles.get_mut(id) else {
                continue;
            };
            if doodle.is_animating() {
                finished.extend(engine::step_animations(doodle));
                self.needs_redraw = true;
                running |= doodle.is_animating();
            }
        }
        self.notify_all(finished);
        running
    }

    /// Persisted records in z-order.
    pub fn to_records(&self) -> Vec<DoodleRecord> {
        self.doodles_ordered().map(Doodle::to_record).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_records())?)
    }

    /// Replace the content with saved records.
    ///
    /// Records of unknown classes are reported and skipped. Queues
    /// `doodlesLoaded`. Returns the number of doodles loaded.
    pub fn load_records(&mut self, records: &[DoodleRecord]) -> usize {
        self.clear();
        let mut reports = Vec::new();
        for record in records {
            let Some(class) = self.registry.get(&record.class_name) else {
                reports.push(Diagnostic::new(
                    record.class_name.as_str(),
                    "load",
                    "unknown doodle class, record skipped",
                ));
                continue;
            };
            let doodle = Doodle::from_record(class, record, &mut |d| reports.push(d));
            self.z_order.push(doodle.id());
            self.doodles.insert(doodle.id(), doodle);
        }
        for report in &reports {
            self.report(report);
        }
        log::info!("{}: loaded {} doodles", self.id, self.doodles.len());
        self.notify(Notification::new(NotificationKind::DoodlesLoaded));
        self.doodles.len()
    }

    /// Parse and load a JSON array of records.
    pub fn load_json(&mut self, json: &str) -> Result<usize> {
        let records: Vec<DoodleRecord> = serde_json::from_str(json)?;
        Ok(self.load_records(&records))
    }
}
