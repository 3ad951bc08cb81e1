//! Pointer-interaction state machine.
//!
//! Pointer events arrive in screen coordinates. The camera maps them onto
//! the canvas plane, the doodle's inverse transform maps them into local
//! space where needed, and the active mode decides which parameters move.
//! Parameter changes go through the constraint engine, so every drag step
//! emits `parameterChanged` for what it actually changed.

use crate::doodle::{DoodleId, Squiggle};
use crate::drawing::Drawing;
use crate::engine::{self, ChangeSource};
use crate::error::{EngineError, Result};
use crate::input::{InputState, Key, MouseButton, PointerEvent};
use crate::notification::{Notification, NotificationKind};
use crate::parameter::{ParamValue, Parameters, names};
use crate::point::{Point, normalize_angle};
use crate::widget::{HANDLE_HIT_RADIUS, Handle, InteractionMode};
use std::f64::consts::{PI, TAU};

/// Canvas units an arrow key moves the selection.
pub const NUDGE_DISTANCE: f64 = 10.0;

/// Drag state between pointer-down and pointer-up.
#[derive(Debug, Clone, Default)]
pub(crate) struct InteractionState {
    mode: InteractionMode,
    target: Option<DoodleId>,
    /// Squiggle point edited in `Handles` mode.
    handle_index: usize,
    /// Canvas point where the drag started.
    start: Point,
    /// Doodle state at pointer-down, restored by Escape.
    initial_params: Parameters,
    initial_squiggles: Vec<Squiggle>,
    moved: bool,
    input: InputState,
}

impl InteractionState {
    pub(crate) fn target(&self) -> Option<DoodleId> {
        self.target
    }

    /// End any drag, keeping click history for double-click detection.
    pub(crate) fn reset(&mut self) {
        let input = std::mem::take(&mut self.input);
        *self = Self {
            input,
            ..Self::default()
        };
    }
}

impl Drawing {
    /// Current mode of the state machine.
    pub fn mode(&self) -> InteractionMode {
        self.interaction.mode
    }

    /// Doodle being dragged or clicked, if any.
    pub fn interaction_target(&self) -> Option<DoodleId> {
        self.interaction.target
    }

    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        self.interaction.input.handle_pointer_event(event);
        match *event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => self.on_pointer_down(position),
            PointerEvent::Up {
                button: MouseButton::Left,
                ..
            } => self.on_pointer_up(),
            PointerEvent::Move { position } => self.on_pointer_move(position),
            _ => {}
        }
    }

    pub fn pointer_down(&mut self, screen: Point) {
        self.handle_pointer_event(&PointerEvent::Down {
            position: screen,
            button: MouseButton::Left,
        });
    }

    pub fn pointer_move(&mut self, screen: Point) {
        self.handle_pointer_event(&PointerEvent::Move { position: screen });
    }

    pub fn pointer_up(&mut self, screen: Point) {
        self.handle_pointer_event(&PointerEvent::Up {
            position: screen,
            button: MouseButton::Left,
        });
    }

    fn on_pointer_down(&mut self, screen: Point) {
        let canvas = self.camera.screen_to_canvas(screen);
        self.interaction.reset();

        if self.interaction.input.is_double_click() {
            if let Some(id) = self.doodle_at(canvas).filter(|&id| self.is_selected(id)) {
                let editing = self.toggle_editing(id);
                log::debug!("{}: handle editing {editing} for {id}", self.id);
                return;
            }
        }

        let tolerance = self.camera.screen_distance(HANDLE_HIT_RADIUS);
        if let Some((id, handle)) = self.handle_at(canvas, tolerance) {
            self.begin_drag(id, handle.mode, handle.index, canvas);
            return;
        }

        if let Some(id) = self.doodle_at(canvas) {
            let editing = self.widgets.is_editing_doodle(id);
            self.select(id);
            let behaviour = match self.doodle(id) {
                Some(doodle) => doodle.behaviour(),
                None => return,
            };
            if behaviour.drawable && editing {
                self.begin_drag(id, InteractionMode::Draw, 0, canvas);
                self.start_squiggle(id, canvas);
            } else if behaviour.moveable {
                self.begin_drag(id, InteractionMode::Move, 0, canvas);
            } else {
                self.begin_drag(id, InteractionMode::Select, 0, canvas);
            }
            return;
        }

        if let Some(class_name) = self.armed_class().map(str::to_string) {
            match self.place_doodle(&class_name, canvas) {
                Ok(id) => {
                    self.disarm();
                    self.begin_drag(id, InteractionMode::Draw, 0, canvas);
                    if self.doodle(id).is_some_and(|d| d.behaviour().drawable) {
                        self.start_squiggle(id, canvas);
                    }
                }
                Err(err) => log::warn!("{}: could not place {class_name}: {err}", self.id),
            }
            return;
        }

        self.deselect_all();
    }

    fn on_pointer_move(&mut self, screen: Point) {
        if !self.interaction.input.is_dragging {
            return;
        }
        let Some(id) = self.interaction.target else {
            return;
        };
        let canvas = self.camera.screen_to_canvas(screen);
        match self.drag_step(id, canvas) {
            Ok(true) => {
                self.interaction.moved = true;
                self.request_redraw();
            }
            Ok(false) => {}
            Err(err) => log::warn!("{}: drag step skipped: {err}", self.id),
        }
    }

    fn on_pointer_up(&mut self) {
        if let (Some(id), true) = (self.interaction.target, self.interaction.moved) {
            if let Some(reference) = self.doodle(id).map(|d| d.reference()) {
                self.notify(Notification::for_doodle(NotificationKind::MouseDragged, reference));
            }
        }
        self.interaction.reset();
    }

    /// Respond to a key press. Returns whether the key was used.
    pub fn key_down(&mut self, key: Key) -> bool {
        if let Some((dx, dy)) = key.arrow_direction() {
            self.nudge_selection(dx * NUDGE_DISTANCE, dy * NUDGE_DISTANCE);
            return true;
        }
        match key {
            Key::Escape => {
                if self.interaction.target.is_some() && self.interaction.mode != InteractionMode::None {
                    self.cancel_drag();
                } else if self.widgets.focused().is_some() {
                    self.widgets.exit_editing();
                    self.request_redraw();
                } else {
                    return false;
                }
                true
            }
            Key::Delete | Key::Backspace => !self.delete_selected().is_empty(),
            _ => false,
        }
    }

    /// Topmost visible handle of a selected doodle under a canvas point.
    fn handle_at(&self, canvas: Point, tolerance: f64) -> Option<(DoodleId, Handle)> {
        let selected: Vec<DoodleId> = self.widgets.selected().collect();
        self.doodles_ordered()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .filter(|doodle| selected.contains(&doodle.id()))
            .find_map(|doodle| {
                let editing = self.widgets.is_editing_doodle(doodle.id());
                doodle
                    .handles(editing)
                    .into_iter()
                    .find(|h| h.visible && h.hit_test(canvas, tolerance))
                    .map(|h| (doodle.id(), h))
            })
    }

    fn begin_drag(&mut self, id: DoodleId, mode: InteractionMode, handle_index: usize, canvas: Point) {
        let (params, squiggles) = match self.doodle(id) {
            Some(doodle) => (doodle.parameters().clone(), doodle.squiggles().to_vec()),
            None => return,
        };
        let state = &mut self.interaction;
        state.mode = mode;
        state.target = Some(id);
        state.handle_index = handle_index;
        state.start = canvas;
        state.initial_params = params;
        state.initial_squiggles = squiggles;
        state.moved = false;
        log::debug!("{}: {mode:?} on {id}", self.id);
    }

    /// Create a doodle of the armed class centred on a canvas point.
    fn place_doodle(&mut self, class_name: &str, canvas: Point) -> Result<DoodleId> {
        let mut doodle = self.registry().create(class_name)?;
        if doodle.behaviour().moveable {
            engine::set_parameter(&mut doodle, names::ORIGIN_X, &canvas.x.into(), ChangeSource::Pointer)?;
            engine::set_parameter(&mut doodle, names::ORIGIN_Y, &canvas.y.into(), ChangeSource::Pointer)?;
        }
        Ok(self.insert_doodle(doodle))
    }

    fn start_squiggle(&mut self, id: DoodleId, canvas: Point) {
        let Some(doodle) = self.doodle_mut(id) else {
            return;
        };
        match doodle.to_local(canvas) {
            Ok(local) => {
                let mut squiggle = Squiggle::new(false);
                squiggle.push(local);
                doodle.squiggles.push(squiggle);
                self.request_redraw();
            }
            Err(err) => log::warn!("{}: cannot draw on {id}: {err}", self.id),
        }
    }

    /// Apply one pointer move in the active mode. Returns whether anything changed.
    fn drag_step(&mut self, id: DoodleId, canvas: Point) -> Result<bool> {
        let mode = self.interaction.mode;
        let start = self.interaction.start;
        let initial = &self.interaction.initial_params;
        let doodle = self.doodle(id).ok_or(EngineError::DoodleNotFound(id))?;
        let origin = doodle.origin();

        let changes: Vec<(&str, ParamValue)> = match mode {
            InteractionMode::Move => {
                let delta = canvas - start;
                vec![
                    (names::ORIGIN_X, (initial.get_f64(names::ORIGIN_X) + delta.x).into()),
                    (names::ORIGIN_Y, (initial.get_f64(names::ORIGIN_Y) + delta.y).into()),
                ]
            }
            InteractionMode::Scale => {
                let from = start - origin;
                let to = canvas - origin;
                let initial_x = initial.get_f64_or(names::SCALE_X, 1.0);
                let initial_y = initial.get_f64_or(names::SCALE_Y, 1.0);
                if doodle.behaviour().squeezable {
                    let mut changes = Vec::new();
                    if from.x.abs() > f64::EPSILON {
                        changes.push((names::SCALE_X, (initial_x * (to.x / from.x).abs()).into()));
                    }
                    if from.y.abs() > f64::EPSILON {
                        changes.push((names::SCALE_Y, (initial_y * (to.y / from.y).abs()).into()));
                    }
                    changes
                } else if from.length() > f64::EPSILON {
                    let ratio = to.length() / from.length();
                    vec![
                        (names::SCALE_X, (initial_x * ratio).into()),
                        (names::SCALE_Y, (initial_y * ratio).into()),
                    ]
                } else {
                    Vec::new()
                }
            }
            InteractionMode::Rotate => {
                let swept = (start - origin).clockwise_angle_to(canvas - origin);
                let rotation = normalize_angle(initial.get_f64(names::ROTATION) + swept);
                vec![(names::ROTATION, rotation.into())]
            }
            InteractionMode::Arc => {
                let direction = doodle.to_local(canvas)?.direction();
                let half = if direction > PI { TAU - direction } else { direction };
                vec![(names::ARC, normalize_angle(2.0 * half).into())]
            }
            InteractionMode::Size => {
                let local = doodle.to_local(canvas)?;
                vec![
                    (names::WIDTH, (2.0 * local.x.abs()).into()),
                    (names::HEIGHT, (2.0 * local.y.abs()).into()),
                ]
            }
            InteractionMode::Apex => {
                let local = doodle.to_local(canvas)?;
                let apex = match doodle.class().vector_range(mode, 0) {
                    Some(range) => range.constrain(local),
                    None => local,
                };
                vec![(names::APEX_X, apex.x.into()), (names::APEX_Y, apex.y.into())]
            }
            InteractionMode::Handles | InteractionMode::Draw => {
                let local = doodle.to_local(canvas)?;
                return Ok(self.edit_squiggle(id, mode, local));
            }
            InteractionMode::None | InteractionMode::Select => return Ok(false),
        };

        let doodle = self.doodle_mut(id).ok_or(EngineError::DoodleNotFound(id))?;
        let mut notifications = Vec::new();
        for (name, value) in changes {
            if doodle.descriptor(name).is_none() {
                continue;
            }
            notifications.extend(engine::set_parameter(doodle, name, &value, ChangeSource::Pointer)?);
        }
        let changed = !notifications.is_empty();
        self.notify_all(notifications);
        Ok(changed)
    }

    fn edit_squiggle(&mut self, id: DoodleId, mode: InteractionMode, local: Point) -> bool {
        let index = self.interaction.handle_index;
        let Some(doodle) = self.doodle_mut(id) else {
            return false;
        };
        match mode {
            InteractionMode::Handles => {
                let point = match doodle.class().vector_range(mode, index) {
                    Some(range) => range.constrain(local),
                    None => local,
                };
                let Some(slot) = doodle.squiggles.first_mut().and_then(|s| s.points.get_mut(index)) else {
                    return false;
                };
                if *slot == point {
                    return false;
                }
                *slot = point;
                true
            }
            InteractionMode::Draw if doodle.behaviour().drawable => {
                match doodle.squiggles.last_mut() {
                    Some(squiggle) => squiggle.push(local),
                    None => {
                        let mut squiggle = Squiggle::new(false);
                        squiggle.push(local);
                        doodle.squiggles.push(squiggle);
                    }
                }
                true
            }
            _ => false,
        }
    }

    /// Restore the doodle to its state at pointer-down.
    fn cancel_drag(&mut self) {
        let Some(id) = self.interaction.target else {
            return;
        };
        let params = std::mem::take(&mut self.interaction.initial_params);
        let squiggles = std::mem::take(&mut self.interaction.initial_squiggles);
        self.interaction.reset();

        let Some(doodle) = self.doodle_mut(id) else {
            return;
        };
        let mut notifications = Vec::new();
        for (name, value) in params.iter() {
            if let Some((old, new)) = doodle.assign(name, value) {
                notifications.push(Notification::parameter_changed(doodle.reference(), name, new, old));
            }
        }
        doodle.squiggles = squiggles;
        doodle.animations.clear();
        doodle.update_transform();
        log::debug!("{}: drag on {id} cancelled", self.id);
        self.notify_all(notifications);
        self.request_redraw();
    }

    fn nudge_selection(&mut self, dx: f64, dy: f64) {
        let selected: Vec<DoodleId> = self.widgets.selected().collect();
        for id in selected {
            let Some(doodle) = self.doodle(id) else {
                continue;
            };
            if !doodle.behaviour().moveable {
                continue;
            }
            let origin = doodle.origin();
            for (name, value) in [(names::ORIGIN_X, origin.x + dx), (names::ORIGIN_Y, origin.y + dy)] {
                if let Err(err) = self.set_parameter(id, name, &value.into(), ChangeSource::Pointer) {
                    log::warn!("{}: nudge failed: {err}", self.id);
                }
            }
        }
    }
}
