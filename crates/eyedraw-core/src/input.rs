//! Pointer and keyboard input, in screen coordinates.

use crate::point::Point;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
}

/// Keys the drawing responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Escape,
    Delete,
    Backspace,
}

impl Key {
    /// Parse a DOM-style key name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" | "Left" => Some(Self::ArrowLeft),
            "ArrowRight" | "Right" => Some(Self::ArrowRight),
            "ArrowUp" | "Up" => Some(Self::ArrowUp),
            "ArrowDown" | "Down" => Some(Self::ArrowDown),
            "Escape" | "Esc" => Some(Self::Escape),
            "Delete" => Some(Self::Delete),
            "Backspace" => Some(Self::Backspace),
            _ => None,
        }
    }

    /// Unit nudge direction for arrow keys.
    pub fn arrow_direction(self) -> Option<(f64, f64)> {
        match self {
            Self::ArrowLeft => Some((-1.0, 0.0)),
            Self::ArrowRight => Some((1.0, 0.0)),
            Self::ArrowUp => Some((0.0, -1.0)),
            Self::ArrowDown => Some((0.0, 1.0)),
            _ => None,
        }
    }
}

/// Double-click detection constants.
pub const DOUBLE_CLICK_TIME_MS: u128 = 500;
pub const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Tracks pointer state between events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Current pointer position in screen coordinates.
    pub pointer_position: Point,
    /// Whether the primary button is held.
    pub is_dragging: bool,
    /// Start position of current drag operation.
    pub drag_start: Option<Point>,
    last_click_time: Option<Instant>,
    last_click_position: Option<Point>,
    double_click_detected: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Down { position, button } => {
                self.pointer_position = position;
                if button != MouseButton::Left {
                    return;
                }
                self.double_click_detected = false;
                let now = Instant::now();
                match (self.last_click_time, self.last_click_position) {
                    (Some(last_time), Some(last_pos))
                        if now.duration_since(last_time).as_millis() < DOUBLE_CLICK_TIME_MS
                            && position.distance_to(last_pos) < DOUBLE_CLICK_DISTANCE =>
                    {
                        self.double_click_detected = true;
                        // A third click starts a new pair.
                        self.last_click_time = None;
                        self.last_click_position = None;
                    }
                    _ => {
                        self.last_click_time = Some(now);
                        self.last_click_position = Some(position);
                    }
                }
                self.is_dragging = true;
                self.drag_start = Some(position);
            }
            PointerEvent::Up { position, button } => {
                self.pointer_position = position;
                if button == MouseButton::Left {
                    self.is_dragging = false;
                    self.drag_start = None;
                }
            }
            PointerEvent::Move { position } => {
                self.pointer_position = position;
            }
        }
    }

    /// Whether the last button press completed a double-click.
    pub fn is_double_click(&self) -> bool {
        self.double_click_detected
    }
}
