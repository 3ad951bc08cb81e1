//! Widget system for interactive doodle state.
//!
//! Doodles remain pure data (parameters, squiggles, transform). This module
//! holds what the pointer works with on top of them:
//! - handles and the interaction mode each one drives
//! - per-doodle selection and sub-edit state

mod handles;
mod manager;
mod state;

pub use handles::{HANDLE_HIT_RADIUS, Handle, InteractionMode};
pub use manager::WidgetManager;
pub use state::{EditingKind, WidgetState};
