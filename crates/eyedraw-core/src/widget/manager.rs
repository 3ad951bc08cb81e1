//! Widget manager for tracking selection and sub-edit state of doodles.

use super::state::{EditingKind, WidgetState};
use crate::doodle::DoodleId;
use std::collections::{BTreeSet, HashMap};

/// Manages UI state for all doodles of a drawing.
///
/// Keeps selection out of the doodle data so that persisted records never
/// carry it.
#[derive(Debug, Clone, Default)]
pub struct WidgetManager {
    states: HashMap<DoodleId, WidgetState>,
    selected: BTreeSet<DoodleId>,
    /// Doodle in a sub-edit mode, if any.
    focused: Option<DoodleId>,
}

impl WidgetManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: DoodleId) -> WidgetState {
        self.states.get(&id).cloned().unwrap_or_default()
    }

    pub fn set_state(&mut self, id: DoodleId, state: WidgetState) {
        if state.is_selected() {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }

        if state.is_editing() {
            self.focused = Some(id);
        } else if self.focused == Some(id) {
            self.focused = None;
        }

        self.states.insert(id, state);
    }

    pub fn is_selected(&self, id: DoodleId) -> bool {
        self.selected.contains(&id)
    }

    pub fn selected(&self) -> impl Iterator<Item = DoodleId> + '_ {
        self.selected.iter().copied()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn focused(&self) -> Option<DoodleId> {
        self.focused
    }

    /// Select a single doodle (clears other selections).
    /// Returns the doodles that were deselected.
    pub fn select(&mut self, id: DoodleId) -> Vec<DoodleId> {
        let dropped: Vec<_> = self.selected.iter().copied().filter(|&other| other != id).collect();
        for other in &dropped {
            self.set_state(*other, WidgetState::Normal);
        }
        if !self.is_selected(id) {
            self.set_state(id, WidgetState::Selected);
        }
        dropped
    }

    /// Clear all selections, returning the doodles that were selected.
    pub fn clear_selection(&mut self) -> Vec<DoodleId> {
        let selected: Vec<_> = self.selected.iter().copied().collect();
        for id in &selected {
            self.set_state(*id, WidgetState::Normal);
        }
        selected
    }

    /// Enter a sub-edit mode for a doodle.
    pub fn enter_editing(&mut self, id: DoodleId, kind: EditingKind) {
        if let Some(old_id) = self.focused {
            if old_id != id {
                self.exit_editing();
            }
        }
        self.set_state(id, WidgetState::Editing(kind));
    }

    pub fn exit_editing(&mut self) {
        if let Some(id) = self.focused {
            self.set_state(id, WidgetState::Selected);
        }
    }

    /// Flip a selected doodle in or out of a sub-edit mode.
    /// Returns true if the doodle is now editing.
    pub fn toggle_editing(&mut self, id: DoodleId, kind: EditingKind) -> bool {
        if self.is_editing_doodle(id) {
            self.exit_editing();
            false
        } else {
            self.enter_editing(id, kind);
            true
        }
    }

    pub fn is_editing_doodle(&self, id: DoodleId) -> bool {
        self.focused == Some(id)
    }

    /// Forget a deleted doodle.
    pub fn remove(&mut self, id: DoodleId) {
        self.states.remove(&id);
        self.selected.remove(&id);
        if self.focused == Some(id) {
            self.focused = None;
        }
    }
}
