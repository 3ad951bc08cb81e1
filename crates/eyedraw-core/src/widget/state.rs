//! Widget state definitions.

/// The UI state of a doodle.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum WidgetState {
    /// Not selected.
    #[default]
    Normal,
    /// Selected: shows its handles, can be moved and manipulated.
    Selected,
    /// Selected and in a sub-edit mode entered by double-click.
    Editing(EditingKind),
}

impl WidgetState {
    /// Check if the doodle is selected (either just selected or editing).
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected | Self::Editing(_))
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }
}

/// Kind of sub-edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditingKind {
    /// Hidden handles (e.g. the outline ring of a squiggle doodle) are shown.
    Handles,
}
