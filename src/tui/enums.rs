//! Enumerations for TUI state management.

/// Application state for the terminal user interface.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppState {
    Workspace,
    Help,
}

/// Which input widget receives typed text.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Focus {
    Form,
    Paste,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::Form => Focus::Paste,
            Focus::Paste => Focus::Form,
        }
    }
}
