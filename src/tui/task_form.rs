//! Manual-entry form for the terminal user interface.
//!
//! This module provides the `TaskForm` structure holding the five manual-entry
//! fields, their visual order and the editing state.

use crate::intake::ManualEntry;
use crate::tui::input::InputField;

/// Global order constants for the manual-entry fields.
pub const TITLE_GLOBAL_ORDER: usize = 0;
pub const DUE_GLOBAL_ORDER: usize = 1;
pub const HOURS_GLOBAL_ORDER: usize = 2;
pub const IMPORTANCE_GLOBAL_ORDER: usize = 3;
pub const DEPENDENCIES_GLOBAL_ORDER: usize = 4;

/// Field labels in visual order.
pub const FIELD_LABELS: [&str; 5] = [
    "Title *",
    "Due date (YYYY-MM-DD, tomorrow, in 3d…)",
    "Estimated hours",
    "Importance (1-10)",
    "Dependencies (comma-separated ids)",
];

/// Task form for staging one task
pub struct TaskForm {
    pub title: InputField,
    pub due_date: InputField,
    pub estimated_hours: InputField,
    pub importance: InputField,
    pub dependencies: InputField,
    pub current_field: usize,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::from_entry(&ManualEntry::default())
    }
}

impl TaskForm {
    /// Create a form populated from raw entry values.
    pub fn from_entry(entry: &ManualEntry) -> Self {
        let mut form = Self {
            title: InputField::with_value(&entry.title),
            due_date: InputField::with_value(&entry.due_date),
            estimated_hours: InputField::with_value(&entry.estimated_hours),
            importance: InputField::with_value(&entry.importance),
            dependencies: InputField::with_value(&entry.dependencies),
            current_field: TITLE_GLOBAL_ORDER,
        };
        form.update_active_field();
        form
    }

    /// Current raw field values.
    pub fn to_entry(&self) -> ManualEntry {
        ManualEntry {
            title: self.title.value.clone(),
            due_date: self.due_date.value.clone(),
            estimated_hours: self.estimated_hours.value.clone(),
            importance: self.importance.value.clone(),
            dependencies: self.dependencies.value.clone(),
        }
    }

    /// Get mutable references to all input fields in visual order.
    pub fn fields_mut(&mut self) -> [&mut InputField; 5] {
        [
            &mut self.title,
            &mut self.due_date,
            &mut self.estimated_hours,
            &mut self.importance,
            &mut self.dependencies,
        ]
    }

    /// Fields in visual order, read-only.
    pub fn fields(&self) -> [&InputField; 5] {
        [
            &self.title,
            &self.due_date,
            &self.estimated_hours,
            &self.importance,
            &self.dependencies,
        ]
    }

    pub fn field_count(&self) -> usize {
        FIELD_LABELS.len()
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % self.field_count();
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            self.field_count() - 1
        } else {
            self.current_field - 1
        };
        self.update_active_field();
    }

    /// Mark only the current field as active.
    pub fn update_active_field(&mut self) {
        let current = self.current_field;
        for (i, field) in self.fields_mut().into_iter().enumerate() {
            field.active = i == current;
        }
    }

    fn current_mut(&mut self) -> &mut InputField {
        match self.current_field {
            DUE_GLOBAL_ORDER => &mut self.due_date,
            HOURS_GLOBAL_ORDER => &mut self.estimated_hours,
            IMPORTANCE_GLOBAL_ORDER => &mut self.importance,
            DEPENDENCIES_GLOBAL_ORDER => &mut self.dependencies,
            _ => &mut self.title,
        }
    }

    pub fn current(&self) -> &InputField {
        self.fields()[self.current_field.min(self.field_count() - 1)]
    }

    pub fn handle_char(&mut self, c: char) {
        self.current_mut().handle_char(c);
    }

    /// Insert pasted text into the current field, flattened to one line.
    pub fn handle_paste(&mut self, text: &str) {
        let flat: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        self.current_mut().insert_str(&flat);
    }

    pub fn handle_backspace(&mut self) {
        self.current_mut().handle_backspace();
    }

    pub fn handle_delete(&mut self) {
        self.current_mut().handle_delete();
    }

    /// Handle left/right arrow keys for cursor movement.
    pub fn handle_left_right(&mut self, right: bool) {
        let field = self.current_mut();
        if right {
            field.move_cursor_right();
        } else {
            field.move_cursor_left();
        }
    }

    pub fn handle_home_end(&mut self, end: bool) {
        let field = self.current_mut();
        if end {
            field.move_end();
        } else {
            field.move_home();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cleared_entry() {
        let form = TaskForm::default();
        assert_eq!(form.to_entry(), ManualEntry::default());
        assert!(form.title.active);
    }

    #[test]
    fn typing_goes_to_the_focused_field() {
        let mut form = TaskForm::default();
        form.handle_char('A');
        form.next_field();
        form.next_field();
        form.handle_backspace();
        form.handle_char('4');
        form.prev_field();
        form.prev_field();
        form.prev_field();
        form.handle_paste("1,\n2");
        let entry = form.to_entry();
        assert_eq!(entry.title, "A");
        assert_eq!(entry.estimated_hours, "4");
        assert_eq!(entry.dependencies, "1,2");
        assert!(form.dependencies.active);
        assert!(!form.title.active);
    }
}
