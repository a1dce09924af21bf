//! Add-task form for the terminal user interface.
//!
//! Four fields mirroring the list columns: text, due date, priority and
//! category. Tab moves focus, the priority field cycles in place, Enter
//! submits. Submission builds an `AddTask` intent; validation failures stay
//! on the form with a message so nothing is lost.

use chrono::NaiveDate;

use crate::controller::Intent;
use crate::fields::Priority;
use crate::tui::input::InputField;

/// Which form field currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Text,
    Due,
    Priority,
    Category,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Text => FormField::Due,
            FormField::Due => FormField::Priority,
            FormField::Priority => FormField::Category,
            FormField::Category => FormField::Text,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Text => FormField::Category,
            FormField::Due => FormField::Text,
            FormField::Priority => FormField::Due,
            FormField::Category => FormField::Priority,
        }
    }
}

/// State for the add-task form.
pub struct TaskForm {
    pub text: InputField,
    pub due: InputField,
    pub priority: Priority,
    pub category: InputField,
    pub focus: FormField,
    pub error: Option<String>,
}

/// Why a submission was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    EmptyText,
    BadDate(String),
    PastDate(NaiveDate),
}

impl FormError {
    pub fn message(&self) -> String {
        match self {
            FormError::EmptyText => "Task text cannot be empty".into(),
            FormError::BadDate(raw) => format!("'{raw}' is not a date (use YYYY-MM-DD)"),
            FormError::PastDate(_) => "Due date cannot be in the past".into(),
        }
    }
}

impl TaskForm {
    pub fn new() -> Self {
        let mut form = TaskForm {
            text: InputField::new(),
            due: InputField::new(),
            priority: Priority::Medium,
            category: InputField::new(),
            focus: FormField::Text,
            error: None,
        };
        form.text.active = true;
        form
    }

    /// Move focus forward or backward through the fields.
    pub fn cycle_focus(&mut self, forward: bool) {
        self.focus = if forward { self.focus.next() } else { self.focus.prev() };
        self.text.active = self.focus == FormField::Text;
        self.due.active = self.focus == FormField::Due;
        self.category.active = self.focus == FormField::Category;
    }

    /// Route a typed character to the focused field. On the priority field
    /// any key cycles the value instead of inserting text.
    pub fn handle_char(&mut self, c: char) {
        match self.focus {
            FormField::Text => self.text.handle_char(c),
            FormField::Due => self.due.handle_char(c),
            FormField::Priority => self.priority = self.priority.next(),
            FormField::Category => self.category.handle_char(c),
        }
    }

    pub fn handle_backspace(&mut self) {
        match self.focus {
            FormField::Text => self.text.handle_backspace(),
            FormField::Due => self.due.handle_backspace(),
            FormField::Priority => {}
            FormField::Category => self.category.handle_backspace(),
        }
    }

    /// Validate the fields against `today` and build the add intent.
    /// The form keeps its contents on failure.
    pub fn submit(&self, today: NaiveDate) -> Result<Intent, FormError> {
        if self.text.is_empty() {
            return Err(FormError::EmptyText);
        }

        let due = if self.due.is_empty() {
            None
        } else {
            let raw = self.due.trimmed();
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| FormError::BadDate(raw.to_string()))?;
            // Same constraint the date picker enforces: no past dates on entry.
            if date < today {
                return Err(FormError::PastDate(date));
            }
            Some(date)
        };

        Ok(Intent::AddTask {
            text: self.text.trimmed().to_string(),
            due,
            priority: self.priority,
            category: self.category.trimmed().to_string(),
        })
    }

    /// Clear every field after a successful add.
    pub fn reset(&mut self) {
        self.text.clear();
        self.due.clear();
        self.priority = Priority::Medium;
        self.category.clear();
        self.focus = FormField::Text;
        self.text.active = true;
        self.due.active = false;
        self.category.active = false;
        self.error = None;
    }
}
