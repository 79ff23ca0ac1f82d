//! Form control value objects

use crate::rules::ControlId;

/// A single form control as the controller sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControl {
    pub id: ControlId,
    /// Submission name; empty means the control is not submitted
    pub name: String,
    pub value: String,
    pub displayed: bool,
    /// `Some` for radio buttons, which only submit while checked
    pub checked: Option<bool>,
}

impl FormControl {
    /// Create a visible control with an empty value
    pub fn new(id: impl Into<ControlId>, name: &str) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            value: String::new(),
            displayed: true,
            checked: None,
        }
    }

    /// Create a visible control with an initial value
    pub fn with_value(id: impl Into<ControlId>, name: &str, value: &str) -> Self {
        Self {
            value: value.to_string(),
            ..Self::new(id, name)
        }
    }

    /// Create a radio button; radios sharing `name` form one group
    pub fn radio(id: impl Into<ControlId>, name: &str, value: &str, checked: bool) -> Self {
        Self {
            checked: Some(checked),
            ..Self::with_value(id, name, value)
        }
    }

    pub fn is_radio(&self) -> bool {
        self.checked.is_some()
    }

    /// Create a control with no submission name
    pub fn unnamed(id: impl Into<ControlId>) -> Self {
        Self::new(id, "")
    }

    /// Whether the control contributes a value when the form is submitted
    pub fn is_submitted(&self) -> bool {
        !self.name.is_empty() && self.checked != Some(false)
    }

    /// The inline `display` value this state renders as
    pub fn display_value(&self) -> &'static str {
        if self.displayed {
            "block"
        } else {
            "none"
        }
    }
}
