//! Trait abstraction over the page document to enable mocking in tests

/// Callback run when a driver field reports a change.
///
/// Receives the document so it can re-read the driver and write controls.
pub type ChangeListener = Box<dyn FnMut(&mut dyn FormDocument)>;

/// Read and write access to the controls of one page
#[cfg_attr(test, mockall::automock)]
pub trait FormDocument {
    /// Whether a control with this id exists
    fn contains(&self, id: &str) -> bool;

    /// Current value of a control, `None` if it does not exist
    fn value(&self, id: &str) -> Option<String>;

    /// Show or hide a control
    fn set_displayed(&mut self, id: &str, displayed: bool);

    /// Set the `name` attribute of a control; `""` suppresses submission
    fn set_name(&mut self, id: &str, name: &str);
}

/// Documents that can notify about driver changes
pub trait ChangeEvents: FormDocument {
    /// Run `listener` after every change of the control `id`
    fn listen(&mut self, id: &str, listener: ChangeListener);
}
