//! In-process document
//!
//! Holds controls in a map and dispatches change listeners synchronously,
//! the same way a browser runs `change` handlers before the next input.
//! Radios sharing a name act as one field: any of their ids reads the
//! checked member's value, and checking a member notifies the whole group.

use super::control::FormControl;
use super::traits::{ChangeEvents, ChangeListener, FormDocument};
use crate::rules::{ControlId, Page};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Default)]
pub struct MemoryDocument {
    controls: HashMap<ControlId, FormControl>,
    listeners: HashMap<ControlId, Vec<ChangeListener>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document holding a page's driver set to `driver_value` and every
    /// control its rules reference, each named after its id
    pub fn for_page(page: &Page, driver_value: &str) -> Self {
        let mut document = Self::new().with_control(FormControl::with_value(
            &page.driver,
            page.driver.as_str(),
            driver_value,
        ));
        for id in page.rules.referenced_controls() {
            document.insert(FormControl::new(id, id.as_str()));
        }
        document
    }

    pub fn with_control(mut self, control: FormControl) -> Self {
        self.insert(control);
        self
    }

    /// Add or replace a control
    pub fn insert(&mut self, control: FormControl) {
        self.controls.insert(control.id.clone(), control);
    }

    pub fn remove(&mut self, id: &str) -> Option<FormControl> {
        self.listeners.remove(id);
        self.controls.remove(id)
    }

    pub fn control(&self, id: &str) -> Option<&FormControl> {
        self.controls.get(id)
    }

    /// Set a value without firing events, like a server-rendered selection.
    ///
    /// For a radio this checks the group member holding `value`. Returns
    /// false if the control does not exist or no radio holds `value`.
    pub fn set_value(&mut self, id: &str, value: &str) -> bool {
        match self.controls.get_mut(id) {
            Some(control) if control.is_radio() => {}
            Some(control) => {
                control.value = value.to_string();
                return true;
            }
            None => return false,
        }

        let group = self.radio_group(id);
        let holds_value = group.iter().any(|member| {
            self.controls
                .get(member)
                .is_some_and(|control| control.value == value)
        });
        if !holds_value {
            return false;
        }

        let mut picked = false;
        for member in &group {
            if let Some(control) = self.controls.get_mut(member) {
                let checked = !picked && control.value == value;
                picked |= checked;
                control.checked = Some(checked);
            }
        }
        true
    }

    /// Set a value as the user would, then run the control's change listeners.
    ///
    /// A radio runs the listeners of every member of its group. Returns false
    /// if the value could not be set.
    pub fn change(&mut self, id: &str, value: &str) -> bool {
        if !self.set_value(id, value) {
            return false;
        }
        for target in self.radio_group(id) {
            self.dispatch(&target);
        }
        true
    }

    /// Check a radio button as the user would
    pub fn check(&mut self, id: &str) -> bool {
        match self.controls.get(id) {
            Some(control) if control.is_radio() => {
                let value = control.value.clone();
                self.change(id, &value)
            }
            _ => false,
        }
    }

    fn dispatch(&mut self, id: &ControlId) {
        let Some(mut listeners) = self.listeners.remove(id) else {
            return;
        };
        for listener in listeners.iter_mut() {
            let document: &mut dyn FormDocument = &mut *self;
            listener(document);
        }
        // Listeners registered during dispatch run from the next change on
        let added = self.listeners.remove(id).unwrap_or_default();
        listeners.extend(added);
        self.listeners.insert(id.clone(), listeners);
    }

    /// Named radios sharing `id`'s name, ordered by id; just `id` otherwise
    fn radio_group(&self, id: &str) -> Vec<ControlId> {
        let Some(control) = self.controls.get(id) else {
            return Vec::new();
        };
        if !control.is_radio() || control.name.is_empty() {
            return vec![control.id.clone()];
        }
        let mut group: Vec<ControlId> = self
            .controls
            .values()
            .filter(|other| other.is_radio() && other.name == control.name)
            .map(|other| other.id.clone())
            .collect();
        group.sort();
        group
    }

    pub fn listener_count(&self, id: &str) -> usize {
        self.listeners.get(id).map_or(0, Vec::len)
    }

    /// Copy of every control, ordered by id
    pub fn snapshot(&self) -> BTreeMap<ControlId, FormControl> {
        self.controls
            .iter()
            .map(|(id, control)| (id.clone(), control.clone()))
            .collect()
    }

    /// `(name, value)` pairs a form submission would carry, ordered by id.
    ///
    /// Hidden controls are still submitted; only an empty name suppresses one.
    pub fn form_data(&self) -> Vec<(String, String)> {
        self.snapshot()
            .into_values()
            .filter(FormControl::is_submitted)
            .map(|control| (control.name, control.value))
            .collect()
    }
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners: BTreeMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(id, list)| (id.as_str(), list.len()))
            .collect();
        f.debug_struct("MemoryDocument")
            .field("controls", &self.snapshot())
            .field("listeners", &listeners)
            .finish()
    }
}

impl FormDocument for MemoryDocument {
    fn contains(&self, id: &str) -> bool {
        self.controls.contains_key(id)
    }

    fn value(&self, id: &str) -> Option<String> {
        let control = self.controls.get(id)?;
        if !control.is_radio() {
            return Some(control.value.clone());
        }
        let checked = self
            .radio_group(id)
            .iter()
            .filter_map(|member| self.controls.get(member))
            .find(|member| member.checked == Some(true))
            .map(|member| member.value.clone());
        Some(checked.unwrap_or_default())
    }

    fn set_displayed(&mut self, id: &str, displayed: bool) {
        match self.controls.get_mut(id) {
            Some(control) => control.displayed = displayed,
            None => tracing::warn!("set_displayed on missing control `{id}`"),
        }
    }

    fn set_name(&mut self, id: &str, name: &str) {
        match self.controls.get_mut(id) {
            Some(control) => control.name = name.to_string(),
            None => tracing::warn!("set_name on missing control `{id}`"),
        }
    }
}

impl ChangeEvents for MemoryDocument {
    fn listen(&mut self, id: &str, listener: ChangeListener) {
        self.listeners
            .entry(ControlId::from(id))
            .or_default()
            .push(listener);
    }
}
