//! Effects: what a single driver value does to its dependent controls

use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a form control in the page markup
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlId(String);

impl ControlId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ControlId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ControlId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&String> for ControlId {
    fn from(id: &String) -> Self {
        Self(id.clone())
    }
}

impl From<&ControlId> for ControlId {
    fn from(id: &ControlId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for ControlId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A set of controls that carry one logical form value.
///
/// At most one member is submitted at a time: the active member holds
/// `field_name` as its `name` attribute, every other member holds `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusivityGroup {
    field_name: String,
    members: Vec<ControlId>,
}

impl ExclusivityGroup {
    /// Create a group submitting under `field_name`.
    ///
    /// Duplicate members are collapsed; fewer than two distinct members is
    /// rejected since there would be nothing to exclude.
    pub fn new<I, C>(field_name: impl Into<String>, members: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = C>,
        C: Into<ControlId>,
    {
        let field_name = field_name.into();
        if field_name.is_empty() {
            return Err(RuleError::EmptyFieldName);
        }

        let mut distinct: Vec<ControlId> = Vec::new();
        for member in members {
            let member = member.into();
            if !distinct.contains(&member) {
                distinct.push(member);
            }
        }
        if distinct.len() < 2 {
            return Err(RuleError::GroupTooSmall(field_name));
        }

        Ok(Self {
            field_name,
            members: distinct,
        })
    }

    /// The `name` attribute the active member submits under
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn members(&self) -> &[ControlId] {
        &self.members
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m.as_str() == id)
    }

    /// Make `member` the submitted control of this group
    pub fn activate(&self, member: impl Into<ControlId>) -> Result<NameActivation, RuleError> {
        let active = member.into();
        if !self.members.contains(&active) {
            return Err(RuleError::NotAGroupMember {
                control: active.to_string(),
                field_name: self.field_name.clone(),
            });
        }
        Ok(NameActivation {
            group: self.clone(),
            active,
        })
    }
}

/// The name assignment for one exclusivity group.
///
/// Only obtainable through [`ExclusivityGroup::activate`], so the active
/// control is always a member and every other member is a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameActivation {
    group: ExclusivityGroup,
    active: ControlId,
}

impl NameActivation {
    pub fn group(&self) -> &ExclusivityGroup {
        &self.group
    }

    pub fn active(&self) -> &ControlId {
        &self.active
    }

    pub fn field_name(&self) -> &str {
        self.group.field_name()
    }

    /// Group members whose name is cleared
    pub fn peers(&self) -> impl Iterator<Item = &ControlId> {
        self.group.members().iter().filter(move |m| **m != self.active)
    }

    /// The `name` this activation assigns to `id`, if `id` is in the group
    pub fn name_for(&self, id: &str) -> Option<&str> {
        if self.active.as_str() == id {
            Some(self.field_name())
        } else if self.group.contains(id) {
            Some("")
        } else {
            None
        }
    }

    /// Active control first, then its peers
    pub fn controls(&self) -> impl Iterator<Item = &ControlId> {
        std::iter::once(&self.active).chain(self.peers())
    }
}

/// The resolved show/hide/name actions for one driver value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Effect {
    show: BTreeSet<ControlId>,
    hide: BTreeSet<ControlId>,
    activations: Vec<NameActivation>,
}

impl Effect {
    pub fn builder() -> EffectBuilder {
        EffectBuilder::default()
    }

    pub fn shown(&self) -> &BTreeSet<ControlId> {
        &self.show
    }

    pub fn hidden(&self) -> &BTreeSet<ControlId> {
        &self.hide
    }

    /// One activation per exclusivity group this effect manages
    pub fn activations(&self) -> &[NameActivation] {
        &self.activations
    }

    /// The activation this effect makes for `group`, if any
    pub fn activation_for(&self, group: &ExclusivityGroup) -> Option<&NameActivation> {
        self.activations.iter().find(|a| a.group() == group)
    }

    /// `Some(true)` if shown, `Some(false)` if hidden, `None` if untouched
    pub fn displays(&self, id: &str) -> Option<bool> {
        if self.show.contains(id) {
            Some(true)
        } else if self.hide.contains(id) {
            Some(false)
        } else {
            None
        }
    }

    /// Every control this effect touches, without duplicates
    pub fn controls(&self) -> BTreeSet<&ControlId> {
        self.show
            .iter()
            .chain(self.hide.iter())
            .chain(self.activations.iter().flat_map(|a| a.controls()))
            .collect()
    }
}

/// Builder that checks an [`Effect`] is consistent before handing it out
#[derive(Debug, Default)]
pub struct EffectBuilder {
    show: BTreeSet<ControlId>,
    hide: BTreeSet<ControlId>,
    activations: Vec<NameActivation>,
}

impl EffectBuilder {
    pub fn show(mut self, id: impl Into<ControlId>) -> Self {
        self.show.insert(id.into());
        self
    }

    pub fn show_all<I, C>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ControlId>,
    {
        self.show.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn hide(mut self, id: impl Into<ControlId>) -> Self {
        self.hide.insert(id.into());
        self
    }

    pub fn hide_all<I, C>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ControlId>,
    {
        self.hide.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Add the name assignment for one group; each group at most once
    pub fn activate(mut self, activation: NameActivation) -> Self {
        self.activations.push(activation);
        self
    }

    pub fn build(self) -> Result<Effect, RuleError> {
        if let Some(id) = self.show.intersection(&self.hide).next() {
            return Err(RuleError::ShowHideOverlap(id.to_string()));
        }

        let mut claimed: BTreeSet<&ControlId> = BTreeSet::new();
        for (i, activation) in self.activations.iter().enumerate() {
            if self.activations[..i]
                .iter()
                .any(|earlier| earlier.group() == activation.group())
            {
                return Err(RuleError::ConflictingActivations(
                    activation.field_name().to_string(),
                ));
            }
            for member in activation.group().members() {
                if !claimed.insert(member) {
                    return Err(RuleError::OverlappingGroups(member.to_string()));
                }
            }
            if self.hide.contains(activation.active()) {
                return Err(RuleError::HiddenActivation {
                    control: activation.active().to_string(),
                    field_name: activation.field_name().to_string(),
                });
            }
        }

        Ok(Effect {
            show: self.show,
            hide: self.hide,
            activations: self.activations,
        })
    }
}
