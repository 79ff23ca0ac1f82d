//! Rule table: driver value to effect, with a mandatory fallback

use super::effect::{ControlId, Effect, ExclusivityGroup};
use crate::error::RuleError;
use std::collections::{BTreeSet, HashMap};

/// Total mapping from a driver value to the [`Effect`] it selects.
///
/// Several values may share one effect (e.g. `"inflow"` and `"in"`).
/// Anything without an explicit rule resolves to the fallback.
///
/// The exclusivity groups of a table are the ones its fallback activates.
/// Every rule must activate exactly one member of each of them and no other
/// group, so whatever the driver holds each group submits one value.
#[derive(Debug, Clone)]
pub struct RuleTable {
    effects: Vec<Effect>,
    index: HashMap<String, usize>,
    fallback: Effect,
    groups: Vec<ExclusivityGroup>,
}

impl RuleTable {
    /// Create a table whose only behavior so far is `fallback`
    pub fn new(fallback: Effect) -> Self {
        let groups = fallback
            .activations()
            .iter()
            .map(|activation| activation.group().clone())
            .collect();
        Self {
            effects: Vec::new(),
            index: HashMap::new(),
            fallback,
            groups,
        }
    }

    /// Add a rule for a single driver value
    pub fn with_rule(self, value: impl Into<String>, effect: Effect) -> Result<Self, RuleError> {
        self.with_rule_for([value], effect)
    }

    /// Add one rule shared by several driver values
    pub fn with_rule_for<I, S>(mut self, values: I, effect: Effect) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let Some(first) = values.first() else {
            return Ok(self);
        };
        self.check_groups(first, &effect)?;

        let slot = self.effects.len();
        for value in values {
            if self.index.contains_key(&value) {
                return Err(RuleError::DuplicateValue(value));
            }
            self.index.insert(value, slot);
        }
        self.effects.push(effect);
        Ok(self)
    }

    fn check_groups(&self, value: &str, effect: &Effect) -> Result<(), RuleError> {
        if let Some(group) = self
            .groups
            .iter()
            .find(|group| effect.activation_for(group).is_none())
        {
            return Err(RuleError::MissingActivation {
                value: value.to_string(),
                field_name: group.field_name().to_string(),
            });
        }
        if let Some(activation) = effect
            .activations()
            .iter()
            .find(|activation| !self.groups.contains(activation.group()))
        {
            return Err(RuleError::UnmanagedGroup {
                value: value.to_string(),
                field_name: activation.field_name().to_string(),
            });
        }
        Ok(())
    }

    /// The explicit rule for `value`, if there is one
    pub fn lookup(&self, value: &str) -> Option<&Effect> {
        self.index.get(value).map(|&slot| &self.effects[slot])
    }

    /// The effect for `value`, falling back to the default
    pub fn resolve(&self, value: &str) -> &Effect {
        self.lookup(value).unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &Effect {
        &self.fallback
    }

    /// Exclusivity groups every effect in the table manages
    pub fn groups(&self) -> &[ExclusivityGroup] {
        &self.groups
    }

    /// Driver values with an explicit rule, sorted
    pub fn values(&self) -> Vec<&str> {
        let mut values: Vec<&str> = self.index.keys().map(String::as_str).collect();
        values.sort_unstable();
        values
    }

    /// Every control any effect in the table touches, fallback included
    pub fn referenced_controls(&self) -> BTreeSet<&ControlId> {
        self.effects
            .iter()
            .chain(std::iter::once(&self.fallback))
            .flat_map(Effect::controls)
            .collect()
    }
}
