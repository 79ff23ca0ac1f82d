//! Declarative rule files
//!
//! Pages can be described in JSON instead of code. Activations name a
//! control; the exclusivity group is found by membership. Every declared
//! group must be activated by the fallback and by every rule.

use super::effect::{ControlId, Effect, ExclusivityGroup};
use super::page::Page;
use super::table::RuleTable;
use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Top-level shape of a rules file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesFile {
    #[serde(default)]
    pub pages: Vec<PageRules>,
}

/// One page: its driver, exclusivity groups, rules and fallback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRules {
    pub page: String,
    pub driver: ControlId,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    pub fallback: EffectSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSpec {
    pub field_name: String,
    pub members: Vec<ControlId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub values: Vec<String>,
    #[serde(flatten)]
    pub effect: EffectSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectSpec {
    #[serde(default)]
    pub show: Vec<ControlId>,
    #[serde(default)]
    pub hide: Vec<ControlId>,
    /// One control per exclusivity group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub activate: Vec<ControlId>,
}

impl RulesFile {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Build every declared page, rejecting duplicate page names
    pub fn build(&self) -> Result<Vec<Page>, RuleError> {
        self.build_each().into_iter().collect()
    }

    /// Build each declared page on its own, keeping every failure
    pub fn build_each(&self) -> Vec<Result<Page, RuleError>> {
        let mut seen = HashSet::new();
        self.pages
            .iter()
            .map(|rules| {
                if !seen.insert(rules.page.as_str()) {
                    return Err(RuleError::DuplicatePage(rules.page.clone()));
                }
                rules.build().map_err(|e| e.in_page(&rules.page))
            })
            .collect()
    }
}

impl PageRules {
    pub fn build(&self) -> Result<Page, RuleError> {
        let groups = self
            .groups
            .iter()
            .map(|g| ExclusivityGroup::new(&g.field_name, &g.members))
            .collect::<Result<Vec<_>, _>>()?;

        let mut claimed = HashSet::new();
        for member in groups.iter().flat_map(ExclusivityGroup::members) {
            if !claimed.insert(member) {
                return Err(RuleError::OverlappingGroups(member.to_string()));
            }
        }

        let fallback = self.fallback.build(&groups)?;
        if let Some(group) = groups
            .iter()
            .find(|group| fallback.activation_for(group).is_none())
        {
            return Err(RuleError::FallbackMissingActivation(
                group.field_name().to_string(),
            ));
        }

        let mut table = RuleTable::new(fallback);
        for rule in &self.rules {
            table = table.with_rule_for(&rule.values, rule.effect.build(&groups)?)?;
        }

        Ok(Page::new(&self.page, &self.driver, table))
    }
}

impl EffectSpec {
    fn build(&self, groups: &[ExclusivityGroup]) -> Result<Effect, RuleError> {
        let mut builder = Effect::builder()
            .show_all(&self.show)
            .hide_all(&self.hide);

        for control in &self.activate {
            let group = groups
                .iter()
                .find(|g| g.contains(control.as_str()))
                .ok_or_else(|| RuleError::UnknownActivation(control.to_string()))?;
            builder = builder.activate(group.activate(control)?);
        }

        builder.build()
    }
}
