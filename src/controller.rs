//! Visibility controller
//!
//! Binds one driver field to its rule table. The displayed state and
//! submission names of dependent controls are always recomputed from the
//! driver's current value; nothing else writes them.

use crate::dom::{ChangeEvents, FormDocument};
use crate::error::ControllerError;
use crate::rules::{ControlId, Effect, RuleTable};
use std::rc::Rc;
use tracing::{debug, info};

/// Handle to a driver field bound to its rules.
///
/// Clones share the rule table; separate controllers never share state.
#[derive(Debug, Clone)]
pub struct VisibilityController {
    driver: ControlId,
    rules: Rc<RuleTable>,
}

impl VisibilityController {
    /// Bind `driver` in `document` to `rules`.
    ///
    /// Checks that the driver and every control the rules reference exist,
    /// applies the effect for the driver's current value, then re-applies on
    /// every change of the driver. Call once per driver per page.
    pub fn initialize<D>(
        document: &mut D,
        driver: impl Into<ControlId>,
        rules: RuleTable,
    ) -> Result<Self, ControllerError>
    where
        D: ChangeEvents,
    {
        let controller = Self {
            driver: driver.into(),
            rules: Rc::new(rules),
        };
        controller.check_wiring(&*document)?;

        controller.sync(document);

        let listener = controller.clone();
        document.listen(
            controller.driver.as_str(),
            Box::new(move |document: &mut dyn FormDocument| {
                listener.sync(document);
            }),
        );

        info!(
            driver = %controller.driver,
            rules = controller.rules.values().len(),
            "bound visibility controller"
        );
        Ok(controller)
    }

    fn check_wiring(&self, document: &dyn FormDocument) -> Result<(), ControllerError> {
        if !document.contains(self.driver.as_str()) {
            return Err(ControllerError::MissingDriver(self.driver.to_string()));
        }
        for control in self.rules.referenced_controls() {
            if !document.contains(control.as_str()) {
                return Err(ControllerError::MissingControl {
                    driver: self.driver.to_string(),
                    control: control.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn driver(&self) -> &ControlId {
        &self.driver
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// The effect a driver value selects
    pub fn resolve(&self, value: &str) -> &Effect {
        match self.rules.lookup(value) {
            Some(effect) => effect,
            None => {
                debug!(driver = %self.driver, value, "no rule for driver value, using fallback");
                self.rules.fallback()
            }
        }
    }

    /// Re-read the driver and apply the effect it selects.
    ///
    /// A driver missing from the document reads as the empty value.
    pub fn sync(&self, document: &mut dyn FormDocument) -> &Effect {
        let value = document.value(self.driver.as_str()).unwrap_or_default();
        let effect = self.resolve(&value);
        debug!(driver = %self.driver, value = %value, "applying effect");
        Self::apply(document, effect);
        effect
    }

    /// Write `effect` to the document, touching only the controls it names
    pub fn apply(document: &mut dyn FormDocument, effect: &Effect) {
        for id in effect.shown() {
            document.set_displayed(id.as_str(), true);
        }
        for id in effect.hidden() {
            document.set_displayed(id.as_str(), false);
        }
        // Clear peers first so two names are never set at once
        for activation in effect.activations() {
            for peer in activation.peers() {
                document.set_name(peer.as_str(), "");
            }
        }
        for activation in effect.activations() {
            document.set_name(activation.active().as_str(), activation.field_name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{FormControl, MemoryDocument, MockFormDocument};
    use crate::rules::ExclusivityGroup;
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn role_filter_rules() -> RuleTable {
        let group = ExclusivityGroup::new("value", ["value-text", "value-role"]).unwrap();
        let role = Effect::builder()
            .show("value-role")
            .hide("value-text")
            .activate(group.activate("value-role").unwrap())
            .build()
            .unwrap();
        let other = Effect::builder()
            .show("value-text")
            .hide("value-role")
            .activate(group.activate("value-text").unwrap())
            .build()
            .unwrap();
        RuleTable::new(other).with_rule("role", role).unwrap()
    }

    fn role_filter_page(driver_value: &str) -> MemoryDocument {
        MemoryDocument::new()
            .with_control(FormControl::with_value("filter-field", "field", driver_value))
            .with_control(FormControl::new("value-text", "value"))
            .with_control(FormControl::new("value-role", "value"))
            .with_control(FormControl::new("search", "q"))
    }

    fn state(doc: &MemoryDocument, id: &str) -> (bool, String) {
        let control = doc.control(id).unwrap();
        (control.displayed, control.name.clone())
    }

    fn named_members(doc: &MemoryDocument) -> usize {
        ["value-text", "value-role"]
            .iter()
            .filter(|id| doc.control(id).unwrap().is_submitted())
            .count()
    }

    mod initialize {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_applies_current_value_before_any_change() {
            let mut doc = role_filter_page("role");
            VisibilityController::initialize(&mut doc, "filter-field", role_filter_rules())
                .unwrap();

            assert_eq!(state(&doc, "value-text"), (false, String::new()));
            assert_eq!(state(&doc, "value-role"), (true, "value".to_string()));
        }

        #[test]
        fn test_fallback_for_other_values() {
            let mut doc = role_filter_page("name");
            VisibilityController::initialize(&mut doc, "filter-field", role_filter_rules())
                .unwrap();

            assert_eq!(state(&doc, "value-text"), (true, "value".to_string()));
            assert_eq!(state(&doc, "value-role"), (false, String::new()));
        }

        #[test]
        fn test_registers_one_listener() {
            let mut doc = role_filter_page("name");
            VisibilityController::initialize(&mut doc, "filter-field", role_filter_rules())
                .unwrap();
            assert_eq!(doc.listener_count("filter-field"), 1);
        }

        #[test]
        fn test_missing_driver_fails() {
            let mut doc = role_filter_page("name");
            let err =
                VisibilityController::initialize(&mut doc, "filter", role_filter_rules())
                    .unwrap_err();
            assert_eq!(err, ControllerError::MissingDriver("filter".into()));
            assert_eq!(doc.listener_count("filter"), 0);
        }

        #[test]
        fn test_missing_control_fails_without_writing() {
            let mut doc = role_filter_page("role");
            doc.remove("value-role");
            let before = doc.snapshot();

            let err =
                VisibilityController::initialize(&mut doc, "filter-field", role_filter_rules())
                    .unwrap_err();

            assert_eq!(
                err,
                ControllerError::MissingControl {
                    driver: "filter-field".into(),
                    control: "value-role".into(),
                }
            );
            assert_eq!(doc.snapshot(), before);
            assert_eq!(doc.listener_count("filter-field"), 0);
        }

        #[test]
        fn test_matches_change_event_with_same_value() {
            for value in ["role", "name", "email", ""] {
                let mut loaded = role_filter_page(value);
                VisibilityController::initialize(&mut loaded, "filter-field", role_filter_rules())
                    .unwrap();

                let mut changed = role_filter_page("email");
                VisibilityController::initialize(&mut changed, "filter-field", role_filter_rules())
                    .unwrap();
                changed.change("filter-field", value);

                assert_eq!(loaded.snapshot(), changed.snapshot(), "value {value:?}");
            }
        }
    }

    mod change_events {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_reapplies_on_every_change() {
            let mut doc = role_filter_page("name");
            VisibilityController::initialize(&mut doc, "filter-field", role_filter_rules())
                .unwrap();

            doc.change("filter-field", "role");
            assert_eq!(state(&doc, "value-role"), (true, "value".to_string()));
            assert_eq!(state(&doc, "value-text"), (false, String::new()));

            doc.change("filter-field", "email");
            assert_eq!(state(&doc, "value-role"), (false, String::new()));
            assert_eq!(state(&doc, "value-text"), (true, "value".to_string()));
        }

        #[test]
        fn test_exactly_one_submitted_value() {
            let mut doc = role_filter_page("role");
            VisibilityController::initialize(&mut doc, "filter-field", role_filter_rules())
                .unwrap();
            assert_eq!(named_members(&doc), 1);

            for value in ["name", "role", "role", "unknown", "", "role"] {
                doc.change("filter-field", value);
                assert_eq!(named_members(&doc), 1, "after {value:?}");
                let values: Vec<_> = doc
                    .form_data()
                    .into_iter()
                    .filter(|(name, _)| name == "value")
                    .collect();
                assert_eq!(values.len(), 1);
            }
        }

        #[test]
        fn test_unrelated_controls_untouched() {
            let mut doc = role_filter_page("name");
            doc.set_displayed("search", false);
            VisibilityController::initialize(&mut doc, "filter-field", role_filter_rules())
                .unwrap();
            doc.change("filter-field", "role");

            assert_eq!(state(&doc, "search"), (false, "q".to_string()));
            assert_eq!(state(&doc, "filter-field"), (true, "field".to_string()));
        }

        #[test]
        fn test_radio_driver_follows_checked_sibling() {
            let rules = RuleTable::new(
                Effect::builder()
                    .show("product-select")
                    .hide("ingredient-select")
                    .build()
                    .unwrap(),
            )
            .with_rule(
                "in",
                Effect::builder()
                    .show("ingredient-select")
                    .hide("product-select")
                    .build()
                    .unwrap(),
            )
            .unwrap();
            let mut doc = MemoryDocument::new()
                .with_control(FormControl::radio("type-in", "type", "in", true))
                .with_control(FormControl::radio("type-out", "type", "out", false))
                .with_control(FormControl::new("ingredient-select", "ingredient"))
                .with_control(FormControl::new("product-select", "product"));
            VisibilityController::initialize(&mut doc, "type-in", rules).unwrap();
            assert!(doc.control("ingredient-select").unwrap().displayed);

            doc.check("type-out");
            assert!(!doc.control("ingredient-select").unwrap().displayed);
            assert!(doc.control("product-select").unwrap().displayed);

            doc.check("type-in");
            assert!(doc.control("ingredient-select").unwrap().displayed);
        }

        #[test]
        fn test_controllers_do_not_interfere() {
            let product_rules = RuleTable::new(
                Effect::builder()
                    .show("quantity")
                    .hide("ingredients")
                    .build()
                    .unwrap(),
            )
            .with_rule(
                "food",
                Effect::builder()
                    .show("ingredients")
                    .hide("quantity")
                    .build()
                    .unwrap(),
            )
            .unwrap();

            let mut doc = role_filter_page("name")
                .with_control(FormControl::with_value("type", "type", "food"))
                .with_control(FormControl::new("ingredients", "ingredients"))
                .with_control(FormControl::new("quantity", "quantity"));

            VisibilityController::initialize(&mut doc, "filter-field", role_filter_rules())
                .unwrap();
            VisibilityController::initialize(&mut doc, "type", product_rules).unwrap();

            doc.change("filter-field", "role");
            assert!(doc.control("ingredients").unwrap().displayed);
            assert!(!doc.control("quantity").unwrap().displayed);

            doc.change("type", "drink");
            assert_eq!(state(&doc, "value-role"), (true, "value".to_string()));
            assert!(doc.control("quantity").unwrap().displayed);
        }
    }

    mod apply {
        use super::*;
        use pretty_assertions::assert_eq;

        fn movement_with_amount_rules() -> RuleTable {
            let item = ExclusivityGroup::new("item", ["ingredient", "product"]).unwrap();
            let amount =
                ExclusivityGroup::new("amount", ["ingredient-amount", "product-amount"]).unwrap();
            let inflow = Effect::builder()
                .show_all(["ingredient", "ingredient-amount"])
                .hide_all(["product", "product-amount"])
                .activate(item.activate("ingredient").unwrap())
                .activate(amount.activate("ingredient-amount").unwrap())
                .build()
                .unwrap();
            let outflow = Effect::builder()
                .show_all(["product", "product-amount"])
                .hide_all(["ingredient", "ingredient-amount"])
                .activate(item.activate("product").unwrap())
                .activate(amount.activate("product-amount").unwrap())
                .build()
                .unwrap();
            RuleTable::new(outflow).with_rule("in", inflow).unwrap()
        }

        #[test]
        fn test_each_group_submits_one_visible_value() {
            let mut doc = MemoryDocument::new()
                .with_control(FormControl::with_value("transaction-type", "type", "in"))
                .with_control(FormControl::new("ingredient", "item"))
                .with_control(FormControl::new("product", "item"))
                .with_control(FormControl::new("ingredient-amount", "amount"))
                .with_control(FormControl::new("product-amount", "amount"));
            VisibilityController::initialize(
                &mut doc,
                "transaction-type",
                movement_with_amount_rules(),
            )
            .unwrap();

            for value in ["in", "out", "in", "transfer"] {
                doc.change("transaction-type", value);
                for field in ["item", "amount"] {
                    let submitted: Vec<String> = doc
                        .snapshot()
                        .into_values()
                        .filter(|control| control.name == field)
                        .map(|control| {
                            assert!(control.displayed, "{} hidden after {value:?}", control.id);
                            control.id.to_string()
                        })
                        .collect();
                    assert_eq!(submitted.len(), 1, "{field} after {value:?}");
                }
            }
            assert_eq!(state(&doc, "product-amount"), (true, "amount".to_string()));
            assert_eq!(state(&doc, "ingredient-amount"), (false, String::new()));
        }

        #[test]
        fn test_clears_every_peer_before_naming() {
            let rules = movement_with_amount_rules();
            let mut seq = Sequence::new();
            let mut doc = MockFormDocument::new();
            doc.expect_set_displayed().return_const(());
            for (id, name) in [
                ("product", ""),
                ("product-amount", ""),
                ("ingredient", "item"),
                ("ingredient-amount", "amount"),
            ] {
                doc.expect_set_name()
                    .with(eq(id), eq(name))
                    .times(1)
                    .in_sequence(&mut seq)
                    .return_const(());
            }

            VisibilityController::apply(&mut doc, rules.resolve("in"));
        }

        #[test]
        fn test_idempotent() {
            let rules = role_filter_rules();
            let effect = rules.resolve("role");

            let mut once = role_filter_page("role");
            VisibilityController::apply(&mut once, effect);

            let mut twice = role_filter_page("role");
            VisibilityController::apply(&mut twice, effect);
            VisibilityController::apply(&mut twice, effect);

            assert_eq!(once.snapshot(), twice.snapshot());
        }

        #[test]
        fn test_every_rule_shows_and_hides_as_declared() {
            let rules = role_filter_rules();
            for value in rules.values().into_iter().chain(["unmatched"]) {
                let effect = rules.resolve(value);
                let mut doc = role_filter_page(value);
                VisibilityController::apply(&mut doc, effect);

                for id in effect.shown() {
                    assert!(doc.control(id.as_str()).unwrap().displayed);
                }
                for id in effect.hidden() {
                    assert!(!doc.control(id.as_str()).unwrap().displayed);
                }
                assert_eq!(named_members(&doc), 1);
            }
        }

        #[test]
        fn test_touches_only_named_controls() {
            let rules = role_filter_rules();
            let mut doc = MockFormDocument::new();
            doc.expect_set_displayed()
                .with(eq("value-role"), eq(true))
                .times(1)
                .return_const(());
            doc.expect_set_displayed()
                .with(eq("value-text"), eq(false))
                .times(1)
                .return_const(());
            doc.expect_set_name()
                .with(eq("value-text"), eq(""))
                .times(1)
                .return_const(());
            doc.expect_set_name()
                .with(eq("value-role"), eq("value"))
                .times(1)
                .return_const(());

            VisibilityController::apply(&mut doc, rules.resolve("role"));
        }

        #[test]
        fn test_clears_peer_before_naming_active() {
            let rules = role_filter_rules();
            let mut seq = Sequence::new();
            let mut doc = MockFormDocument::new();
            doc.expect_set_displayed().return_const(());
            doc.expect_set_name()
                .with(eq("value-role"), eq(""))
                .times(1)
                .in_sequence(&mut seq)
                .return_const(());
            doc.expect_set_name()
                .with(eq("value-text"), eq("value"))
                .times(1)
                .in_sequence(&mut seq)
                .return_const(());

            VisibilityController::apply(&mut doc, rules.fallback());
        }

        #[test]
        fn test_visibility_only_effect_leaves_names() {
            let effect = Effect::builder()
                .show("ingredients")
                .hide("quantity")
                .build()
                .unwrap();
            let mut doc = MockFormDocument::new();
            doc.expect_set_displayed().times(2).return_const(());
            doc.expect_set_name().never();

            VisibilityController::apply(&mut doc, &effect);
        }
    }

    mod sync {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_returns_resolved_effect() {
            let mut doc = role_filter_page("role");
            let controller =
                VisibilityController::initialize(&mut doc, "filter-field", role_filter_rules())
                    .unwrap();

            doc.set_value("filter-field", "name");
            let effect = controller.sync(&mut doc);
            assert_eq!(effect, controller.rules().fallback());
            assert_eq!(state(&doc, "value-text"), (true, "value".to_string()));
        }

        #[test]
        fn test_resolve_is_lookup_with_fallback() {
            let mut doc = role_filter_page("role");
            let controller =
                VisibilityController::initialize(&mut doc, "filter-field", role_filter_rules())
                    .unwrap();

            assert_eq!(controller.driver().as_str(), "filter-field");
            assert_eq!(
                controller.resolve("role").displays("value-role"),
                Some(true)
            );
            assert_eq!(controller.resolve("nope"), controller.rules().fallback());
        }
    }
}
