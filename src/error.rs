//! Error types for rule construction and controller wiring

use thiserror::Error;

/// Errors raised while declaring a rule table.
///
/// All of these are wiring defects in a page's rule declaration and are
/// reported before any control is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("control `{0}` is both shown and hidden by the same effect")]
    ShowHideOverlap(String),

    #[error("control `{control}` is activated for `{field_name}` but hidden by the same effect")]
    HiddenActivation { control: String, field_name: String },

    #[error("control `{control}` is not a member of the `{field_name}` exclusivity group")]
    NotAGroupMember { control: String, field_name: String },

    #[error("exclusivity group `{0}` needs at least two distinct members")]
    GroupTooSmall(String),

    #[error("exclusivity group has an empty field name")]
    EmptyFieldName,

    #[error("control `{0}` belongs to more than one exclusivity group")]
    OverlappingGroups(String),

    #[error("exclusivity group `{0}` is activated more than once by the same effect")]
    ConflictingActivations(String),

    #[error("the fallback leaves exclusivity group `{0}` without an active member")]
    FallbackMissingActivation(String),

    #[error("the rule for driver value `{value}` leaves exclusivity group `{field_name}` without an active member")]
    MissingActivation { value: String, field_name: String },

    #[error("the rule for driver value `{value}` activates group `{field_name}`, which the fallback does not manage")]
    UnmanagedGroup { value: String, field_name: String },

    #[error("no exclusivity group contains activated control `{0}`")]
    UnknownActivation(String),

    #[error("driver value `{0}` has more than one rule")]
    DuplicateValue(String),

    #[error("page `{0}` is declared more than once")]
    DuplicatePage(String),

    #[error("page `{page}`: {source}")]
    InPage {
        page: String,
        #[source]
        source: Box<RuleError>,
    },
}

impl RuleError {
    /// Attach the page name to an error raised while building that page
    pub fn in_page(self, page: &str) -> Self {
        RuleError::InPage {
            page: page.to_string(),
            source: Box::new(self),
        }
    }
}

/// Errors raised when binding a controller to a document.
///
/// These mean the markup and the rule table disagree. They surface at
/// initialization and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("driver field `{0}` was not found in the document")]
    MissingDriver(String),

    #[error("control `{control}` referenced by the rules for driver `{driver}` was not found in the document")]
    MissingControl { driver: String, control: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_page_wraps_message() {
        let err = RuleError::ShowHideOverlap("value-text".into()).in_page("accounts");
        assert_eq!(
            err.to_string(),
            "page `accounts`: control `value-text` is both shown and hidden by the same effect"
        );
    }

    #[test]
    fn test_missing_control_message_names_driver() {
        let err = ControllerError::MissingControl {
            driver: "filter-field".into(),
            control: "value-role".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("value-role"));
        assert!(msg.contains("filter-field"));
    }
}
