//! field-toggle - conditional visibility for HTML form fields
//!
//! A driver field (a `<select>` or a radio group) decides which dependent controls
//! are shown, and which member of an exclusivity group submits the form's
//! value. Each page declares a [`RuleTable`]; a [`VisibilityController`]
//! applies it on load and on every change of the driver.
//!
//! ```
//! use field_toggle::{Effect, FormControl, MemoryDocument, RuleTable, VisibilityController};
//!
//! let food = Effect::builder().show("ingredients").hide("quantity").build()?;
//! let other = Effect::builder().show("quantity").hide("ingredients").build()?;
//! let rules = RuleTable::new(other).with_rule("food", food)?;
//!
//! let mut page = MemoryDocument::new()
//!     .with_control(FormControl::with_value("type", "type", "food"))
//!     .with_control(FormControl::new("ingredients", "ingredients"))
//!     .with_control(FormControl::new("quantity", "quantity"));
//!
//! VisibilityController::initialize(&mut page, "type", rules)?;
//! assert!(!page.control("quantity").unwrap().displayed);
//!
//! page.change("type", "drink");
//! assert!(page.control("quantity").unwrap().displayed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod controller;
pub mod dom;
pub mod error;
pub mod pages;
pub mod rules;

pub use controller::VisibilityController;
pub use dom::{ChangeEvents, FormControl, FormDocument, MemoryDocument};
pub use error::{ControllerError, RuleError};
pub use rules::{ControlId, Effect, ExclusivityGroup, NameActivation, Page, PageSet, RuleTable};
