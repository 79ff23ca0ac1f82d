//! Rule model
//!
//! Pure data describing what each driver value does to a page's dependent
//! controls:
//! - `effect`: show/hide sets and exclusive name activation
//! - `table`: value lookup with a mandatory fallback
//! - `page`: a driver field bound to its table
//! - `declared`: JSON rule files

mod declared;
mod effect;
mod page;
mod table;

pub use declared::{EffectSpec, GroupSpec, PageRules, RuleSpec, RulesFile};
pub use effect::{ControlId, Effect, EffectBuilder, ExclusivityGroup, NameActivation};
pub use page::{Page, PageSet};
pub use table::RuleTable;
