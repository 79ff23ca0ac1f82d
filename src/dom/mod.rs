//! Document layer
//!
//! The controller only talks to a page through these traits:
//! - `traits`: `FormDocument` / `ChangeEvents` seams
//! - `control`: control value objects
//! - `memory`: in-process document for tests and simulation
//! - `web`: browser backend (feature `web`)

mod control;
mod memory;
mod traits;
#[cfg(feature = "web")]
mod web;

pub use control::FormControl;
pub use memory::MemoryDocument;
pub use traits::{ChangeEvents, ChangeListener, FormDocument};
#[cfg(feature = "web")]
pub use web::{bind_page, bind_rules, WebDocument};

#[cfg(test)]
pub use traits::MockFormDocument;
