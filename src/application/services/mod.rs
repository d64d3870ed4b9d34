//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (CatalogSource, SelectionStore)
//! but are themselves concrete structs, not traits.

mod selector;

pub use selector::{SelectorService, ToggleOutcome};
