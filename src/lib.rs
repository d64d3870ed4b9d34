//! Category tree selector.
//!
//! Builds a category forest from flat or nested backend records, resolves
//! descendants, filters products by category membership and propagates
//! checkbox selection with tri-state display.
//!
//! Layers:
//! - [`domain`]: forest, resolver, filter, selection state machine
//! - [`application`]: services over catalog and selection stores
//! - [`infrastructure`]: store implementations and wiring
//! - [`cli`]: command line host

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    build_forest, descendants, filter_products, Category, CategoryForest, CategorySelector,
    NodeState, Product, Selection, SelectionChange, SelectionMode, SelectionObserver,
};
