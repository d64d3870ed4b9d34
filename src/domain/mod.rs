//! Domain layer: entities and selection logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod filter;
pub mod permissions;
pub mod resolver;
pub mod selector;

pub use arena::{CategoryForest, CategoryNode, NodeData};
pub use builder::{build_forest, ForestBuilder};
pub use entities::*;
pub use error::DomainError;
pub use filter::{filter_products, ProductIndex};
pub use permissions::{Action, PermissionSet};
pub use resolver::{descendants, expand};
pub use selector::{CategorySelector, SelectionChange, SelectionObserver};
