//! Domain entities: core data structures

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::permissions::PermissionSet;

/// Explicit `null` reads as the type's default, like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Category record as delivered by the backend.
///
/// Records may arrive flat (linked through `parent_id`) or nested (linked
/// through `children`), or as a mix of both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Parent category id, None for roots
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Owned child records, in display order
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<Category>,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            children: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Category>) -> Self {
        self.children = children;
        self
    }
}

/// Nested category reference carried by some product payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: String,
}

/// Product record as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, alias = "price", deserialize_with = "null_as_default")]
    pub selling_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, selling_price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            selling_price,
            category_id: None,
            category: None,
        }
    }

    pub fn in_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// The category this product belongs to.
    ///
    /// Precedence: a non-empty `categoryId`, then a non-empty nested
    /// `category.id`, otherwise no category.
    pub fn effective_category_id(&self) -> Option<&str> {
        self.category_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| {
                self.category
                    .as_ref()
                    .map(|c| c.id.as_str())
                    .filter(|id| !id.is_empty())
            })
    }
}

/// Backend payload for one rendering pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSnapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
    #[serde(deserialize_with = "null_as_default")]
    pub products: Vec<Product>,
    /// Grants of the current user; absent means unrestricted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionSet>,
}

/// How category selection relates to product selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// Category toggles drive the product selection
    #[default]
    CategoriesOnly,
    /// Category tree disabled, products picked manually
    ProductsOnly,
    /// Categories filter the product list, products picked manually
    Both,
}

impl SelectionMode {
    pub fn drives_products(self) -> bool {
        matches!(self, SelectionMode::CategoriesOnly)
    }

    pub fn category_tree_enabled(self) -> bool {
        !matches!(self, SelectionMode::ProductsOnly)
    }

    pub fn manual_products(self) -> bool {
        !matches!(self, SelectionMode::CategoriesOnly)
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SelectionMode::CategoriesOnly => "categories-only",
            SelectionMode::ProductsOnly => "products-only",
            SelectionMode::Both => "both",
        };
        f.write_str(s)
    }
}

impl FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "categories-only" | "categories" => Ok(SelectionMode::CategoriesOnly),
            "products-only" | "products" => Ok(SelectionMode::ProductsOnly),
            "both" => Ok(SelectionMode::Both),
            other => Err(format!(
                "unknown selection mode '{other}' (expected categories-only, products-only or both)"
            )),
        }
    }
}

/// Derived per-node checkbox state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Unselected,
    Selected,
    Indeterminate,
    /// No products anywhere in the subtree, or the tree is not editable
    Disabled,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeState::Unselected => "unselected",
            NodeState::Selected => "selected",
            NodeState::Indeterminate => "indeterminate",
            NodeState::Disabled => "disabled",
        };
        f.write_str(s)
    }
}

/// Caller-owned selection: category ids and product ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    #[serde(deserialize_with = "null_as_default")]
    pub categories: BTreeSet<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub products: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_products<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.products = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.products.is_empty()
    }
}
