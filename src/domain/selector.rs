//! Selection state machine for the category tree.
//!
//! Node states are derived from the caller's selection on every call; the
//! selector itself never stores a selection. Toggles compute the next
//! selection and report it through a [`SelectionObserver`].

use std::collections::BTreeSet;

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::domain::arena::CategoryForest;
use crate::domain::builder::ForestBuilder;
use crate::domain::entities::{Category, NodeState, Product, Selection, SelectionMode};
use crate::domain::filter::{self, ProductIndex};
use crate::domain::permissions::{Action, PermissionSet};
use crate::domain::resolver;

/// Receives selection updates, the way a controlled component reports upward.
pub trait SelectionObserver {
    fn on_categories_change(&mut self, ids: &BTreeSet<String>);
    fn on_products_change(&mut self, ids: &BTreeSet<String>);
}

/// A plain selection can observe itself being replaced.
impl SelectionObserver for Selection {
    fn on_categories_change(&mut self, ids: &BTreeSet<String>) {
        self.categories = ids.clone();
    }

    fn on_products_change(&mut self, ids: &BTreeSet<String>) {
        self.products = ids.clone();
    }
}

/// Next values produced by one toggle. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub categories: Option<BTreeSet<String>>,
    pub products: Option<BTreeSet<String>>,
}

impl SelectionChange {
    pub fn dispatch(&self, observer: &mut dyn SelectionObserver) {
        if let Some(categories) = &self.categories {
            observer.on_categories_change(categories);
        }
        if let Some(products) = &self.products {
            observer.on_products_change(products);
        }
    }

    /// The selection after this change, as a fresh value.
    pub fn apply(&self, current: &Selection) -> Selection {
        let mut next = current.clone();
        self.dispatch(&mut next);
        next
    }
}

/// Category tree selector over one catalog pass.
#[derive(Debug)]
pub struct CategorySelector {
    forest: CategoryForest,
    products: Vec<Product>,
    index: ProductIndex,
    mode: SelectionMode,
    read_only: bool,
}

impl CategorySelector {
    pub fn new(categories: &[Category], products: Vec<Product>, mode: SelectionMode) -> Self {
        let forest = ForestBuilder::new().build(categories);
        let index = ProductIndex::new(&forest, &products);
        Self {
            forest,
            products,
            index,
            mode,
            read_only: false,
        }
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Editable only when `permissions` grants `edit` on `resource`.
    pub fn with_permissions(self, permissions: &PermissionSet, resource: &str) -> Self {
        let allowed = permissions.allows(resource, Action::Edit);
        if !allowed {
            debug!("no edit permission on {resource}, selector is read-only");
        }
        self.with_read_only(!allowed)
    }

    pub fn forest(&self) -> &CategoryForest {
        &self.forest
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product_index(&self) -> &ProductIndex {
        &self.index
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn tree_editable(&self) -> bool {
        !self.read_only && self.mode.category_tree_enabled()
    }

    pub fn is_disabled(&self, idx: Index) -> bool {
        !self.tree_editable() || !self.index.has_products(idx)
    }

    /// State of the node at `idx` under the given category selection.
    pub fn state_of(&self, idx: Index, selected: &BTreeSet<String>) -> NodeState {
        if self.is_disabled(idx) {
            return NodeState::Disabled;
        }
        let Some(node) = self.forest.get_node(idx) else {
            return NodeState::Unselected;
        };
        if selected.contains(&node.data.id) {
            return NodeState::Selected;
        }
        let any_below = resolver::descendant_indices(&self.forest, idx)
            .into_iter()
            .skip(1)
            .filter_map(|i| self.forest.get_node(i))
            .any(|n| selected.contains(&n.data.id));
        if any_below {
            NodeState::Indeterminate
        } else {
            NodeState::Unselected
        }
    }

    pub fn node_state(&self, id: &str, selected: &BTreeSet<String>) -> Option<NodeState> {
        self.forest.find(id).map(|idx| self.state_of(idx, selected))
    }

    /// Products currently offered for manual picking.
    pub fn visible_products(&self, selection: &Selection) -> Vec<&Product> {
        if self.mode.category_tree_enabled() {
            filter::filter_products(&self.forest, &self.products, &selection.categories)
        } else {
            self.products.iter().collect()
        }
    }

    /// Product ids belonging to the expansion of `categories`.
    pub fn products_for(&self, categories: &BTreeSet<String>) -> BTreeSet<String> {
        let expanded = resolver::expand(&self.forest, categories);
        filter::products_in(&self.products, &expanded)
            .into_iter()
            .map(|p| p.id.clone())
            .collect()
    }

    /// Next selection after toggling `category_id`, or None when nothing changes hands.
    ///
    /// Unknown ids, a disabled tree and an empty set of valid ids are no-ops.
    #[instrument(level = "debug", skip(self, current))]
    pub fn plan_toggle(
        &self,
        category_id: &str,
        should_select: bool,
        current: &Selection,
    ) -> Option<SelectionChange> {
        if !self.tree_editable() {
            warn!(
                "category tree is not editable (mode {}, read-only {}), ignoring toggle of {}",
                self.mode, self.read_only, category_id
            );
            return None;
        }
        let Some(target) = self.forest.find(category_id) else {
            warn!("unknown category {category_id}, ignoring toggle");
            return None;
        };

        let valid_ids: BTreeSet<String> = resolver::descendant_indices(&self.forest, target)
            .into_iter()
            .filter(|&idx| self.index.has_products(idx))
            .filter_map(|idx| self.forest.get_node(idx))
            .map(|node| node.data.id.clone())
            .collect();
        if valid_ids.is_empty() {
            debug!("category {category_id} has no products below it, nothing to toggle");
            return None;
        }

        let categories: BTreeSet<String> = if should_select {
            current.categories.union(&valid_ids).cloned().collect()
        } else {
            current.categories.difference(&valid_ids).cloned().collect()
        };

        let products = self
            .mode
            .drives_products()
            .then(|| self.products_for(&categories));

        Some(SelectionChange {
            categories: Some(categories),
            products,
        })
    }

    /// Toggle a category and report the result. Returns whether anything was reported.
    pub fn toggle(
        &self,
        category_id: &str,
        should_select: bool,
        current: &Selection,
        observer: &mut dyn SelectionObserver,
    ) -> bool {
        match self.plan_toggle(category_id, should_select, current) {
            Some(change) => {
                change.dispatch(observer);
                true
            }
            None => false,
        }
    }

    /// Next selection after picking or dropping one product.
    ///
    /// Only in modes with manual product selection, only for products that
    /// are currently visible. Category selection is never touched.
    #[instrument(level = "debug", skip(self, current))]
    pub fn plan_product_toggle(
        &self,
        product_id: &str,
        should_select: bool,
        current: &Selection,
    ) -> Option<SelectionChange> {
        if self.read_only || !self.mode.manual_products() {
            warn!(
                "products are not manually selectable (mode {}, read-only {}), ignoring {}",
                self.mode, self.read_only, product_id
            );
            return None;
        }
        if should_select {
            let visible = self
                .visible_products(current)
                .iter()
                .any(|p| p.id == product_id);
            if !visible {
                warn!("product {product_id} is unknown or filtered out, ignoring");
                return None;
            }
        } else if !self.products.iter().any(|p| p.id == product_id) {
            warn!("unknown product {product_id}, ignoring");
            return None;
        }

        let mut products = current.products.clone();
        if should_select {
            products.insert(product_id.to_string());
        } else {
            products.remove(product_id);
        }
        Some(SelectionChange {
            categories: None,
            products: Some(products),
        })
    }

    pub fn toggle_product(
        &self,
        product_id: &str,
        should_select: bool,
        current: &Selection,
        observer: &mut dyn SelectionObserver,
    ) -> bool {
        match self.plan_product_toggle(product_id, should_select, current) {
            Some(change) => {
                change.dispatch(observer);
                true
            }
            None => false,
        }
    }
}
