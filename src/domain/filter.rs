//! Product filtering by category membership.

use std::collections::{BTreeSet, HashMap, HashSet};

use generational_arena::Index;

use crate::domain::arena::CategoryForest;
use crate::domain::entities::Product;
use crate::domain::resolver;

/// Product counts per category, computed once per pass.
///
/// Subtree counts are pushed upward from every category holding products,
/// so lookups never walk the forest.
#[derive(Debug, Clone, Default)]
pub struct ProductIndex {
    direct: HashMap<String, usize>,
    subtree: HashMap<Index, usize>,
}

impl ProductIndex {
    pub fn new(forest: &CategoryForest, products: &[Product]) -> Self {
        let mut direct = HashMap::new();
        for category_id in products.iter().filter_map(Product::effective_category_id) {
            *direct.entry(category_id.to_string()).or_insert(0) += 1;
        }

        let mut subtree = HashMap::new();
        for (category_id, &count) in &direct {
            let Some(start) = forest.find(category_id) else {
                continue;
            };
            // each ancestor once per source category, cycles included
            let mut seen = HashSet::new();
            let mut stack = vec![start];
            while let Some(idx) = stack.pop() {
                if !seen.insert(idx) {
                    continue;
                }
                *subtree.entry(idx).or_insert(0) += count;
                if let Some(node) = forest.get_node(idx) {
                    stack.extend(node.parents.iter().copied());
                }
            }
        }
        Self { direct, subtree }
    }

    pub fn direct_count(&self, category_id: &str) -> usize {
        self.direct.get(category_id).copied().unwrap_or(0)
    }

    /// Products attached to the node or anywhere below it.
    pub fn subtree_count(&self, idx: Index) -> usize {
        self.subtree.get(&idx).copied().unwrap_or(0)
    }

    /// Whether the node is selectable at all.
    pub fn has_products(&self, idx: Index) -> bool {
        self.subtree_count(idx) > 0
    }
}

/// Products whose category lies in the expansion of `selected`.
///
/// An empty selection passes every product through, in input order.
pub fn filter_products<'a>(
    forest: &CategoryForest,
    products: &'a [Product],
    selected: &BTreeSet<String>,
) -> Vec<&'a Product> {
    if selected.is_empty() {
        return products.iter().collect();
    }
    let expanded = resolver::expand(forest, selected);
    products_in(products, &expanded)
}

/// Products whose effective category id is in `category_ids` (no expansion).
pub fn products_in<'a>(
    products: &'a [Product],
    category_ids: &BTreeSet<String>,
) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|p| {
            p.effective_category_id()
                .is_some_and(|id| category_ids.contains(id))
        })
        .collect()
}
