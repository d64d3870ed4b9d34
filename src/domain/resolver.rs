//! Descendant resolution over the category forest.
//!
//! Free functions taking the forest explicitly; nothing here mutates it.

use std::collections::{BTreeSet, HashSet};

use generational_arena::Index;

use crate::domain::arena::CategoryForest;

/// Own index plus every index reachable through children, depth-first pre-order.
///
/// A node reachable twice (malformed input) is reported once; cycles terminate.
pub fn descendant_indices(forest: &CategoryForest, start: Index) -> Vec<Index> {
    let mut visited = HashSet::new();
    let mut out = Vec::new();
    collect(forest, start, &mut visited, &mut out);
    out
}

fn collect(
    forest: &CategoryForest,
    idx: Index,
    visited: &mut HashSet<Index>,
    out: &mut Vec<Index>,
) {
    if !visited.insert(idx) {
        return;
    }
    let Some(node) = forest.get_node(idx) else {
        return;
    };
    out.push(idx);
    for &child in &node.children {
        collect(forest, child, visited, out);
    }
}

/// Own id plus all descendant ids, or None when `id` is not in the forest.
pub fn descendants(forest: &CategoryForest, id: &str) -> Option<Vec<String>> {
    let start = forest.find(id)?;
    Some(
        descendant_indices(forest, start)
            .into_iter()
            .filter_map(|idx| forest.get_node(idx))
            .map(|node| node.data.id.clone())
            .collect(),
    )
}

/// Union of the descendant sets of all `ids`.
///
/// Ids unknown to the forest expand to themselves.
pub fn expand<'a, I>(forest: &CategoryForest, ids: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut expanded = BTreeSet::new();
    for id in ids {
        match descendants(forest, id) {
            Some(all) => expanded.extend(all),
            None => {
                expanded.insert(id.clone());
            }
        }
    }
    expanded
}
