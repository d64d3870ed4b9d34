//! Forest builder: flat or nested category records in, linked forest out.

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::domain::arena::{CategoryForest, NodeData};
use crate::domain::entities::Category;

/// Constructs a [`CategoryForest`] from backend category records.
///
/// Linking rules:
/// - nested `children` link under their enclosing record
/// - a `parent_id` naming a known category links under that category
/// - a top-level record is a root when its own `parent_id` is absent or when
///   nothing links it as a child (dangling or missing parent)
///
/// Duplicate records merge into one node; the payload of the last one wins,
/// but every declared parent reference is kept for linking.
///
/// Building never fails; malformed input is tolerated and logged.
#[derive(Debug, Default)]
pub struct ForestBuilder {
    declared_parents: Vec<(Index, String)>,
    nested_links: Vec<(Index, Index)>,
    /// Top-level records with whether they declared a parent themselves
    top_level: Vec<(Index, bool)>,
}

impl ForestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "debug", skip_all, fields(records = categories.len()))]
    pub fn build(&mut self, categories: &[Category]) -> CategoryForest {
        // Reset state for a fresh pass
        self.declared_parents.clear();
        self.nested_links.clear();
        self.top_level.clear();

        let mut forest = CategoryForest::new();
        for category in categories {
            let idx = self.register(&mut forest, category);
            let has_parent = category.parent_id.as_deref().is_some_and(|p| !p.is_empty());
            self.top_level.push((idx, has_parent));
        }

        for &(parent, child) in &self.nested_links {
            forest.link(parent, child);
        }
        self.link_declared_parents(&mut forest);
        self.collect_roots(&mut forest);

        debug!(
            "built forest: {} categories, {} roots",
            forest.len(),
            forest.roots().len()
        );
        forest
    }

    fn register(&mut self, forest: &mut CategoryForest, category: &Category) -> Index {
        if forest.contains(&category.id) {
            debug!("duplicate category record {}, last one wins", category.id);
        }
        let parent_id = category.parent_id.clone().filter(|p| !p.is_empty());
        let idx = forest.upsert_node(NodeData {
            id: category.id.clone(),
            name: category.name.clone(),
            parent_id: parent_id.clone(),
        });
        if let Some(parent_id) = parent_id {
            self.declared_parents.push((idx, parent_id));
        }

        for child in &category.children {
            let child_idx = self.register(forest, child);
            self.nested_links.push((idx, child_idx));
        }
        idx
    }

    fn link_declared_parents(&self, forest: &mut CategoryForest) {
        for (idx, parent_id) in &self.declared_parents {
            let idx = *idx;
            match forest.find(parent_id) {
                Some(parent_idx) if parent_idx != idx => {
                    forest.link(parent_idx, idx);
                }
                Some(_) => warn!("category {parent_id} names itself as parent"),
                None => warn!("parent {parent_id} not found, treating child as root"),
            }
        }
    }

    fn collect_roots(&self, forest: &mut CategoryForest) {
        for &(idx, has_parent) in &self.top_level {
            let is_root = forest
                .get_node(idx)
                .is_some_and(|node| !has_parent || node.parents.is_empty());
            if is_root {
                forest.push_root(idx);
            }
        }
    }
}

/// Build a forest in one call.
pub fn build_forest(categories: &[Category]) -> CategoryForest {
    ForestBuilder::new().build(categories)
}
