//! Arena-backed category forest.

use std::collections::{HashMap, HashSet};
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::DomainError;
use crate::domain::resolver;

/// Data payload for forest nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub id: String,
    pub name: String,
    /// Parent id as declared by the record, not necessarily resolvable
    pub parent_id: Option<String>,
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Node in the category forest.
#[derive(Debug)]
pub struct CategoryNode {
    pub data: NodeData,
    /// Nodes listing this one as a child; more than one is a malformed tree
    pub parents: Vec<Index>,
    /// Child nodes, in display order
    pub children: Vec<Index>,
}

/// All categories of one rendering pass.
///
/// One arena node per category id. Roots are kept in display order.
#[derive(Debug, Default)]
pub struct CategoryForest {
    arena: Arena<CategoryNode>,
    index: HashMap<String, Index>,
    roots: Vec<Index>,
}

impl CategoryForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node or overwrite the payload of an existing one (last seen wins).
    pub(crate) fn upsert_node(&mut self, data: NodeData) -> Index {
        if let Some(&idx) = self.index.get(&data.id) {
            if let Some(node) = self.arena.get_mut(idx) {
                node.data = data;
            }
            return idx;
        }
        let id = data.id.clone();
        let idx = self.arena.insert(CategoryNode {
            data,
            parents: Vec::new(),
            children: Vec::new(),
        });
        self.index.insert(id, idx);
        idx
    }

    /// Link `child` under `parent`. Returns false for duplicate or self links.
    pub(crate) fn link(&mut self, parent: Index, child: Index) -> bool {
        if parent == child {
            return false;
        }
        match self.arena.get2_mut(parent, child) {
            (Some(p), Some(c)) => {
                if p.children.contains(&child) {
                    return false;
                }
                p.children.push(child);
                c.parents.push(parent);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn push_root(&mut self, idx: Index) {
        if !self.roots.contains(&idx) {
            self.roots.push(idx);
        }
    }

    pub fn get_node(&self, idx: Index) -> Option<&CategoryNode> {
        self.arena.get(idx)
    }

    pub fn find(&self, id: &str) -> Option<Index> {
        self.index.get(id).copied()
    }

    pub fn node_by_id(&self, id: &str) -> Option<&CategoryNode> {
        self.find(id).and_then(|idx| self.get_node(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn root_data(&self) -> Vec<&NodeData> {
        self.roots
            .iter()
            .filter_map(|&idx| self.get_node(idx))
            .map(|node| &node.data)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order walk over every tree, each node visited once.
    pub fn iter(&self) -> ForestIterator<'_> {
        ForestIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut on_path = HashSet::new();
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root, &mut on_path))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index, on_path: &mut HashSet<Index>) -> usize {
        let Some(node) = self.get_node(node_idx) else {
            return 0;
        };
        if !on_path.insert(node_idx) {
            return 0;
        }
        let below = node
            .children
            .iter()
            .map(|&child| self.calculate_depth(child, on_path))
            .max()
            .unwrap_or(0);
        on_path.remove(&node_idx);
        1 + below
    }

    /// Report invariant violations without rejecting the forest.
    ///
    /// Every id that is its own descendant yields `CycleDetected`, every node
    /// linked under more than one parent yields `MultipleParents`.
    #[instrument(level = "debug", skip(self))]
    pub fn validate(&self) -> Vec<DomainError> {
        let mut issues = Vec::new();
        let mut ids: Vec<(&String, Index)> =
            self.index.iter().map(|(id, &idx)| (id, idx)).collect();
        ids.sort_by(|a, b| a.0.cmp(b.0));

        for (id, idx) in ids {
            let Some(node) = self.get_node(idx) else {
                continue;
            };
            if node.parents.len() > 1 {
                issues.push(DomainError::MultipleParents(id.clone()));
            }
            let in_own_subtree = node
                .children
                .iter()
                .any(|&child| resolver::descendant_indices(self, child).contains(&idx));
            if in_own_subtree {
                issues.push(DomainError::CycleDetected(id.clone()));
            }
        }
        issues
    }
}

pub struct ForestIterator<'a> {
    forest: &'a CategoryForest,
    stack: Vec<Index>,
    seen: HashSet<Index>,
}

impl<'a> ForestIterator<'a> {
    fn new(forest: &'a CategoryForest) -> Self {
        // Reverse so the first root comes off the stack first
        let stack = forest.roots().iter().rev().copied().collect();
        Self {
            forest,
            stack,
            seen: HashSet::new(),
        }
    }
}

impl<'a> Iterator for ForestIterator<'a> {
    type Item = (Index, &'a CategoryNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if !self.seen.insert(current_idx) {
                continue;
            }
            if let Some(node) = self.forest.get_node(current_idx) {
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
