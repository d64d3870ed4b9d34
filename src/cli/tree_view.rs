//! Rendering the category forest as terminal trees.

use std::collections::HashSet;

use colored::Colorize;
use generational_arena::Index;
use termtree::Tree;

use crate::cli::output::marker;
use crate::config::DisplayConfig;
use crate::domain::{CategorySelector, NodeState, Selection};

pub trait TreeViewConvert {
    /// One tree per root, in root order.
    fn to_tree_views(&self, selection: &Selection, display: &DisplayConfig) -> Vec<Tree<String>>;
}

impl TreeViewConvert for CategorySelector {
    fn to_tree_views(&self, selection: &Selection, display: &DisplayConfig) -> Vec<Tree<String>> {
        let mut on_path = HashSet::new();
        self.forest()
            .roots()
            .iter()
            .filter_map(|&root| build_tree(self, root, selection, display, &mut on_path))
            .collect()
    }
}

fn build_tree(
    selector: &CategorySelector,
    node_idx: Index,
    selection: &Selection,
    display: &DisplayConfig,
    on_path: &mut HashSet<Index>,
) -> Option<Tree<String>> {
    let node = selector.forest().get_node(node_idx)?;
    let state = selector.state_of(node_idx, &selection.categories);
    if display.hide_disabled && state == NodeState::Disabled {
        return None;
    }

    let mut text = format!("{} {}", marker(state), node.data);
    if display.ids {
        text.push_str(&format!(" {}", format!("({})", node.data.id).dimmed()));
    }
    if display.counts {
        let count = selector.product_index().subtree_count(node_idx);
        text.push_str(&format!(" {}", format!("· {count}").dimmed()));
    }

    if !on_path.insert(node_idx) {
        return Some(Tree::new(format!("{text} {}", "(cycle)".red())));
    }
    let mut tree = Tree::new(text);
    for &child in &node.children {
        if let Some(child_tree) = build_tree(selector, child, selection, display, on_path) {
            tree.push(child_tree);
        }
    }
    on_path.remove(&node_idx);
    Some(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Product, SelectionMode};

    fn render(
        selector: &CategorySelector,
        selection: &Selection,
        display: &DisplayConfig,
    ) -> String {
        colored::control::set_override(false);
        selector
            .to_tree_views(selection, display)
            .iter()
            .map(|t| t.to_string())
            .collect()
    }

    fn selector() -> CategorySelector {
        let categories = vec![
            Category::new("A", "Apparel").with_children(vec![
                Category::new("B", "Shirts").with_parent("A"),
                Category::new("C", "Socks").with_parent("A"),
            ]),
            Category::new("D", "Dust"),
        ];
        let products = vec![Product::new("p1", "Tee", 9.5).in_category("B")];
        CategorySelector::new(&categories, products, SelectionMode::CategoriesOnly)
    }

    #[test]
    fn given_partial_selection_when_rendering_then_shows_tri_state_markers() {
        let selection = Selection::new().with_categories(["B"]);
        let out = render(&selector(), &selection, &DisplayConfig::default());

        assert!(out.contains("[-] Apparel · 1"), "{out}");
        assert!(out.contains("[x] Shirts · 1"), "{out}");
        assert!(out.contains("[/] Socks · 0"), "{out}");
        assert!(out.contains("[/] Dust"), "{out}");
    }

    #[test]
    fn given_hide_disabled_when_rendering_then_disabled_nodes_are_left_out() {
        let display = DisplayConfig {
            hide_disabled: true,
            counts: false,
            ids: true,
        };
        let out = render(&selector(), &Selection::new(), &display);

        assert!(out.contains("[ ] Shirts (B)"), "{out}");
        assert!(!out.contains("Socks"), "{out}");
        assert!(!out.contains("Dust"), "{out}");
    }
}
