//! Tree data structures for import visualization
//!
//! Provides `TreeNode`, an expandable view of an [`ImportTree`], and
//! `FlattenedNode` for rendering it as a scrollable list in the TUI.
//!
//! An import tree is a DAG, so a package can appear under several
//! importers. Only its first occurrence (in depth-first order) carries its
//! imports; later occurrences are leaves marked as repeats.

use std::collections::HashSet;

use crate::graph::{ImportTree, NodeId};

/// A node in the displayed import tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Package import path
    pub name: String,
    /// The package in the underlying import tree
    pub node_id: NodeId,
    /// Imported packages
    pub children: Vec<TreeNode>,
    /// Whether this node is expanded in the UI
    pub expanded: bool,
    /// Depth in the tree (0 = root)
    pub depth: usize,
    /// Whether this package is already shown earlier in the tree
    pub is_repeat: bool,
    /// Whether this package takes part in an import cycle
    pub in_cycle: bool,
}

impl TreeNode {
    /// Create a new tree node
    pub fn new(name: impl Into<String>, node_id: NodeId) -> Self {
        Self {
            name: name.into(),
            node_id,
            children: Vec::new(),
            expanded: false,
            depth: 0,
            is_repeat: false,
            in_cycle: false,
        }
    }

    /// Build the display tree for the attached part of an import tree.
    ///
    /// The root starts expanded; everything else starts collapsed.
    pub fn from_import_tree(tree: &ImportTree) -> Self {
        let in_cycles = tree.nodes_in_cycles();
        let mut expanded = HashSet::new();
        let mut root = Self::build(tree, tree.root(), 0, &mut expanded, &in_cycles);
        root.expanded = true;
        root
    }

    fn build(
        tree: &ImportTree,
        id: NodeId,
        depth: usize,
        expanded: &mut HashSet<NodeId>,
        in_cycles: &HashSet<String>,
    ) -> Self {
        let name = tree.identifier(id).unwrap_or_default();
        let mut node = TreeNode::new(name, id);
        node.depth = depth;
        node.in_cycle = in_cycles.contains(name);

        if !expanded.insert(id) {
            node.is_repeat = true;
            return node;
        }

        for &child in tree.children_of(id) {
            let child = Self::build(tree, child, depth + 1, expanded, in_cycles);
            node.children.push(child);
        }
        node
    }

    /// Toggle the expanded state
    pub fn toggle_expanded(&mut self) {
        if !self.children.is_empty() {
            self.expanded = !self.expanded;
        }
    }

    /// Check if this node has children
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Names of all expanded nodes, used to carry the view across rebuilds
    pub fn expanded_names(&self) -> HashSet<String> {
        let mut names = HashSet::new();
        self.collect_expanded(&mut names);
        names
    }

    fn collect_expanded(&self, names: &mut HashSet<String>) {
        if self.expanded {
            names.insert(self.name.clone());
            for child in &self.children {
                child.collect_expanded(names);
            }
        }
    }

    /// Expand every node whose name is in `names`
    pub fn restore_expanded(&mut self, names: &HashSet<String>) {
        if self.has_children() && names.contains(&self.name) {
            self.expanded = true;
        }
        for child in &mut self.children {
            child.restore_expanded(names);
        }
    }

    /// Flatten the tree into a list for rendering
    ///
    /// Only includes nodes that are visible (i.e., all ancestors are expanded)
    pub fn flatten(&self) -> Vec<FlattenedNode> {
        let mut result = Vec::new();
        self.flatten_recursive(&mut result, true, "");
        result
    }

    fn flatten_recursive(&self, result: &mut Vec<FlattenedNode>, is_last: bool, indent: &str) {
        let (guide, child_indent) = match (self.depth, is_last) {
            (0, _) => (String::new(), String::new()),
            (_, true) => (format!("{indent}└── "), format!("{indent}    ")),
            (_, false) => (format!("{indent}├── "), format!("{indent}│   ")),
        };

        result.push(FlattenedNode {
            name: self.name.clone(),
            guide,
            node_id: self.node_id,
            depth: self.depth,
            is_expanded: self.expanded,
            has_children: self.has_children(),
            is_last_child: is_last,
            is_repeat: self.is_repeat,
            in_cycle: self.in_cycle,
        });

        if self.expanded {
            let child_count = self.children.len();
            for (i, child) in self.children.iter().enumerate() {
                child.flatten_recursive(result, i + 1 == child_count, &child_indent);
            }
        }
    }

    /// Find a node at a given flattened index and toggle its expansion
    ///
    /// Returns true if the toggle was successful
    pub fn toggle_at_index(&mut self, target_index: usize) -> bool {
        let mut current_index = 0;
        self.toggle_at_index_recursive(target_index, &mut current_index)
    }

    fn toggle_at_index_recursive(
        &mut self,
        target_index: usize,
        current_index: &mut usize,
    ) -> bool {
        if *current_index == target_index {
            self.toggle_expanded();
            return true;
        }
        *current_index += 1;

        if self.expanded {
            for child in &mut self.children {
                if child.toggle_at_index_recursive(target_index, current_index) {
                    return true;
                }
            }
        }
        false
    }
}

/// A flattened representation of a tree node for rendering
#[derive(Debug, Clone)]
pub struct FlattenedNode {
    /// Package import path
    pub name: String,
    /// Box-drawing guide drawn before the name
    pub guide: String,
    /// The package in the underlying import tree
    pub node_id: NodeId,
    /// Depth in the tree
    pub depth: usize,
    /// Whether this node is currently expanded
    pub is_expanded: bool,
    /// Whether this node has children
    pub has_children: bool,
    /// Whether this is the last child of its parent
    pub is_last_child: bool,
    /// Whether this package is already shown earlier in the tree
    pub is_repeat: bool,
    /// Whether this package takes part in an import cycle
    pub in_cycle: bool,
}

impl FlattenedNode {
    /// Get the expansion indicator character
    pub fn expansion_indicator(&self) -> &'static str {
        if !self.has_children {
            "  "
        } else if self.is_expanded {
            "▼ "
        } else {
            "▶ "
        }
    }
}
