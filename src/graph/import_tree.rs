//! The doubly-linked import tree.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Edges are
//! stored twice, once in the parent's `children` and once in the child's
//! `parents`, and every mutation here keeps both sides in step.
//!
//! Removing a node only severs links. The node keeps its arena slot but is
//! no longer reachable from the root, so every query below ignores it.

use std::collections::{HashMap, HashSet, VecDeque};

use super::node::{GraphNode, NodeId};

/// Adds the edge `parent -> child` unless it is already present.
///
/// Returns `true` if either side of the edge was new.
pub(crate) fn link(nodes: &mut [GraphNode], parent: NodeId, child: NodeId) -> bool {
    if parent.0 >= nodes.len() || child.0 >= nodes.len() {
        return false;
    }

    let mut added = false;
    if !nodes[child.0].parents.contains(&parent) {
        nodes[child.0].parents.push(parent);
        added = true;
    }
    if !nodes[parent.0].children.contains(&child) {
        nodes[parent.0].children.push(child);
        added = true;
    }
    added
}

fn remove_id(list: &mut Vec<NodeId>, id: NodeId) {
    list.retain(|&entry| entry != id);
}

/// A rooted import graph.
///
/// # Example
///
/// ```rust
/// use imptree::graph::ImportTree;
///
/// let mut tree = ImportTree::new("app");
/// let db = tree.add_node("app/db");
/// let log = tree.add_node("app/log");
/// tree.add_edge(tree.root(), db);
/// tree.add_edge(tree.root(), log);
/// tree.add_edge(db, log);
///
/// assert_eq!(tree.node_count(), 3);
/// assert_eq!(tree.edge_count(), 3);
///
/// // log survives: the root still imports it directly
/// tree.remove_node_recursively(db);
/// assert_eq!(tree.node_count(), 2);
/// assert!(tree.find("app/log").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ImportTree {
    nodes: Vec<GraphNode>,
    root: NodeId,
}

impl ImportTree {
    /// Creates a tree holding only its root.
    pub fn new(root_identifier: impl Into<String>) -> Self {
        Self {
            nodes: vec![GraphNode::new(root_identifier)],
            root: NodeId(0),
        }
    }

    pub(crate) fn from_parts(nodes: Vec<GraphNode>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    /// The root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The root node.
    pub fn root_node(&self) -> &GraphNode {
        &self.nodes[self.root.0]
    }

    /// Gets a node by id, whether or not it is still attached.
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.0)
    }

    /// Gets the identifier of a node.
    pub fn identifier(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(GraphNode::identifier)
    }

    /// Children of a node, empty for unknown ids.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[][..], GraphNode::children)
    }

    /// Parents of a node, empty for unknown ids.
    pub fn parents_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[][..], GraphNode::parents)
    }

    /// Adds an unlinked node and returns its id.
    ///
    /// The node stays unreachable until an edge from an attached node points
    /// at it.
    pub fn add_node(&mut self, identifier: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(GraphNode::new(identifier));
        id
    }

    /// Adds the edge `parent -> child`.
    ///
    /// Returns `false` if the edge already existed or either id is unknown.
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId) -> bool {
        link(&mut self.nodes, parent, child)
    }

    /// Returns true if `parent` imports `child`.
    pub fn contains_edge(&self, parent: NodeId, child: NodeId) -> bool {
        self.children_of(parent).contains(&child)
    }

    /// Finds an attached node by identifier.
    pub fn find(&self, identifier: &str) -> Option<NodeId> {
        self.nodes()
            .into_iter()
            .find(|&id| self.nodes[id.0].identifier() == identifier)
    }

    /// All nodes reachable from the root, in depth-first preorder.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.reachable_from(self.root)
    }

    /// Number of nodes reachable from the root.
    pub fn node_count(&self) -> usize {
        self.nodes().len()
    }

    /// Number of edges between nodes reachable from the root.
    pub fn edge_count(&self) -> usize {
        self.nodes()
            .into_iter()
            .map(|id| self.nodes[id.0].children.len())
            .sum()
    }

    /// Number of arena slots, detached nodes included.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the node has been cut off from the rest of the tree.
    pub fn is_detached(&self, id: NodeId) -> bool {
        match self.node(id) {
            Some(node) => id != self.root && node.parents.is_empty() && node.children.is_empty(),
            None => false,
        }
    }

    /// Shortest import distance from the root for every attached node.
    pub fn depths(&self) -> HashMap<NodeId, usize> {
        let mut depths = HashMap::from([(self.root, 0)]);
        let mut queue = VecDeque::from([(self.root, 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            for &child in &self.nodes[current.0].children {
                if !depths.contains_key(&child) {
                    depths.insert(child, depth + 1);
                    queue.push_back((child, depth + 1));
                }
            }
        }

        depths
    }

    /// Shortest import distance from the root, or `None` if unreachable.
    pub fn depth_of(&self, id: NodeId) -> Option<usize> {
        self.depths().get(&id).copied()
    }

    /// One import chain from the root down to `id`, following first parents.
    ///
    /// Returns an empty vector if the chain does not end at the root.
    pub fn import_chain(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = id;

        while current.0 < self.nodes.len() && seen.insert(current) {
            chain.push(current);
            match self.nodes[current.0].parents.first() {
                Some(&parent) if current != self.root => current = parent,
                _ => break,
            }
        }

        if chain.last() != Some(&self.root) {
            return Vec::new();
        }
        chain.reverse();
        chain
    }

    /// Checks the structural invariants: every edge is recorded on both
    /// ends and no list holds the same node twice.
    pub fn is_consistent(&self) -> bool {
        self.nodes.iter().enumerate().all(|(i, node)| {
            let id = NodeId(i);
            let unique = |list: &[NodeId]| list.iter().collect::<HashSet<_>>().len() == list.len();

            unique(&node.children)
                && unique(&node.parents)
                && node.children.iter().all(|c| self.parents_of(*c).contains(&id))
                && node.parents.iter().all(|p| self.children_of(*p).contains(&id))
        })
    }

    /// Removes `target` from the tree, cascading to descendants that lose
    /// their last importer.
    ///
    /// Descendants still imported by another attached node keep their place
    /// and their own subtrees. Descendants left cut off from the root only
    /// through a cycle among themselves are detached as well. Removing an
    /// already detached node changes nothing.
    pub fn remove_node_recursively(&mut self, target: NodeId) {
        if target.0 >= self.nodes.len() {
            return;
        }

        let descendants = self.reachable_from(target);
        tracing::debug!(
            package = self.nodes[target.0].identifier(),
            descendants = descendants.len().saturating_sub(1),
            "removing node"
        );

        self.detach(target);

        let attached: HashSet<NodeId> = self.nodes().into_iter().collect();
        for id in descendants {
            if !attached.contains(&id) {
                self.sever(id);
            }
        }
    }

    fn detach(&mut self, target: NodeId) {
        let parents = std::mem::take(&mut self.nodes[target.0].parents);
        for parent in parents {
            remove_id(&mut self.nodes[parent.0].children, target);
        }

        let children = std::mem::take(&mut self.nodes[target.0].children);
        for child in children {
            let node = &mut self.nodes[child.0];
            remove_id(&mut node.parents, target);
            // the root never cascades, even when a cycle imported it
            if node.parents.is_empty() && child != self.root {
                tracing::debug!(package = node.identifier(), "cascading removal");
                self.detach(child);
            }
        }
    }

    fn sever(&mut self, id: NodeId) {
        let parents = std::mem::take(&mut self.nodes[id.0].parents);
        for parent in parents {
            remove_id(&mut self.nodes[parent.0].children, id);
        }
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            remove_id(&mut self.nodes[child.0].parents, id);
        }
    }

    fn reachable_from(&self, start: NodeId) -> Vec<NodeId> {
        if start.0 >= self.nodes.len() {
            return Vec::new();
        }

        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![start];

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            // reversed so the first child is visited first
            for &child in self.nodes[current.0].children.iter().rev() {
                if !seen.contains(&child) {
                    stack.push(child);
                }
            }
        }

        order
    }
}
