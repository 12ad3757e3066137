//! Graph node type.

use std::fmt;

/// Index of a [`GraphNode`] inside its [`ImportTree`](super::ImportTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One package in an import tree.
///
/// `children` are the packages this one imports, `parents` the packages
/// importing it. Both lists keep discovery order and never hold the same
/// node twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    identifier: String,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parents: Vec<NodeId>,
}

impl GraphNode {
    pub(crate) fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            children: Vec::new(),
            parents: Vec::new(),
        }
    }

    /// The import path of this package.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Packages imported by this one.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Packages importing this one.
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// Returns true if nothing imports this package.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns true if this package imports nothing.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_root_and_leaf() {
        let node = GraphNode::new("example.com/app");
        assert_eq!(node.identifier(), "example.com/app");
        assert!(node.is_root());
        assert!(node.is_leaf());
        assert_eq!(format!("{}", node), "example.com/app");
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(3).to_string(), "#3");
        assert_eq!(NodeId(3).index(), 3);
    }
}
