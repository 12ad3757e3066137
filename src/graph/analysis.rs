//! Cycle analysis for import trees using petgraph.

use std::collections::{HashMap, HashSet};

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};

use super::import_tree::ImportTree;
use super::node::NodeId;

/// Information about a detected import cycle.
///
/// Contains the identifiers of the packages that form the cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInfo {
    /// The identifiers in the cycle (the last connects back to the first)
    pub nodes: Vec<String>,
}

impl CycleInfo {
    /// Returns a formatted string representation of the cycle path.
    ///
    /// For example: "a -> b -> c -> a"
    pub fn cycle_path(&self) -> String {
        let Some(first) = self.nodes.first() else {
            return String::new();
        };
        format!("{} -> {}", self.nodes.join(" -> "), first)
    }

    /// Returns the number of packages in the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the cycle is empty (should not happen in practice).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl ImportTree {
    /// Copies the attached part of the tree into a petgraph `DiGraph`.
    ///
    /// Node weights are identifiers; the returned map translates tree ids
    /// to graph indices.
    pub fn to_petgraph(&self) -> (DiGraph<String, ()>, HashMap<NodeId, NodeIndex>) {
        let ids = self.nodes();
        let mut graph = DiGraph::with_capacity(ids.len(), ids.len());
        let mut indices = HashMap::with_capacity(ids.len());

        for &id in &ids {
            let label = self.identifier(id).unwrap_or_default().to_string();
            indices.insert(id, graph.add_node(label));
        }

        for &id in &ids {
            for child in self.children_of(id) {
                if let (Some(&from), Some(&to)) = (indices.get(&id), indices.get(child)) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        (graph, indices)
    }

    /// Checks if the attached part of the tree contains an import cycle.
    pub fn has_cycles(&self) -> bool {
        let (graph, _) = self.to_petgraph();
        is_cyclic_directed(&graph)
    }

    /// Detects and returns all import cycles.
    ///
    /// Every strongly connected component with more than one package, or a
    /// single package importing itself, is reported.
    pub fn detect_cycles(&self) -> Vec<CycleInfo> {
        let (graph, _) = self.to_petgraph();
        let mut cycles = Vec::new();

        for scc in tarjan_scc(&graph) {
            let is_cycle = match scc.as_slice() {
                [single] => graph.contains_edge(*single, *single),
                members => members.len() > 1,
            };
            if !is_cycle {
                continue;
            }

            let mut nodes: Vec<String> = scc
                .iter()
                .filter_map(|&idx| graph.node_weight(idx))
                .cloned()
                .collect();
            // tarjan yields members in reverse discovery order
            nodes.reverse();
            cycles.push(CycleInfo { nodes });
        }

        cycles
    }

    /// Returns the identifiers of all packages that take part in a cycle.
    pub fn nodes_in_cycles(&self) -> HashSet<String> {
        self.detect_cycles()
            .into_iter()
            .flat_map(|cycle| cycle.nodes)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(edges: &[(&str, &str)]) -> ImportTree {
        let mut tree = ImportTree::new(edges[0].0);
        let mut ids: HashMap<String, NodeId> = HashMap::new();
        ids.insert(edges[0].0.to_string(), tree.root());

        for (from, to) in edges {
            let from = *ids
                .entry(from.to_string())
                .or_insert_with(|| tree.add_node(*from));
            let to = *ids.entry(to.to_string()).or_insert_with(|| tree.add_node(*to));
            tree.add_edge(from, to);
        }
        tree
    }

    #[test]
    fn test_to_petgraph_counts() {
        let tree = chain(&[("a", "b"), ("a", "c"), ("b", "c")]);
        let (graph, indices) = tree.to_petgraph();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph[indices[&tree.root()]], "a");
    }

    #[test]
    fn test_to_petgraph_skips_detached_nodes() {
        let mut tree = chain(&[("a", "b"), ("b", "c")]);
        let b = tree.find("b").unwrap();
        tree.remove_node_recursively(b);

        let (graph, _) = tree.to_petgraph();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_has_cycles() {
        assert!(!chain(&[("a", "b"), ("b", "c")]).has_cycles());
        assert!(chain(&[("a", "b"), ("b", "a")]).has_cycles());
    }

    #[test]
    fn test_detect_cycles() {
        let tree = chain(&[("a", "b"), ("b", "c"), ("c", "b"), ("a", "d")]);

        let cycles = tree.detect_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 2);
        assert!(cycles[0].nodes.contains(&"b".to_string()));
        assert!(cycles[0].nodes.contains(&"c".to_string()));

        let in_cycles = tree.nodes_in_cycles();
        assert!(!in_cycles.contains("a"));
        assert!(!in_cycles.contains("d"));
    }

    #[test]
    fn test_detect_cycles_self_loop() {
        let tree = chain(&[("a", "b"), ("b", "b")]);
        let cycles = tree.detect_cycles();
        assert_eq!(cycles, vec![CycleInfo { nodes: vec!["b".to_string()] }]);
    }

    #[test]
    fn test_cycle_info_cycle_path() {
        let cycle = CycleInfo {
            nodes: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        };
        assert_eq!(cycle.cycle_path(), "a -> b -> c -> a");
    }

    #[test]
    fn test_cycle_info_empty() {
        let cycle = CycleInfo { nodes: vec![] };
        assert!(cycle.is_empty());
        assert_eq!(cycle.len(), 0);
        assert_eq!(cycle.cycle_path(), "");
    }
}
