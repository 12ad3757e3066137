//! Builds an [`ImportTree`] from loaded packages.
//!
//! The builder asks its [`PackageLoader`] for the import graph of one
//! pattern, then walks it depth-first from the single top-level package,
//! creating one node per identifier and linking both directions of every
//! import edge.

use std::collections::{HashMap, HashSet};

use crate::loader::{LoadConfig, LoadError, LoadedPackages, PackageLoader, Unit, UnitId};

use super::import_tree::{link, ImportTree};
use super::node::{GraphNode, NodeId};

/// Errors that can occur while building an import tree.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The loader could not resolve the pattern.
    #[error("failed to load source package: {0}")]
    Load(#[from] LoadError),

    /// The load reported errors, or did not yield exactly one top-level package.
    #[error("failed to load source package: {roots} top-level packages, {errors} errors")]
    AmbiguousRoot { roots: usize, errors: usize },

    /// The inclusion predicate rejected every package.
    #[error("could not find tree root node")]
    RootNotFound,
}

/// Result type alias for build operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Single-use constructor for an [`ImportTree`].
///
/// [`build`](Self::build) consumes the builder, so its identifier map can
/// never alias nodes from two unrelated builds.
///
/// # Example
///
/// ```
/// use imptree::graph::GraphBuilder;
/// use imptree::loader::{LoadedPackages, StaticLoader};
///
/// let loader = StaticLoader::new(LoadedPackages::from_adjacency("app", &[
///     ("app", &["app/db", "fmt"]),
///     ("app/db", &["fmt"]),
/// ]));
///
/// // keep only packages of our own module
/// let tree = GraphBuilder::new(loader)
///     .build("app", |unit| unit.identifier.starts_with("app"))
///     .unwrap();
///
/// assert_eq!(tree.root_node().identifier(), "app");
/// assert_eq!(tree.node_count(), 2);
/// assert!(tree.find("fmt").is_none());
/// ```
pub struct GraphBuilder<L> {
    loader: L,
    config: LoadConfig,
    /// identifier -> materialized node
    index: HashMap<String, NodeId>,
    nodes: Vec<GraphNode>,
    /// nodes whose imports have been walked
    expanded: HashSet<NodeId>,
    /// cached predicate results, one per unit
    verdicts: HashMap<UnitId, bool>,
}

impl<L: PackageLoader> GraphBuilder<L> {
    /// Creates a builder using the default [`LoadConfig`].
    pub fn new(loader: L) -> Self {
        Self::with_config(loader, LoadConfig::default())
    }

    /// Creates a builder with an explicit load configuration.
    pub fn with_config(loader: L, config: LoadConfig) -> Self {
        Self {
            loader,
            config,
            index: HashMap::new(),
            nodes: Vec::new(),
            expanded: HashSet::new(),
            verdicts: HashMap::new(),
        }
    }

    /// Builds the import tree rooted at `identifier`.
    ///
    /// Only packages for which `include` returns true become nodes. A
    /// rejected package ends the walk on that branch: its imports are not
    /// visited through it. `include` is called at most once per package.
    ///
    /// # Errors
    ///
    /// - [`BuildError::Load`] if the loader fails
    /// - [`BuildError::AmbiguousRoot`] if the loader reports errors or the
    ///   pattern does not match exactly one package
    /// - [`BuildError::RootNotFound`] if `include` rejects the root
    pub fn build<F>(mut self, identifier: &str, mut include: F) -> BuildResult<ImportTree>
    where
        F: FnMut(&Unit) -> bool,
    {
        let pkgs = self.loader.load(identifier, &self.config)?;
        let errors = self.loader.count_errors(&pkgs);

        let start = match pkgs.top_level() {
            [start] if errors == 0 => *start,
            roots => {
                return Err(BuildError::AmbiguousRoot {
                    roots: roots.len(),
                    errors,
                })
            }
        };

        self.walk(&pkgs, start, &mut include);
        let root = self.locate_root(&pkgs, start)?;

        tracing::debug!(
            root = identifier,
            nodes = self.nodes.len(),
            "built import tree"
        );
        Ok(ImportTree::from_parts(self.nodes, root))
    }

    fn walk<F>(&mut self, pkgs: &LoadedPackages, unit_id: UnitId, include: &mut F)
    where
        F: FnMut(&Unit) -> bool,
    {
        if !self.includes(pkgs, unit_id, include) {
            return;
        }
        let Some(unit) = pkgs.get(unit_id) else {
            return;
        };

        let node = self.node_for(&unit.identifier);
        if !self.expanded.insert(node) {
            return;
        }

        for (child_id, child) in pkgs.imports_of(unit_id) {
            if !self.includes(pkgs, child_id, include) {
                continue;
            }
            let child_node = self.node_for(&child.identifier);
            link(&mut self.nodes, node, child_node);
            self.walk(pkgs, child_id, include);
        }
    }

    fn includes<F>(&mut self, pkgs: &LoadedPackages, unit_id: UnitId, include: &mut F) -> bool
    where
        F: FnMut(&Unit) -> bool,
    {
        if let Some(&verdict) = self.verdicts.get(&unit_id) {
            return verdict;
        }

        let verdict = match pkgs.get(unit_id) {
            Some(unit) => {
                let verdict = include(unit);
                if !verdict {
                    tracing::trace!(package = %unit.identifier, "excluded by predicate");
                }
                verdict
            }
            None => false,
        };
        self.verdicts.insert(unit_id, verdict);
        verdict
    }

    fn node_for(&mut self, identifier: &str) -> NodeId {
        if let Some(&id) = self.index.get(identifier) {
            return id;
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(GraphNode::new(identifier));
        self.index.insert(identifier.to_string(), id);
        tracing::debug!(package = identifier, "materialized node");
        id
    }

    /// Walks first parents upward from the most recently created node.
    ///
    /// If the walk runs into a cycle (the input imports the start package
    /// back) the start package's node is the root.
    fn locate_root(&self, pkgs: &LoadedPackages, start: UnitId) -> BuildResult<NodeId> {
        let Some(mut current) = self.nodes.len().checked_sub(1).map(NodeId) else {
            return Err(BuildError::RootNotFound);
        };

        let mut seen = HashSet::new();
        loop {
            let Some(&parent) = self.nodes[current.0].parents.first() else {
                return Ok(current);
            };
            if !seen.insert(current) {
                tracing::warn!("import cycle reaches the root package");
                return pkgs
                    .get(start)
                    .and_then(|unit| self.index.get(&unit.identifier))
                    .copied()
                    .ok_or(BuildError::RootNotFound);
            }
            current = parent;
        }
    }
}
