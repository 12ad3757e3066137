//! Graph module for import relationship modeling.
//!
//! This module provides [`GraphBuilder`], which turns a package load into an
//! [`ImportTree`]: a rooted graph whose nodes know both the packages they
//! import and the packages importing them.
//!
//! # Example
//!
//! ```rust
//! use imptree::graph::GraphBuilder;
//! use imptree::loader::{LoadedPackages, StaticLoader};
//!
//! let loader = StaticLoader::new(LoadedPackages::from_adjacency("app", &[
//!     ("app", &["app/api", "app/db"]),
//!     ("app/api", &["app/db"]),
//! ]));
//!
//! let mut tree = GraphBuilder::new(loader).build("app", |_| true).unwrap();
//! assert_eq!(tree.node_count(), 3);
//! assert_eq!(tree.edge_count(), 3);
//!
//! let api = tree.find("app/api").unwrap();
//! tree.remove_node_recursively(api);
//! assert_eq!(tree.node_count(), 2);
//! ```

mod analysis;
mod builder;
mod import_tree;
mod node;

pub use analysis::CycleInfo;
pub use builder::{BuildError, BuildResult, GraphBuilder};
pub use import_tree::ImportTree;
pub use node::{GraphNode, NodeId};
