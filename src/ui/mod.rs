//! UI module for the imptree TUI
//!
//! This module provides the terminal user interface for browsing an
//! import tree and pruning packages from it.

mod app;
pub mod tree;

pub use app::{run_app, App};
pub use tree::{FlattenedNode, TreeNode};
