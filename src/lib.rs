//! imptree - Doubly-linked import trees for Go packages
//!
//! This crate loads Go packages with `go list`, builds a deduplicated import
//! tree rooted at one package, and lets you prune subtrees out of it. Trees
//! can be exported as text, JSON, Markdown or DOT, or browsed in a terminal UI.

pub mod export;
pub mod filter;
pub mod graph;
pub mod loader;
pub mod module;
pub mod ui;
