//! Export functionality for import trees.
//!
//! This module provides exporters for printing a built [`ImportTree`] in
//! various formats: indented text, JSON, Markdown and Graphviz DOT.
//! Only packages reachable from the root are exported.

pub mod dot;
pub mod json;
pub mod markdown;
pub mod tree;

use std::io::{self, Write};

use crate::graph::{CycleInfo, ImportTree, NodeId};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Indented tree - for reading in a terminal
    #[default]
    Tree,
    /// JSON format - machine-readable, full data
    Json,
    /// Markdown format - documentation/reporting
    Markdown,
    /// Graphviz DOT - for rendering with `dot -Tsvg`
    Dot,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tree" | "text" => Ok(ExportFormat::Tree),
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "dot" | "graphviz" => Ok(ExportFormat::Dot),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: tree, json, markdown, dot",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Tree => write!(f, "tree"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Markdown => write!(f, "markdown"),
            ExportFormat::Dot => write!(f, "dot"),
        }
    }
}

/// One package as seen by the exporters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// Import path
    pub identifier: String,
    /// Shortest import distance from the root
    pub depth: usize,
    /// Packages this one imports, in tree order
    pub imports: Vec<String>,
    /// Packages importing this one, in tree order
    pub imported_by: Vec<String>,
}

impl PackageEntry {
    /// Returns true if more than one package imports this one.
    pub fn is_shared(&self) -> bool {
        self.imported_by.len() > 1
    }
}

/// Data container for export operations.
///
/// A flattened snapshot of the attached part of an [`ImportTree`].
#[derive(Debug, Clone)]
pub struct ExportData {
    /// Root package identifier
    pub root: String,
    /// Packages in depth-first preorder, root first
    pub packages: Vec<PackageEntry>,
    /// Detected import cycles
    pub cycles: Vec<CycleInfo>,
}

impl ExportData {
    /// Snapshot the packages reachable from the tree's root.
    pub fn from_tree(tree: &ImportTree) -> Self {
        let depths = tree.depths();
        let names = |ids: &[NodeId]| -> Vec<String> {
            ids.iter()
                .filter_map(|&id| tree.identifier(id))
                .map(str::to_string)
                .collect()
        };

        let packages = tree
            .nodes()
            .into_iter()
            .filter_map(|id| {
                let node = tree.node(id)?;
                Some(PackageEntry {
                    identifier: node.identifier().to_string(),
                    depth: depths.get(&id).copied().unwrap_or_default(),
                    imports: names(node.children()),
                    imported_by: names(node.parents()),
                })
            })
            .collect();

        Self {
            root: tree.root_node().identifier().to_string(),
            packages,
            cycles: tree.detect_cycles(),
        }
    }

    /// Looks up a package by identifier.
    pub fn package(&self, identifier: &str) -> Option<&PackageEntry> {
        self.packages.iter().find(|p| p.identifier == identifier)
    }

    /// Total number of import edges
    pub fn import_count(&self) -> usize {
        self.packages.iter().map(|p| p.imports.len()).sum()
    }

    /// Packages importing nothing
    pub fn leaf_count(&self) -> usize {
        self.packages.iter().filter(|p| p.imports.is_empty()).count()
    }

    /// Packages imported from more than one place
    pub fn shared_count(&self) -> usize {
        self.packages.iter().filter(|p| p.is_shared()).count()
    }

    /// Deepest shortest-path distance from the root
    pub fn max_depth(&self) -> usize {
        self.packages.iter().map(|p| p.depth).max().unwrap_or(0)
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()>;
}

/// Export a tree in the specified format.
pub fn export<W: Write>(format: ExportFormat, tree: &ImportTree, writer: &mut W) -> io::Result<()> {
    let data = ExportData::from_tree(tree);
    match format {
        ExportFormat::Tree => tree::TreeExporter.export(&data, writer),
        ExportFormat::Json => json::JsonExporter.export(&data, writer),
        ExportFormat::Markdown => markdown::MarkdownExporter.export(&data, writer),
        ExportFormat::Dot => dot::DotExporter.export(&data, writer),
    }
}

/// Export a tree to a string.
pub fn export_to_string(format: ExportFormat, tree: &ImportTree) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, tree, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// A small tree shared by the exporter tests:
/// app -> {app/api, app/db}, app/api -> {app/db, app/log}, app/db -> app/log
#[cfg(test)]
pub(crate) fn sample_tree() -> ImportTree {
    let mut tree = ImportTree::new("app");
    let api = tree.add_node("app/api");
    let db = tree.add_node("app/db");
    let log = tree.add_node("app/log");
    tree.add_edge(tree.root(), api);
    tree.add_edge(tree.root(), db);
    tree.add_edge(api, db);
    tree.add_edge(api, log);
    tree.add_edge(db, log);
    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("tree".parse::<ExportFormat>().unwrap(), ExportFormat::Tree);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!(
            "md".parse::<ExportFormat>().unwrap(),
            ExportFormat::Markdown
        );
        assert_eq!("graphviz".parse::<ExportFormat>().unwrap(), ExportFormat::Dot);
        assert!("csv".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_format_display() {
        for format in [
            ExportFormat::Tree,
            ExportFormat::Json,
            ExportFormat::Markdown,
            ExportFormat::Dot,
        ] {
            assert_eq!(format.to_string().parse::<ExportFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_export_data_from_tree() {
        let data = ExportData::from_tree(&sample_tree());

        assert_eq!(data.root, "app");
        assert_eq!(data.packages.len(), 4);
        assert_eq!(data.import_count(), 5);
        assert_eq!(data.leaf_count(), 1);
        assert_eq!(data.shared_count(), 2);
        assert_eq!(data.max_depth(), 2);
        assert!(data.cycles.is_empty());

        let db = data.package("app/db").unwrap();
        assert_eq!(db.depth, 1);
        assert_eq!(db.imported_by, vec!["app", "app/api"]);
        assert_eq!(db.imports, vec!["app/log"]);
    }

    #[test]
    fn test_export_data_skips_removed_packages() {
        let mut tree = sample_tree();
        let api = tree.find("app/api").unwrap();
        tree.remove_node_recursively(api);

        let data = ExportData::from_tree(&tree);
        let ids: Vec<&str> = data.packages.iter().map(|p| p.identifier.as_str()).collect();
        assert_eq!(ids, vec!["app", "app/db", "app/log"]);
        assert_eq!(data.package("app/log").unwrap().imported_by, vec!["app/db"]);
    }

    #[test]
    fn test_export_to_string_every_format() {
        let tree = sample_tree();
        for format in [
            ExportFormat::Tree,
            ExportFormat::Json,
            ExportFormat::Markdown,
            ExportFormat::Dot,
        ] {
            let output = export_to_string(format, &tree).unwrap();
            assert!(output.contains("app/log"), "{format} output missing package");
        }
    }
}
