//! Markdown export implementation.
//!
//! Exports the import tree in Markdown format for documentation and reporting.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

fn code_list(items: &[String]) -> String {
    if items.is_empty() {
        return "-".to_string();
    }
    items
        .iter()
        .map(|item| format!("`{}`", item))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        // Title
        writeln!(writer, "# Import Tree Report")?;
        writeln!(writer)?;
        writeln!(writer, "**Root:** `{}`", data.root)?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Count |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Packages | {} |", data.packages.len())?;
        writeln!(writer, "| Imports | {} |", data.import_count())?;
        writeln!(writer, "| Leaf Packages | {} |", data.leaf_count())?;
        writeln!(writer, "| Shared Packages | {} |", data.shared_count())?;
        writeln!(writer, "| Max Depth | {} |", data.max_depth())?;
        writeln!(writer, "| Import Cycles | {} |", data.cycles.len())?;
        writeln!(writer)?;

        writeln!(writer, "## Packages")?;
        writeln!(writer)?;
        writeln!(writer, "| Package | Depth | Imported By | Imports |")?;
        writeln!(writer, "|---------|-------|-------------|---------|")?;
        for package in &data.packages {
            writeln!(
                writer,
                "| `{}` | {} | {} | {} |",
                package.identifier,
                package.depth,
                code_list(&package.imported_by),
                code_list(&package.imports)
            )?;
        }
        writeln!(writer)?;

        if !data.cycles.is_empty() {
            writeln!(writer, "## Import Cycles")?;
            writeln!(writer)?;
            writeln!(writer, "The following import cycles were detected:")?;
            writeln!(writer)?;
            for (i, cycle) in data.cycles.iter().enumerate() {
                writeln!(writer, "{}. `{}`", i + 1, cycle.cycle_path())?;
            }
            writeln!(writer)?;
        }

        // Footer
        writeln!(writer, "---")?;
        writeln!(writer, "*Generated by imptree*")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::sample_tree;
    use crate::graph::ImportTree;

    fn export_markdown(tree: &ImportTree) -> String {
        let data = ExportData::from_tree(tree);
        let mut output = Vec::new();
        MarkdownExporter.export(&data, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_markdown_export_basic() {
        let md_str = export_markdown(&sample_tree());

        assert!(md_str.contains("# Import Tree Report"));
        assert!(md_str.contains("**Root:** `app`"));
        assert!(md_str.contains("| Packages | 4 |"));
        assert!(md_str.contains("| Imports | 5 |"));
        assert!(md_str.contains("| Shared Packages | 2 |"));
    }

    #[test]
    fn test_markdown_export_package_table() {
        let md_str = export_markdown(&sample_tree());

        assert!(md_str.contains("| `app` | 0 | - | `app/api`, `app/db` |"));
        assert!(md_str.contains("| `app/log` | 2 | `app/api`, `app/db` | - |"));
    }

    #[test]
    fn test_markdown_export_with_cycles() {
        let mut tree = ImportTree::new("a");
        let b = tree.add_node("b");
        tree.add_edge(tree.root(), b);
        tree.add_edge(b, tree.root());

        let md_str = export_markdown(&tree);

        assert!(md_str.contains("## Import Cycles"));
        assert!(md_str.contains("import cycles were detected"));
    }

    #[test]
    fn test_markdown_export_no_cycle_section_when_acyclic() {
        let md_str = export_markdown(&sample_tree());

        assert!(!md_str.contains("## Import Cycles"));
        assert!(md_str.ends_with("*Generated by imptree*\n"));
    }
}
