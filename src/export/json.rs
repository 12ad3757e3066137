//! JSON export implementation.
//!
//! Exports the import tree in JSON format for machine-readable output.

use super::{ExportData, Exporter};
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Serializable package for JSON output.
#[derive(Serialize)]
struct JsonPackage<'a> {
    identifier: &'a str,
    depth: usize,
    imports: &'a [String],
    imported_by: &'a [String],
}

/// Serializable cycle info for JSON output.
#[derive(Serialize)]
struct JsonCycle<'a> {
    packages: &'a [String],
    path: String,
}

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary {
    packages: usize,
    imports: usize,
    leaves: usize,
    shared: usize,
    max_depth: usize,
    import_cycles: usize,
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport<'a> {
    root: &'a str,
    summary: JsonSummary,
    packages: Vec<JsonPackage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    import_cycles: Vec<JsonCycle<'a>>,
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        let packages = data
            .packages
            .iter()
            .map(|p| JsonPackage {
                identifier: &p.identifier,
                depth: p.depth,
                imports: &p.imports,
                imported_by: &p.imported_by,
            })
            .collect();

        let import_cycles = data
            .cycles
            .iter()
            .map(|c| JsonCycle {
                packages: &c.nodes,
                path: c.cycle_path(),
            })
            .collect();

        let export = JsonExport {
            root: &data.root,
            summary: JsonSummary {
                packages: data.packages.len(),
                imports: data.import_count(),
                leaves: data.leaf_count(),
                shared: data.shared_count(),
                max_depth: data.max_depth(),
                import_cycles: data.cycles.len(),
            },
            packages,
            import_cycles,
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::sample_tree;
    use crate::graph::ImportTree;

    fn export_json(tree: &ImportTree) -> serde_json::Value {
        let data = ExportData::from_tree(tree);
        let mut output = Vec::new();
        JsonExporter.export(&data, &mut output).unwrap();
        serde_json::from_slice(&output).unwrap()
    }

    #[test]
    fn test_json_export_summary() {
        let parsed = export_json(&sample_tree());

        assert_eq!(parsed["root"], "app");
        assert_eq!(parsed["summary"]["packages"], 4);
        assert_eq!(parsed["summary"]["imports"], 5);
        assert_eq!(parsed["summary"]["leaves"], 1);
        assert_eq!(parsed["summary"]["shared"], 2);
        assert_eq!(parsed["summary"]["import_cycles"], 0);
        assert!(parsed.get("import_cycles").is_none());
    }

    #[test]
    fn test_json_export_packages_list() {
        let parsed = export_json(&sample_tree());

        let packages = parsed["packages"].as_array().unwrap();
        assert_eq!(packages.len(), 4);
        assert_eq!(packages[0]["identifier"], "app");
        assert_eq!(packages[0]["depth"], 0);
        assert_eq!(packages[0]["imports"], serde_json::json!(["app/api", "app/db"]));
        assert_eq!(packages[3]["identifier"], "app/log");
        assert_eq!(
            packages[3]["imported_by"],
            serde_json::json!(["app/api", "app/db"])
        );
    }

    #[test]
    fn test_json_export_with_cycles() {
        let mut tree = ImportTree::new("a");
        let b = tree.add_node("b");
        let c = tree.add_node("c");
        tree.add_edge(tree.root(), b);
        tree.add_edge(b, c);
        tree.add_edge(c, b);

        let parsed = export_json(&tree);

        assert_eq!(parsed["summary"]["import_cycles"], 1);
        let cycles = parsed["import_cycles"].as_array().unwrap();
        assert_eq!(cycles[0]["packages"].as_array().unwrap().len(), 2);
    }
}
