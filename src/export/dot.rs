//! Graphviz DOT export implementation.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// DOT exporter implementation.
pub struct DotExporter;

/// Quote an identifier for use as a DOT node id.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

impl Exporter for DotExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "digraph imports {{")?;
        writeln!(writer, "    rankdir=LR;")?;
        writeln!(writer, "    node [shape=box];")?;
        writeln!(writer, "    {} [style=bold];", quote(&data.root))?;

        for package in &data.packages {
            if package.imports.is_empty() && package.imported_by.is_empty() {
                writeln!(writer, "    {};", quote(&package.identifier))?;
            }
            for import in &package.imports {
                writeln!(
                    writer,
                    "    {} -> {};",
                    quote(&package.identifier),
                    quote(import)
                )?;
            }
        }

        writeln!(writer, "}}")
    }
}
