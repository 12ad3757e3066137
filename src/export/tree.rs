//! Indented text export.
//!
//! Prints the tree the way `cargo tree` does: every package is expanded at
//! its first occurrence, and later occurrences are marked `(*)` instead of
//! being printed again.

use super::{ExportData, Exporter, PackageEntry};
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

/// Text tree exporter implementation.
pub struct TreeExporter;

/// Marker appended to packages already printed above.
pub const SEEN_MARKER: &str = " (*)";

struct Printer<'a> {
    by_id: HashMap<&'a str, &'a PackageEntry>,
    expanded: HashSet<&'a str>,
}

impl<'a> Printer<'a> {
    fn print_children<W: Write>(
        &mut self,
        entry: &'a PackageEntry,
        prefix: &str,
        writer: &mut W,
    ) -> io::Result<()> {
        let count = entry.imports.len();
        for (i, import) in entry.imports.iter().enumerate() {
            let last = i + 1 == count;
            let branch = if last { "└── " } else { "├── " };

            let Some(&child) = self.by_id.get(import.as_str()) else {
                continue;
            };
            if !self.expanded.insert(child.identifier.as_str()) {
                writeln!(writer, "{prefix}{branch}{}{SEEN_MARKER}", child.identifier)?;
                continue;
            }

            writeln!(writer, "{prefix}{branch}{}", child.identifier)?;
            let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
            self.print_children(child, &nested, writer)?;
        }
        Ok(())
    }
}

impl Exporter for TreeExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        let Some(root) = data.package(&data.root) else {
            return Ok(());
        };

        let mut printer = Printer {
            by_id: data
                .packages
                .iter()
                .map(|p| (p.identifier.as_str(), p))
                .collect(),
            expanded: HashSet::from([root.identifier.as_str()]),
        };

        writeln!(writer, "{}", root.identifier)?;
        printer.print_children(root, "", writer)
    }
}
