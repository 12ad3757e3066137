//! Package clause detection using tree-sitter.
//!
//! A directory is an executable entry point when its Go files declare
//! `package main`. The clause is read with the tree-sitter Go grammar rather
//! than by scanning text, so comments and build constraints ahead of it do
//! not matter.

use std::fs;
use std::path::{Path, PathBuf};

use tree_sitter::{Node, Parser};
use walkdir::WalkDir;

use super::{import_path_from, is_root_path, ModuleError, ModuleResult};

/// A directory declaring `package main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainPackage {
    /// Directory on disk.
    pub dir: PathBuf,
    /// Import path within the module.
    pub import_path: String,
}

/// Reads the package clause of Go source files.
pub struct PackageClauseReader {
    parser: Parser,
}

impl PackageClauseReader {
    /// Create a new reader.
    pub fn new() -> ModuleResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|_| ModuleError::LanguageInit)?;

        Ok(Self { parser })
    }

    /// Returns the declared package name of a source file.
    pub fn package_name_of_file(&mut self, path: &Path) -> ModuleResult<Option<String>> {
        let content = fs::read_to_string(path)?;
        self.package_name(&content, path)
    }

    /// Returns the declared package name of Go source code.
    ///
    /// `Ok(None)` means the source has no package clause.
    pub fn package_name(&mut self, source: &str, path: &Path) -> ModuleResult<Option<String>> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ModuleError::Parse {
                path: path.display().to_string(),
            })?;

        let root = tree.root_node();
        let mut cursor = root.walk();
        let clause = root
            .children(&mut cursor)
            .find(|child| child.kind() == "package_clause");

        Ok(clause.and_then(|clause| {
            let mut cursor = clause.walk();
            let name = clause
                .children(&mut cursor)
                .find(|child| child.kind() == "package_identifier");
            name.and_then(|name| node_text(&name, source).map(str::to_string))
        }))
    }

    /// Returns true if any non-test Go file directly inside `dir` declares
    /// `package main`.
    pub fn is_main_package(&mut self, dir: &Path) -> ModuleResult<bool> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_go_source(path))
            .collect();
        files.sort();

        for file in files {
            if self.package_name_of_file(&file)?.as_deref() == Some("main") {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Returns true if `dir` holds a `package main`.
pub fn is_main_package(dir: &Path) -> ModuleResult<bool> {
    let mut reader = PackageClauseReader::new()?;
    reader.is_main_package(dir)
}

/// Finds every `package main` directory of the module rooted at `root`.
///
/// Hidden, `_`-prefixed, `vendor` and `testdata` directories are skipped, as
/// are nested modules. Directories that fail to parse are logged and
/// skipped. Results are ordered by path.
pub fn find_main_packages(root: &Path, module_name: &str) -> ModuleResult<Vec<MainPackage>> {
    let mut reader = PackageClauseReader::new()?;
    let mut mains = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored_dir(e))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }

        let dir = entry.path();
        match reader.is_main_package(dir) {
            Ok(true) => {
                let import_path = import_path_from(dir, module_name, root)?;
                tracing::debug!(%import_path, "found main package");
                mains.push(MainPackage {
                    dir: dir.to_path_buf(),
                    import_path,
                });
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(dir = %dir.display(), "skipping directory: {e}");
            }
        }
    }

    Ok(mains)
}

/// Check if a directory should be ignored during traversal.
fn is_ignored_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    name.starts_with('.')
        || name.starts_with('_')
        || matches!(name.as_ref(), "vendor" | "testdata")
        || is_root_path(entry.path())
}

fn is_go_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go") && path.is_file()
}

/// Extract the text content of a node.
fn node_text<'a>(node: &Node, source: &'a str) -> Option<&'a str> {
    source.get(node.start_byte()..node.end_byte())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package_name(source: &str) -> Option<String> {
        let mut reader = PackageClauseReader::new().unwrap();
        reader.package_name(source, Path::new("test.go")).unwrap()
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_package_name_main() {
        assert_eq!(
            package_name("package main\n\nfunc main() {}\n").as_deref(),
            Some("main")
        );
    }

    #[test]
    fn test_package_name_after_comments() {
        let source = "// Copyright 2022\n//go:build linux\n\n// Package store keeps data.\npackage store\n\nimport \"fmt\"\n";
        assert_eq!(package_name(source).as_deref(), Some("store"));
    }

    #[test]
    fn test_package_name_missing_clause() {
        assert_eq!(package_name(""), None);
    }

    #[test]
    fn test_is_main_package() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "cmd/api/main.go", "package main\n\nfunc main() {}\n");
        write(dir.path(), "cmd/api/routes.go", "package main\n");
        write(dir.path(), "internal/store/store.go", "package store\n");

        assert!(is_main_package(&dir.path().join("cmd/api")).unwrap());
        assert!(!is_main_package(&dir.path().join("internal/store")).unwrap());
    }

    #[test]
    fn test_is_main_package_ignores_test_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lib.go", "package lib\n");
        write(dir.path(), "main_test.go", "package main\n");

        assert!(!is_main_package(dir.path()).unwrap());
    }

    #[test]
    fn test_is_main_package_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = is_main_package(&dir.path().join("missing"));
        assert!(matches!(result, Err(ModuleError::Io(_))));
    }

    #[test]
    fn test_find_main_packages() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "go.mod", "module example.com/app\n");
        write(root, "main.go", "package main\n");
        write(root, "cmd/worker/main.go", "package main\n");
        write(root, "cmd/api/main.go", "package main\n");
        write(root, "internal/store/store.go", "package store\n");
        write(root, "vendor/example.com/dep/main.go", "package main\n");
        write(root, "testdata/fixture/main.go", "package main\n");
        write(root, ".hidden/main.go", "package main\n");
        write(root, "tools/go.mod", "module example.com/app/tools\n");
        write(root, "tools/gen/main.go", "package main\n");

        let mains = find_main_packages(root, "example.com/app").unwrap();
        let paths: Vec<&str> = mains.iter().map(|m| m.import_path.as_str()).collect();

        assert_eq!(
            paths,
            vec![
                "example.com/app",
                "example.com/app/cmd/api",
                "example.com/app/cmd/worker",
            ]
        );
        assert_eq!(mains[1].dir, root.join("cmd/api"));
    }
}
