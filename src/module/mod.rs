//! Go module helpers.
//!
//! These functions answer the filesystem questions the CLI needs before a
//! build: where the enclosing module root is, what the module is called,
//! which directories hold `package main`, and what import path a directory
//! has.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use imptree::module;
//!
//! let root = module::root_path_from(Path::new("cmd/server"))?;
//! let name = module::name_from(&root)?;
//! let import_path = module::import_path_from(&root.join("cmd/server"), &name, &root)?;
//! println!("{import_path}");
//! # Ok::<(), imptree::module::ModuleError>(())
//! ```

pub mod go_source;

use std::fs;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

pub use go_source::{find_main_packages, is_main_package, MainPackage, PackageClauseReader};

/// The manifest file marking a module root.
pub const MANIFEST: &str = "go.mod";

/// Errors that can occur while inspecting a module on disk.
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("No module directive in {path}")]
    MissingModuleDirective { path: String },

    #[error("Could not find Go module root above {start}")]
    NotFound { start: String },

    #[error("{path} is not inside module root {root}")]
    NotInModule { path: String, root: String },

    #[error("Failed to parse file: {path}")]
    Parse { path: String },

    #[error("Tree-sitter language initialization failed")]
    LanguageInit,
}

/// Result type for module operations.
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Reads the module name declared in `root/go.mod`.
pub fn name_from(root: &Path) -> ModuleResult<String> {
    let manifest = root.join(MANIFEST);
    let content = fs::read_to_string(&manifest)?;

    parse_module_directive(&content).ok_or_else(|| ModuleError::MissingModuleDirective {
        path: manifest.display().to_string(),
    })
}

/// Extracts the module path from go.mod content.
fn parse_module_directive(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or_default().trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let name = rest.trim().trim_matches('"');
        (!name.is_empty()).then(|| name.to_string())
    })
}

/// Returns true if `path` holds a go.mod file.
pub fn is_root_path(path: &Path) -> bool {
    path.join(MANIFEST).is_file()
}

/// Walks up from `start` to the nearest directory holding a go.mod file.
pub fn root_path_from(start: &Path) -> ModuleResult<PathBuf> {
    let start = if start.is_absolute() {
        start.to_path_buf()
    } else {
        std::env::current_dir()?.join(start)
    };

    start
        .ancestors()
        .find(|dir| is_root_path(dir))
        .map(Path::to_path_buf)
        .ok_or_else(|| ModuleError::NotFound {
            start: start.display().to_string(),
        })
}

/// [`root_path_from`] starting at the current working directory.
pub fn root_path_from_working_dir() -> ModuleResult<PathBuf> {
    root_path_from(&std::env::current_dir()?)
}

/// Translates a directory inside a module into its import path.
///
/// ```
/// use std::path::Path;
/// use imptree::module::import_path_from;
///
/// let path = import_path_from(
///     Path::new("/home/john/repos/example/a/b/c"),
///     "github.com/doe/example",
///     Path::new("/home/john/repos/example"),
/// ).unwrap();
/// assert_eq!(path, "github.com/doe/example/a/b/c");
/// ```
pub fn import_path_from(path: &Path, module_name: &str, root: &Path) -> ModuleResult<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| ModuleError::NotInModule {
            path: path.display().to_string(),
            root: root.display().to_string(),
        })?;

    let mut import_path = module_name.to_string();
    for component in relative.components() {
        if let Component::Normal(segment) = component {
            import_path.push('/');
            import_path.push_str(&segment.to_string_lossy());
        }
    }
    Ok(import_path)
}
