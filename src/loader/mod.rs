//! Package loading for imptree.
//!
//! The graph builder does not read source code itself. It asks a
//! [`PackageLoader`] to resolve a pattern into a [`LoadedPackages`] arena
//! and then walks that data.
//!
//! - [`GoListLoader`] runs the Go toolchain (`go list -deps -json`)
//! - [`StaticLoader`] hands back a prepared package set
//!
//! # Example
//!
//! ```
//! use imptree::loader::{LoadConfig, LoadedPackages, PackageLoader, StaticLoader};
//!
//! let loader = StaticLoader::new(LoadedPackages::from_adjacency(
//!     "app",
//!     &[("app", &["app/db"])],
//! ));
//! let pkgs = loader.load("app", &LoadConfig::default()).unwrap();
//! assert_eq!(pkgs.len(), 2);
//! assert_eq!(loader.count_errors(&pkgs), 0);
//! ```

pub mod config;
pub mod go_list;
pub mod types;

pub use config::LoadConfig;
pub use go_list::{parse_listing, GoListLoader};
pub use types::{LoadedPackages, Unit, UnitId};

/// Errors that can occur while loading packages.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The loader program could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The loader program ran but reported failure.
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The loader output could not be decoded.
    #[error("Failed to decode package listing: {0}")]
    Decode(#[from] serde_json::Error),

    /// Any other loader-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Result type alias for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Resolves a pattern into loaded packages.
pub trait PackageLoader {
    /// Loads the packages matched by `pattern` and everything they import.
    fn load(&self, pattern: &str, config: &LoadConfig) -> LoadResult<LoadedPackages>;

    /// Reports the problems found during a load and returns their count.
    ///
    /// The default logs every unit error through `tracing`.
    fn count_errors(&self, packages: &LoadedPackages) -> usize {
        packages.report_errors()
    }
}

impl<L: PackageLoader + ?Sized> PackageLoader for &L {
    fn load(&self, pattern: &str, config: &LoadConfig) -> LoadResult<LoadedPackages> {
        (**self).load(pattern, config)
    }

    fn count_errors(&self, packages: &LoadedPackages) -> usize {
        (**self).count_errors(packages)
    }
}

/// A loader that returns the same prepared package set for every pattern.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    packages: LoadedPackages,
}

impl StaticLoader {
    /// Wraps a prepared package set.
    pub fn new(packages: LoadedPackages) -> Self {
        Self { packages }
    }
}

impl PackageLoader for StaticLoader {
    fn load(&self, _pattern: &str, _config: &LoadConfig) -> LoadResult<LoadedPackages> {
        Ok(self.packages.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_loader_returns_prepared_set() {
        let loader = StaticLoader::new(LoadedPackages::from_adjacency("a", &[("a", &["b"])]));
        let pkgs = loader.load("anything", &LoadConfig::default()).unwrap();
        assert_eq!(pkgs.len(), 2);
        assert_eq!(pkgs.top_level().len(), 1);
    }

    #[test]
    fn test_loader_by_reference() {
        let loader = StaticLoader::default();
        let by_ref: &dyn PackageLoader = &loader;
        let pkgs = (&by_ref).load("x", &LoadConfig::default()).unwrap();
        assert!(pkgs.is_empty());
    }

    #[test]
    fn test_default_count_errors_reports_unit_errors() {
        let mut pkgs = LoadedPackages::from_adjacency("a", &[]);
        let a = pkgs.find("a").unwrap();
        pkgs.push_error(a, "no Go files");
        assert_eq!(StaticLoader::default().count_errors(&pkgs), 1);
    }

    #[test]
    fn test_load_error_messages() {
        let err = LoadError::CommandFailed {
            program: "go".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "go: no go.mod".to_string(),
        };
        assert_eq!(err.to_string(), "go exited with exit status: 1: go: no go.mod");
        assert_eq!(LoadError::Other("boom".to_string()).to_string(), "boom");
    }
}
