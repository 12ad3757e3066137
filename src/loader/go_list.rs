//! Package loader backed by `go list`.
//!
//! Runs `go list -e -deps -json <pattern>` and decodes the stream of JSON
//! objects it prints into a [`LoadedPackages`] arena.

use std::process::Command;

use serde::Deserialize;

use super::config::LoadConfig;
use super::types::LoadedPackages;
use super::{LoadError, LoadResult, PackageLoader};

/// Loads packages by shelling out to the Go toolchain.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoListLoader;

/// The subset of `go list -json` output we read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GoListPackage {
    import_path: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    standard: bool,
    #[serde(default)]
    dep_only: bool,
    #[serde(default)]
    imports: Vec<String>,
    #[serde(default)]
    module: Option<GoListModule>,
    #[serde(default)]
    error: Option<GoListError>,
    #[serde(default)]
    deps_errors: Vec<GoListError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GoListModule {
    path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GoListError {
    #[serde(default)]
    pos: String,
    err: String,
}

impl GoListError {
    fn message(&self) -> String {
        if self.pos.is_empty() {
            self.err.clone()
        } else {
            format!("{}: {}", self.pos, self.err)
        }
    }
}

impl GoListLoader {
    /// Creates a new loader.
    pub fn new() -> Self {
        Self
    }

    fn command(&self, pattern: &str, config: &LoadConfig) -> Command {
        let mut cmd = Command::new(&config.go_binary);
        cmd.arg("list").arg("-e").arg("-deps").arg("-json");
        if !config.tags.is_empty() {
            cmd.arg(format!("-tags={}", config.tags.join(",")));
        }
        cmd.arg(pattern)
            .current_dir(&config.dir)
            .envs(config.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        cmd
    }
}

impl PackageLoader for GoListLoader {
    fn load(&self, pattern: &str, config: &LoadConfig) -> LoadResult<LoadedPackages> {
        let program = config.go_binary.display().to_string();
        tracing::debug!(%program, pattern, dir = %config.dir.display(), "running go list");

        let output = self
            .command(pattern, config)
            .output()
            .map_err(|source| LoadError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(LoadError::CommandFailed {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_listing(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Decodes the concatenated JSON objects printed by `go list -json`.
///
/// Packages whose `DepOnly` flag is unset were matched by the pattern and
/// become top-level units. Imports naming a package absent from the listing
/// (such as the cgo pseudo-package "C") are skipped.
pub fn parse_listing(listing: &str) -> LoadResult<LoadedPackages> {
    let mut listed = Vec::new();
    for pkg in serde_json::Deserializer::from_str(listing).into_iter::<GoListPackage>() {
        listed.push(pkg?);
    }

    let mut pkgs = LoadedPackages::new();
    for pkg in &listed {
        let id = pkgs.add_unit(pkg.import_path.as_str());
        if let Some(unit) = pkgs.get_mut(id) {
            if !pkg.name.is_empty() {
                unit.name = pkg.name.clone();
            }
            unit.standard = pkg.standard;
            unit.module = pkg.module.as_ref().map(|m| m.path.clone());
        }
        for err in pkg.error.iter().chain(&pkg.deps_errors) {
            pkgs.push_error(id, err.message());
        }
        if !pkg.dep_only {
            pkgs.mark_top_level(id);
        }
    }

    for pkg in &listed {
        let Some(from) = pkgs.find(&pkg.import_path) else {
            continue;
        };
        for import in &pkg.imports {
            match pkgs.find(import) {
                Some(to) => {
                    pkgs.add_import(from, to);
                }
                None => {
                    tracing::debug!(
                        package = %pkg.import_path,
                        import = %import,
                        "import not in listing, skipped"
                    );
                }
            }
        }
    }

    Ok(pkgs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
{
    "ImportPath": "fmt",
    "Name": "fmt",
    "Standard": true,
    "DepOnly": true
}
{
    "ImportPath": "example.com/app/internal/store",
    "Name": "store",
    "DepOnly": true,
    "Module": {"Path": "example.com/app"},
    "Imports": ["fmt"]
}
{
    "ImportPath": "example.com/app/cmd/server",
    "Name": "main",
    "Module": {"Path": "example.com/app"},
    "Imports": ["C", "example.com/app/internal/store", "fmt"]
}
"#;

    #[test]
    fn test_parse_listing_builds_units() {
        let pkgs = parse_listing(LISTING).unwrap();
        assert_eq!(pkgs.len(), 3);

        let fmt = pkgs.get(pkgs.find("fmt").unwrap()).unwrap();
        assert!(fmt.standard);
        assert_eq!(fmt.module, None);

        let server = pkgs
            .get(pkgs.find("example.com/app/cmd/server").unwrap())
            .unwrap();
        assert!(server.is_main());
        assert_eq!(server.module.as_deref(), Some("example.com/app"));
    }

    #[test]
    fn test_parse_listing_marks_pattern_matches_top_level() {
        let pkgs = parse_listing(LISTING).unwrap();
        let top: Vec<&str> = pkgs
            .top_level()
            .iter()
            .filter_map(|&id| pkgs.get(id))
            .map(|u| u.identifier.as_str())
            .collect();
        assert_eq!(top, vec!["example.com/app/cmd/server"]);
    }

    #[test]
    fn test_parse_listing_skips_unknown_imports() {
        let pkgs = parse_listing(LISTING).unwrap();
        let server = pkgs.find("example.com/app/cmd/server").unwrap();

        let imports: Vec<&str> = pkgs
            .imports_of(server)
            .map(|(_, u)| u.identifier.as_str())
            .collect();
        assert_eq!(imports, vec!["example.com/app/internal/store", "fmt"]);
    }

    #[test]
    fn test_parse_listing_records_errors() {
        let listing = r#"{
            "ImportPath": "example.com/missing",
            "Error": {"Pos": "main.go:3:8", "Err": "cannot find package"}
        }"#;
        let pkgs = parse_listing(listing).unwrap();
        let unit = pkgs.get(pkgs.find("example.com/missing").unwrap()).unwrap();
        assert_eq!(unit.errors, vec!["main.go:3:8: cannot find package"]);
        assert_eq!(pkgs.error_count(), 1);
    }

    #[test]
    fn test_parse_listing_records_deps_errors() {
        let listing = r#"{
            "ImportPath": "example.com/app",
            "DepsErrors": [{"Err": "import cycle not allowed"}]
        }"#;
        let pkgs = parse_listing(listing).unwrap();
        let unit = pkgs.get(pkgs.find("example.com/app").unwrap()).unwrap();
        assert_eq!(unit.errors, vec!["import cycle not allowed"]);
    }

    #[test]
    fn test_parse_listing_empty() {
        let pkgs = parse_listing("").unwrap();
        assert!(pkgs.is_empty());
        assert!(pkgs.top_level().is_empty());
    }

    #[test]
    fn test_parse_listing_rejects_garbage() {
        let result = parse_listing("{ not json");
        assert!(matches!(result, Err(LoadError::Decode(_))));
    }

    #[test]
    fn test_missing_go_binary_is_spawn_error() {
        let config = LoadConfig::new().go_binary("/nonexistent/bin/go-imptree-test");
        let result = GoListLoader::new().load("./...", &config);
        assert!(matches!(result, Err(LoadError::Spawn { .. })));
    }
}
