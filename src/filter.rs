//! Package selection for tree builds.
//!
//! [`PackageFilter`] is the inclusion predicate the command line hands to
//! [`GraphBuilder::build`](crate::graph::GraphBuilder::build).

use crate::loader::Unit;

/// Decides which loaded packages become nodes.
///
/// A package is included when it is not excluded, is not from the standard
/// library (unless enabled), and falls under one of the prefixes. With no
/// prefixes, every non-standard package falls under them.
///
/// # Example
///
/// ```
/// use imptree::filter::PackageFilter;
/// use imptree::loader::Unit;
///
/// let filter = PackageFilter::new()
///     .prefix("example.com/app")
///     .exclude("example.com/app/internal/mocks/...");
///
/// assert!(filter.matches(&Unit::new("example.com/app/cmd/api")));
/// assert!(!filter.matches(&Unit::new("example.com/application")));
/// assert!(!filter.matches(&Unit::new("example.com/app/internal/mocks/db")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFilter {
    prefixes: Vec<String>,
    include_std: bool,
    excludes: Vec<String>,
}

impl PackageFilter {
    /// Creates a filter accepting every non-standard package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an import path prefix to include.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_end_matches('/').to_string();
        if !prefix.is_empty() && !self.prefixes.contains(&prefix) {
            self.prefixes.push(prefix);
        }
        self
    }

    /// Sets whether standard-library packages are included.
    pub fn include_std(mut self, include: bool) -> Self {
        self.include_std = include;
        self
    }

    /// Excludes an identifier, or a whole subtree with a trailing `/...`.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    /// The configured prefixes.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Returns true if the package should be part of the tree.
    pub fn matches(&self, unit: &Unit) -> bool {
        let id = unit.identifier.as_str();

        if self.excludes.iter().any(|pattern| matches_pattern(pattern, id)) {
            return false;
        }
        if unit.standard {
            return self.include_std;
        }
        self.prefixes.is_empty() || self.prefixes.iter().any(|prefix| is_under(prefix, id))
    }
}

/// `prefix/...` matches the prefix and everything below it; anything else
/// must match exactly.
fn matches_pattern(pattern: &str, id: &str) -> bool {
    match pattern.strip_suffix("/...") {
        Some(prefix) => is_under(prefix, id),
        None => pattern == id,
    }
}

fn is_under(prefix: &str, id: &str) -> bool {
    id.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn std_unit(id: &str) -> Unit {
        let mut unit = Unit::new(id);
        unit.standard = true;
        unit
    }

    #[test]
    fn test_empty_filter_accepts_non_standard() {
        let filter = PackageFilter::new();
        assert!(filter.matches(&Unit::new("github.com/any/thing")));
        assert!(!filter.matches(&std_unit("fmt")));
    }

    #[test]
    fn test_include_std() {
        let filter = PackageFilter::new().include_std(true);
        assert!(filter.matches(&std_unit("net/http")));
    }

    #[test]
    fn test_prefix_respects_path_boundaries() {
        let filter = PackageFilter::new().prefix("example.com/app/");
        assert_eq!(filter.prefixes(), &["example.com/app".to_string()]);

        assert!(filter.matches(&Unit::new("example.com/app")));
        assert!(filter.matches(&Unit::new("example.com/app/internal/db")));
        assert!(!filter.matches(&Unit::new("example.com/apple")));
        assert!(!filter.matches(&Unit::new("github.com/other/lib")));
    }

    #[test]
    fn test_multiple_prefixes() {
        let filter = PackageFilter::new().prefix("a.com/x").prefix("b.com/y").prefix("a.com/x");
        assert_eq!(filter.prefixes().len(), 2);
        assert!(filter.matches(&Unit::new("b.com/y/z")));
    }

    #[test]
    fn test_exclude_exact_and_subtree() {
        let filter = PackageFilter::new()
            .exclude("example.com/app/gen")
            .exclude("example.com/app/mocks/...");

        assert!(!filter.matches(&Unit::new("example.com/app/gen")));
        assert!(filter.matches(&Unit::new("example.com/app/gen/sub")));
        assert!(!filter.matches(&Unit::new("example.com/app/mocks")));
        assert!(!filter.matches(&Unit::new("example.com/app/mocks/db")));
    }

    #[test]
    fn test_exclude_wins_over_std() {
        let filter = PackageFilter::new().include_std(true).exclude("unsafe");
        assert!(!filter.matches(&std_unit("unsafe")));
        assert!(filter.matches(&std_unit("os")));
    }
}
