//! Loaded package data handed to the graph builder.
//!
//! A [`LoadedPackages`] value is an arena of [`Unit`]s. Each unit refers to
//! the units it imports by [`UnitId`], so the whole import graph (cycles
//! included) lives in one owned value.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Index of a [`Unit`] inside its [`LoadedPackages`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(usize);

impl UnitId {
    /// Returns the raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// One loaded source package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Fully-qualified import path (e.g. "github.com/acme/app/internal/db").
    pub identifier: String,

    /// Declared package name (e.g. "main", "db").
    pub name: String,

    /// Whether the package belongs to the standard library.
    pub standard: bool,

    /// Path of the module providing this package, if any.
    pub module: Option<String>,

    /// Errors the loader reported for this package.
    pub errors: Vec<String>,

    /// Imported identifier -> imported unit, ordered by identifier.
    pub imports: BTreeMap<String, UnitId>,
}

impl Unit {
    /// Creates a unit with no imports, naming it after the last path segment.
    pub fn new(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        let name = identifier
            .rsplit('/')
            .next()
            .unwrap_or(identifier.as_str())
            .to_string();
        Self {
            identifier,
            name,
            standard: false,
            module: None,
            errors: Vec::new(),
            imports: BTreeMap::new(),
        }
    }

    /// Returns true if this is an executable entry point.
    pub fn is_main(&self) -> bool {
        self.name == "main"
    }

    /// Returns true if the loader reported problems for this package.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.identifier, self.name)
    }
}

/// The result of one package load: every unit reachable from the requested
/// pattern, plus which of them the pattern matched directly.
#[derive(Debug, Clone, Default)]
pub struct LoadedPackages {
    units: Vec<Unit>,
    index: HashMap<String, UnitId>,
    top_level: Vec<UnitId>,
}

impl LoadedPackages {
    /// Creates an empty package set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a package set from an adjacency list.
    ///
    /// `top_level` is marked as the only top-level unit; every identifier
    /// mentioned on either side of `edges` becomes a unit.
    ///
    /// # Example
    ///
    /// ```
    /// use imptree::loader::LoadedPackages;
    ///
    /// let pkgs = LoadedPackages::from_adjacency("app", &[
    ///     ("app", &["app/db", "app/log"]),
    ///     ("app/db", &["app/log"]),
    /// ]);
    ///
    /// assert_eq!(pkgs.len(), 3);
    /// assert_eq!(pkgs.top_level().len(), 1);
    /// ```
    pub fn from_adjacency(top_level: &str, edges: &[(&str, &[&str])]) -> Self {
        let mut pkgs = Self::new();
        let root = pkgs.add_unit(top_level);
        pkgs.mark_top_level(root);

        for (from, imports) in edges {
            let from = pkgs.add_unit(*from);
            for import in imports.iter() {
                let to = pkgs.add_unit(*import);
                pkgs.add_import(from, to);
            }
        }

        pkgs
    }

    /// Adds a unit for `identifier`, or returns the existing one.
    pub fn add_unit(&mut self, identifier: impl Into<String>) -> UnitId {
        let identifier = identifier.into();
        if let Some(&id) = self.index.get(&identifier) {
            return id;
        }

        let id = UnitId(self.units.len());
        self.index.insert(identifier.clone(), id);
        self.units.push(Unit::new(identifier));
        id
    }

    /// Records that `from` imports `to`.
    ///
    /// Returns `false` if either id does not belong to this set.
    pub fn add_import(&mut self, from: UnitId, to: UnitId) -> bool {
        let Some(target) = self.units.get(to.0).map(|u| u.identifier.clone()) else {
            return false;
        };
        match self.units.get_mut(from.0) {
            Some(unit) => {
                unit.imports.insert(target, to);
                true
            }
            None => false,
        }
    }

    /// Marks a unit as matched directly by the load pattern.
    pub fn mark_top_level(&mut self, id: UnitId) {
        if id.0 < self.units.len() && !self.top_level.contains(&id) {
            self.top_level.push(id);
        }
    }

    /// Attaches a loader error to a unit.
    pub fn push_error(&mut self, id: UnitId, message: impl Into<String>) {
        if let Some(unit) = self.units.get_mut(id.0) {
            unit.errors.push(message.into());
        }
    }

    /// Gets a unit by id.
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.0)
    }

    /// Gets a mutable unit by id.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(id.0)
    }

    /// Looks up a unit id by identifier.
    pub fn find(&self, identifier: &str) -> Option<UnitId> {
        self.index.get(identifier).copied()
    }

    /// Units matched directly by the load pattern, in load order.
    pub fn top_level(&self) -> &[UnitId] {
        &self.top_level
    }

    /// Iterates the units imported by `id`, in identifier order.
    pub fn imports_of(&self, id: UnitId) -> impl Iterator<Item = (UnitId, &Unit)> + '_ {
        self.get(id)
            .into_iter()
            .flat_map(|unit| unit.imports.values())
            .filter_map(move |&child| self.get(child).map(|unit| (child, unit)))
    }

    /// Iterates all units in load order.
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &Unit)> + '_ {
        self.units
            .iter()
            .enumerate()
            .map(|(i, unit)| (UnitId(i), unit))
    }

    /// Number of loaded units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Total number of errors attached to any unit.
    pub fn error_count(&self) -> usize {
        self.units.iter().map(|u| u.errors.len()).sum()
    }

    /// Logs every unit error and returns how many there were.
    pub fn report_errors(&self) -> usize {
        let mut count = 0;
        for unit in &self.units {
            for err in &unit.errors {
                tracing::error!(package = %unit.identifier, "{err}");
                count += 1;
            }
        }
        count
    }
}
