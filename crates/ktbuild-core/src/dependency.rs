//! Dependency records and reports.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// How a compilation unit used one of its compile-time dependencies.
///
/// Kinds are ordered by strength: `Explicit > Implicit > Unused`. The order is
/// defined by [`DependencyKind::strength`] and is independent of any wire
/// encoding of the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyKind {
    /// Referenced directly by the compiled sources.
    Explicit,
    /// Reached only transitively (supertypes, bounds, type arguments).
    Implicit,
    /// Declared but never reached.
    Unused,
}

impl DependencyKind {
    /// All kinds, strongest first.
    pub const ALL: [DependencyKind; 3] = [Self::Explicit, Self::Implicit, Self::Unused];

    /// Precedence rank. Higher wins when a path is seen with two kinds.
    pub fn strength(self) -> u8 {
        match self {
            Self::Explicit => 2,
            Self::Implicit => 1,
            Self::Unused => 0,
        }
    }

    /// Returns the stronger of two kinds, preferring `self` on ties.
    pub fn strongest(self, other: Self) -> Self {
        if other.strength() > self.strength() {
            other
        } else {
            self
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "EXPLICIT",
            Self::Implicit => "IMPLICIT",
            Self::Unused => "UNUSED",
        }
    }
}

impl PartialOrd for DependencyKind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DependencyKind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.strength().cmp(&other.strength())
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EXPLICIT" => Ok(Self::Explicit),
            "IMPLICIT" => Ok(Self::Implicit),
            "UNUSED" => Ok(Self::Unused),
            _ => Err(CoreError::UnknownKind(s.to_string())),
        }
    }
}

/// A single `{path, kind}` entry of a dependency report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Archive path of the dependency.
    pub path: String,

    /// How the archive was used.
    pub kind: DependencyKind,
}

impl DependencyRecord {
    /// Create a new DependencyRecord.
    pub fn new(path: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// The dependency report ("jdeps") of one build rule.
///
/// Paths are unique and iterate in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    /// Label of the rule the report belongs to.
    pub rule_label: String,

    /// Whether the producing step finished successfully.
    pub success: bool,

    dependencies: BTreeMap<String, DependencyKind>,
}

impl DependencyReport {
    /// Create an empty, unsuccessful report for a rule.
    pub fn new(rule_label: impl Into<String>) -> Self {
        Self {
            rule_label: rule_label.into(),
            success: false,
            dependencies: BTreeMap::new(),
        }
    }

    /// Builder method to set the success flag.
    pub fn with_success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    /// Builder method to add a record, keeping the strongest kind per path.
    pub fn with_dependency(mut self, path: impl Into<String>, kind: DependencyKind) -> Self {
        self.record(path, kind);
        self
    }

    /// Record a dependency. If the path is already present the stronger kind
    /// is kept; on equal kinds the existing entry stays.
    ///
    /// Returns the kind now stored for the path.
    pub fn record(&mut self, path: impl Into<String>, kind: DependencyKind) -> DependencyKind {
        let entry = self.dependencies.entry(path.into()).or_insert(kind);
        *entry = entry.strongest(kind);
        *entry
    }

    /// Kind recorded for a path, if any.
    pub fn kind_of(&self, path: &str) -> Option<DependencyKind> {
        self.dependencies.get(path).copied()
    }

    /// Iterate records in path order.
    pub fn records(&self) -> impl Iterator<Item = DependencyRecord> + '_ {
        self.dependencies
            .iter()
            .map(|(path, kind)| DependencyRecord::new(path.clone(), *kind))
    }

    /// Paths recorded with the given kind, in path order.
    pub fn paths_with_kind(&self, kind: DependencyKind) -> impl Iterator<Item = &str> + '_ {
        self.dependencies
            .iter()
            .filter(move |(_, k)| **k == kind)
            .map(|(path, _)| path.as_str())
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}
