//! Strict dependency enforcement.
//!
//! Every archive a rule references directly must also be one of its declared
//! direct dependencies. Archives reached only through other dependencies are
//! fine; archives referenced by name but only available transitively are
//! violations.

use std::collections::BTreeSet;
use std::io;

use crate::dependency::{DependencyKind, DependencyReport};
use crate::resolver::{JarOwner, LabelResolver};

pub(crate) const BUILDOZER: &str = "buildozer";

const OPEN: &str = "\u{1b}[35m\u{1b}[1m";
const CLOSE: &str = "\u{1b}[0m";

pub(crate) fn highlight(text: &str) -> String {
    format!("{OPEN}{text}{CLOSE}")
}

/// Directly referenced archives missing from a rule's declared dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrictDepsViolation {
    /// Rule that was checked.
    pub target: String,

    /// Owners of the missing archives, in archive path order.
    pub missing: Vec<JarOwner>,
}

impl StrictDepsViolation {
    /// Paths of the missing archives.
    pub fn missing_paths(&self) -> BTreeSet<&str> {
        self.missing.iter().map(|owner| owner.jar.as_str()).collect()
    }

    /// Labels that could be resolved for the missing archives.
    pub fn resolved_labels(&self) -> BTreeSet<&str> {
        self.missing
            .iter()
            .filter_map(|owner| owner.label.as_deref())
            .collect()
    }

    /// Human-readable remediation text.
    pub fn message(&self) -> String {
        let names: Vec<&str> = self.missing.iter().map(JarOwner::display_name).collect();
        let mut message = format!(
            "{}\n{} to {}",
            highlight("** Please add the following dependencies:"),
            names.join(" "),
            self.target
        );

        let labels = self.resolved_labels();
        if !labels.is_empty() {
            let labels: Vec<&str> = labels.into_iter().collect();
            message.push_str(&format!(
                "\n{}\n{BUILDOZER} 'add deps {}' {}",
                highlight("** You can use the following buildozer command:"),
                labels.join(" "),
                self.target
            ));
        }
        message
    }
}

/// Check the explicit archives of a classified report against the rule's
/// declared direct dependencies.
///
/// Returns `None` when every explicit archive is declared. Archives owned by
/// the rule itself never count as missing.
pub fn check_strict_deps(
    report: &DependencyReport,
    direct_dependencies: &[String],
    resolver: &dyn LabelResolver,
) -> io::Result<Option<StrictDepsViolation>> {
    let mut missing = Vec::new();
    for jar in report.paths_with_kind(DependencyKind::Explicit) {
        if direct_dependencies.iter().any(|dep| dep == jar) {
            continue;
        }
        let owner = resolver.resolve(jar)?;
        if owner.label.as_deref() == Some(report.rule_label.as_str()) {
            continue;
        }
        missing.push(owner);
    }

    if missing.is_empty() {
        return Ok(None);
    }

    Ok(Some(StrictDepsViolation {
        target: report.rule_label.clone(),
        missing,
    }))
}
