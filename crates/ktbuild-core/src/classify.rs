//! Classification of observed type usages into a dependency report.

use std::collections::BTreeSet;

use crate::dependency::{DependencyKind, DependencyReport};

/// Separator between an archive path and the entry inside it.
pub const ARCHIVE_SEPARATOR: &str = "!/";

/// Only archives with this extension are reported.
pub const ARCHIVE_EXTENSION: &str = ".jar";

/// Archive containing a type path of the form `<archive>!/<innerPath>`.
///
/// Returns `None` for types not loaded from a jar (source types, JDK modules).
pub fn archive_of(type_path: &str) -> Option<&str> {
    let (archive, _) = type_path.split_once(ARCHIVE_SEPARATOR)?;
    archive.ends_with(ARCHIVE_EXTENSION).then_some(archive)
}

fn archives<'a, I>(type_paths: I) -> BTreeSet<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    type_paths
        .into_iter()
        .filter_map(|path| archive_of(path))
        .collect()
}

/// Build the dependency report of a compilation unit.
///
/// - archives referenced explicitly are `Explicit`
/// - archives reached only implicitly are `Implicit`
/// - direct dependencies reached neither way are `Unused`
///
/// A direct dependency observed only implicitly is `Implicit`, not `Unused`.
pub fn classify<'a, E, I>(
    rule_label: &str,
    explicit_type_paths: E,
    implicit_type_paths: I,
    direct_dependencies: &[String],
) -> DependencyReport
where
    E: IntoIterator<Item = &'a String>,
    I: IntoIterator<Item = &'a String>,
{
    let explicit = archives(explicit_type_paths);
    let implicit = archives(implicit_type_paths);

    let mut report = DependencyReport::new(rule_label).with_success(true);

    for jar in direct_dependencies {
        if !explicit.contains(jar.as_str()) && !implicit.contains(jar.as_str()) {
            report.record(jar.as_str(), DependencyKind::Unused);
        }
    }
    for jar in &explicit {
        report.record(*jar, DependencyKind::Explicit);
    }
    for jar in implicit.difference(&explicit) {
        report.record(*jar, DependencyKind::Implicit);
    }

    report
}
