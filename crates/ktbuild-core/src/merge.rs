//! Merging partial dependency reports and detecting unused dependencies.

use std::collections::BTreeMap;
use std::io;

use crate::dependency::{DependencyKind, DependencyReport};
use crate::resolver::LabelResolver;
use crate::strict_deps::{highlight, BUILDOZER};

/// Merge partial reports into one report for `rule_label`.
///
/// For every path the strongest kind seen across all inputs wins; equal kinds
/// keep the first occurrence. The merged report is always successful,
/// regardless of the inputs' own flags.
pub fn merge_reports<I>(rule_label: &str, reports: I) -> DependencyReport
where
    I: IntoIterator<Item = DependencyReport>,
{
    let mut merged = DependencyReport::new(rule_label);
    for report in reports {
        for record in report.records() {
            merged.record(record.path, record.kind);
        }
    }
    merged.success = true;
    merged
}

/// Labels a rule depends on without using any of their archives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedDeps {
    /// Rule the report belongs to.
    pub target: String,

    /// Unused labels, in first-seen order.
    pub labels: Vec<String>,
}

impl UnusedDeps {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Human-readable remediation text.
    pub fn message(&self) -> String {
        let labels = self.labels.join(" ");
        format!(
            "{} {labels} from {target}\n{} {BUILDOZER} 'remove deps {labels}' {target}",
            highlight("** Please remove the following dependencies:"),
            highlight("** You can use the following buildozer command:"),
            target = self.target,
        )
    }
}

/// Find labels whose archives were all unused in a merged report.
///
/// A target may produce several archives (e.g. a primary and a resources
/// jar). Each label keeps the strongest kind observed among its archives, so
/// it is reported only when every archive it owns is `Unused`. Archives
/// without an owner label and the rule's own label are ignored.
pub fn find_unused_labels(
    report: &DependencyReport,
    resolver: &dyn LabelResolver,
) -> io::Result<UnusedDeps> {
    let mut order: Vec<String> = Vec::new();
    let mut kinds: BTreeMap<String, DependencyKind> = BTreeMap::new();

    for record in report.records() {
        let Some(label) = resolver.resolve(&record.path)?.label else {
            continue;
        };
        match kinds.get_mut(&label) {
            Some(kind) => *kind = kind.strongest(record.kind),
            None => {
                kinds.insert(label.clone(), record.kind);
                order.push(label);
            }
        }
    }

    let labels = order
        .into_iter()
        .filter(|label| label != &report.rule_label)
        .filter(|label| kinds.get(label) == Some(&DependencyKind::Unused))
        .collect();

    Ok(UnusedDeps {
        target: report.rule_label.clone(),
        labels,
    })
}
