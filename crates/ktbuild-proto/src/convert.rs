//! Converters between report messages and domain types.

use ktbuild_core::{DependencyKind, DependencyReport};
use prost::Message;

use crate::error::ConvertError;
use crate::pb::deps::{self, dependency::Kind};

// ============================================================================
// Kind conversions
// ============================================================================

impl From<DependencyKind> for Kind {
    fn from(kind: DependencyKind) -> Self {
        match kind {
            DependencyKind::Explicit => Kind::Explicit,
            DependencyKind::Implicit => Kind::Implicit,
            DependencyKind::Unused => Kind::Unused,
        }
    }
}

impl From<Kind> for DependencyKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Explicit => DependencyKind::Explicit,
            // Considered by the compiler, so the archive was reached.
            Kind::Implicit | Kind::Incomplete => DependencyKind::Implicit,
            Kind::Unused => DependencyKind::Unused,
        }
    }
}

// ============================================================================
// Report conversions
// ============================================================================

impl From<&DependencyReport> for deps::Dependencies {
    fn from(report: &DependencyReport) -> Self {
        deps::Dependencies {
            dependency: report
                .records()
                .map(|record| deps::Dependency {
                    path: record.path,
                    kind: Kind::from(record.kind) as i32,
                    location: Vec::new(),
                })
                .collect(),
            rule_label: Some(report.rule_label.clone()),
            success: Some(report.success),
            contained_package: Vec::new(),
        }
    }
}

impl TryFrom<deps::Dependencies> for DependencyReport {
    type Error = ConvertError;

    fn try_from(message: deps::Dependencies) -> Result<Self, Self::Error> {
        let mut report = DependencyReport::new(message.rule_label()).with_success(message.success());
        for dependency in message.dependency {
            let kind = Kind::try_from(dependency.kind).map_err(|_| ConvertError::UnknownKind {
                path: dependency.path.clone(),
                kind: dependency.kind,
            })?;
            report.record(dependency.path, kind.into());
        }
        Ok(report)
    }
}

/// Serialize a report in the binary `.jdeps` format.
pub fn encode_report(report: &DependencyReport) -> Vec<u8> {
    deps::Dependencies::from(report).encode_to_vec()
}

/// Parse a report from the binary `.jdeps` format.
///
/// Paths repeated within one file keep their strongest kind.
pub fn decode_report(bytes: &[u8]) -> Result<DependencyReport, ConvertError> {
    let message = deps::Dependencies::decode(bytes)?;
    DependencyReport::try_from(message)
}
