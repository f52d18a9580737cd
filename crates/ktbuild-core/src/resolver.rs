//! Archive owner resolution.

use std::io;

/// The build rule that produced an archive, as recorded in its manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JarOwner {
    /// Archive path the owner was read from.
    pub jar: String,

    /// Owning build label, if the archive carries one.
    pub label: Option<String>,

    /// Kind of the rule that injected the archive.
    pub injecting_rule_kind: Option<String>,
}

impl JarOwner {
    /// An owner with no recorded label.
    pub fn unknown(jar: impl Into<String>) -> Self {
        Self {
            jar: jar.into(),
            label: None,
            injecting_rule_kind: None,
        }
    }

    /// Builder method to set the label (normalized).
    pub fn with_label(mut self, label: impl AsRef<str>) -> Self {
        self.label = Some(normalize_label(label.as_ref()));
        self
    }

    /// Builder method to set the injecting rule kind.
    pub fn with_rule_kind(mut self, kind: impl Into<String>) -> Self {
        self.injecting_rule_kind = Some(kind.into());
        self
    }

    /// The label if known, otherwise the archive path.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.jar)
    }
}

/// Resolves an archive path to the build rule that owns it.
///
/// Implementations typically read archive manifest metadata.
pub trait LabelResolver: Send + Sync {
    /// Read the owner of an archive.
    fn resolve(&self, archive: &str) -> io::Result<JarOwner>;
}

/// Strip the extra `@` from canonical repository labels (`@@repo//x`, `@//x`).
pub fn normalize_label(label: &str) -> String {
    if label.starts_with("@@") || label.starts_with("@/") {
        label[1..].to_string()
    } else {
        label.to_string()
    }
}
