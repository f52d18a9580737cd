//! Enforcement policy for dependency checks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// How a dependency check reacts to findings.
///
/// Shared by strict-deps enforcement and unused-deps reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepsPolicy {
    /// Skip the check entirely.
    #[default]
    Off,
    /// Report findings, keep the task successful.
    Warn,
    /// Report findings and fail the task.
    Error,
}

impl DepsPolicy {
    /// Returns true if the check should run at all.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Returns true if findings fail the task.
    pub fn fails_task(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for DepsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepsPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(CoreError::UnknownPolicy(s.to_string())),
        }
    }
}
